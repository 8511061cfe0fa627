use std::collections::BTreeSet;

use super::types::*;

/// A user as held by the account directory. Read-only to this crate.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserRecord {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub picture: String,
    #[serde(default)]
    pub approved_clients: BTreeSet<Origin>,
}

impl UserRecord {
    pub fn approves(&self, client_id: &Origin) -> bool {
        self.approved_clients.contains(client_id)
    }
}

/// Directory entry: login name and optional password hash around a user.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Account {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<HashedPassword>,
    #[serde(flatten)]
    pub user: UserRecord,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AssertionRequest {
    pub account_id: AccountId,
    pub client_id: Origin,
    #[serde(default)]
    pub nonce: Option<Nonce>,
}

/// The RP's view of a signed-in user after a successful verification.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VerifiedIdentity {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub picture: String,
}
