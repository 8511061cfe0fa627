use crate::core::models::VerifiedIdentity;
use crate::core::types::{AccountId, Nonce, Origin};

/// Payload of a signed identity assertion. Times are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AssertionClaims {
    pub iss: Origin,
    pub sub: AccountId,
    pub aud: Origin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Nonce>,
    pub iat: u64,
    pub exp: u64,
    pub name: String,
    pub email: String,
    pub picture: String,
}

impl From<AssertionClaims> for VerifiedIdentity {
    fn from(claims: AssertionClaims) -> Self {
        Self {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            picture: claims.picture,
        }
    }
}
