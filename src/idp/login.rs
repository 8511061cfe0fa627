use tracing::{event, Level};

use crate::core::models::UserRecord;
use crate::core::types::{Password, SessionId};
use crate::error::Error;

use super::discovery::AccountsResponse;
use super::{IdentityProvider, IdpSession};

#[derive(Debug, serde::Deserialize)]
pub struct LoginRequest {
    pub username: String,
    #[serde(default)]
    pub password: Password,
}

impl IdentityProvider {
    pub fn create_session(&self) -> SessionId {
        self.sessions.create(IdpSession::Unauthenticated)
    }

    /// Current state of a live session, `None` once it has expired.
    pub fn session_state(&self, session: &SessionId) -> Option<IdpSession> {
        self.sessions.get(session).map(|s| s.state)
    }

    pub fn set_authenticated(&self, session: &SessionId, user: UserRecord) -> Result<(), Error> {
        self.sessions.set(session, IdpSession::Authenticated(user))
    }

    pub fn destroy_session(&self, session: &SessionId) -> bool {
        self.sessions.destroy(session)
    }

    /// Signs a user in. Any previous session is discarded and a new id is
    /// issued. Accounts without a password hash accept any password.
    #[tracing::instrument(skip(self, session, req), fields(username = %req.username))]
    pub async fn login(
        &self,
        session: Option<&SessionId>,
        req: &LoginRequest,
    ) -> Result<SessionId, Error> {
        let account = self
            .accounts
            .find_by_username(&req.username)
            .await?
            .ok_or_else(|| {
                event!(Level::INFO, "Unknown username");
                Error::InvalidCredentials
            })?;

        if let Some(hash) = &account.password_hash {
            if !self.hasher.verify(&req.password, hash)? {
                event!(Level::INFO, "Wrong password");
                return Err(Error::InvalidCredentials);
            }
        }

        if let Some(old) = session {
            self.destroy_session(old);
        }

        let id = self.create_session();
        self.set_authenticated(&id, account.user)?;
        event!(Level::DEBUG, "Signed in");
        Ok(id)
    }

    pub fn logout(&self, session: &SessionId) {
        if self.destroy_session(session) {
            event!(Level::DEBUG, "Signed out");
        }
    }

    pub fn current_user(&self, session: &SessionId) -> Result<UserRecord, Error> {
        match self.session_state(session) {
            Some(IdpSession::Authenticated(user)) => Ok(user),
            _ => Err(Error::SessionExpired),
        }
    }

    /// The signed-in account as a one-element list.
    pub fn accounts(&self, session: &SessionId) -> Result<AccountsResponse, Error> {
        let user = self.current_user(session)?;
        Ok(AccountsResponse {
            accounts: vec![user],
        })
    }
}
