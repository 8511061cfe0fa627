use tracing::{event, Level};

use crate::core::models::AssertionRequest;
use crate::core::types::{Origin, SessionId};
use crate::error::Error;
use crate::token::{current_timestamp, AssertionClaims};

use super::{IdentityProvider, IdpSession};

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

impl IdentityProvider {
    /// Mints an assertion for the session's user, addressed to `client_id`.
    ///
    /// Checks run in a fixed order and the first failure wins: session,
    /// account, request origin, directory lookup, client approval. The nonce
    /// is copied as given; freshness is the relying party's concern.
    #[tracing::instrument(
        skip(self, session, req, request_origin),
        fields(account_id = %req.account_id, client_id = %req.client_id)
    )]
    pub async fn issue(
        &self,
        session: &SessionId,
        req: &AssertionRequest,
        request_origin: Option<&Origin>,
    ) -> Result<TokenResponse, Error> {
        let user = match self.session_state(session) {
            Some(IdpSession::Authenticated(user)) => user,
            _ => {
                event!(Level::DEBUG, "Session is not authenticated");
                return Err(Error::SessionExpired);
            }
        };

        if user.id != req.account_id {
            event!(Level::WARN, session_account = %user.id, "account_id does not match session");
            return Err(Error::AccountMismatch);
        }

        if request_origin != Some(&req.client_id) {
            event!(Level::WARN, origin = ?request_origin, "Origin does not match client_id");
            return Err(Error::OriginMismatch);
        }

        let account = self
            .accounts
            .find_by_id(&user.id)
            .await
            .map_err(|_| Error::AccountLookupFailed)?
            .ok_or_else(|| {
                event!(Level::ERROR, "Signed-in account is missing from the directory");
                Error::AccountLookupFailed
            })?;
        let user = account.user;

        if !user.approves(&req.client_id) {
            event!(Level::WARN, "client_id is not approved");
            return Err(Error::ClientNotApproved);
        }

        let now = current_timestamp();
        let claims = AssertionClaims {
            iss: self.config.issuer.clone(),
            sub: user.id,
            aud: req.client_id.clone(),
            nonce: req.nonce.clone(),
            iat: now,
            exp: now + self.config.assertion_ttl.as_secs(),
            name: user.name,
            email: user.email,
            picture: user.picture,
        };

        let token = self.signer.sign(&claims)?;
        event!(Level::DEBUG, "Issuing identity assertion");
        Ok(TokenResponse { token })
    }
}
