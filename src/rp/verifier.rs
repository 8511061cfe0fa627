use tracing::{event, Level};

use crate::core::models::VerifiedIdentity;
use crate::core::types::SessionId;
use crate::error::Error;
use crate::token::current_timestamp;

use super::{ChallengeState, RelyingParty};

#[derive(Debug, serde::Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

impl RelyingParty {
    /// Verifies `token` against the session's pending nonce and, on success,
    /// consumes the nonce.
    ///
    /// Signature, issuer and audience are checked first. The nonce and expiry
    /// checks and the transition to `Consumed` then happen under the session
    /// lock, so two concurrent attempts cannot both succeed. A failed attempt
    /// leaves the pending nonce in place.
    #[tracing::instrument(skip_all)]
    pub fn verify(&self, session: &SessionId, token: &str) -> Result<VerifiedIdentity, Error> {
        if self.sessions.get(session).is_none() {
            event!(Level::DEBUG, "No live session");
            return Err(Error::SessionExpired);
        }

        let claims = self.verifier.verify(token)?;

        if claims.iss != self.config.issuer {
            event!(Level::WARN, iss = %claims.iss, "Unexpected issuer");
            return Err(Error::IssuerMismatch);
        }

        if claims.aud != self.config.origin {
            event!(Level::WARN, aud = %claims.aud, "Assertion addressed to another origin");
            return Err(Error::AudienceMismatch);
        }

        let now = current_timestamp();
        let outcome = self.sessions.update(session, move |state| {
            let pending = match state {
                ChallengeState::Pending(nonce) => nonce,
                ChallengeState::Consumed(_) => return Err(Error::NonceMismatch),
            };

            match &claims.nonce {
                Some(nonce) if pending.matches(nonce) => {}
                _ => return Err(Error::NonceMismatch),
            }

            if now > claims.exp {
                return Err(Error::AssertionExpired);
            }

            let identity = VerifiedIdentity::from(claims);
            *state = ChallengeState::Consumed(identity.clone());
            Ok(identity)
        });

        match outcome {
            Some(Ok(identity)) => {
                event!(Level::DEBUG, sub = %identity.id, "Assertion verified");
                Ok(identity)
            }
            Some(Err(e)) => {
                event!(Level::INFO, error = %e, "Assertion rejected");
                Err(e)
            }
            None => Err(Error::SessionExpired),
        }
    }

    /// The identity established by the session's last successful verification.
    pub fn identity(&self, session: &SessionId) -> Result<VerifiedIdentity, Error> {
        match self.sessions.get(session).map(|s| s.state) {
            Some(ChallengeState::Consumed(identity)) => Ok(identity),
            _ => Err(Error::SessionExpired),
        }
    }
}
