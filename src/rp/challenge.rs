use tracing::{event, Level};

use crate::core::types::{Nonce, Origin, SessionId};
use crate::idp::discovery::CONFIG_PATH;
use crate::util::random::FromRandom;

use super::{ChallengeState, RelyingParty};

#[derive(Debug)]
pub struct Challenge {
    pub session_id: SessionId,
    pub nonce: Nonce,
}

/// What the browser needs to start the identity request.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ChallengeResponse {
    pub nonce: Nonce,
    pub client_id: Origin,
    pub config_url: String,
}

impl RelyingParty {
    /// Generates a fresh nonce and makes it the session's only pending one.
    /// An unknown or expired session is replaced by a new one.
    #[tracing::instrument(skip_all)]
    pub fn begin_challenge(&self, session: Option<&SessionId>) -> Challenge {
        let nonce = Nonce::from_random();
        let session_id = self
            .sessions
            .upsert(session, ChallengeState::Pending(nonce.clone()));
        event!(Level::DEBUG, "Issued nonce challenge");
        Challenge { session_id, nonce }
    }

    pub fn challenge_response(&self, challenge: &Challenge) -> ChallengeResponse {
        ChallengeResponse {
            nonce: challenge.nonce.clone(),
            client_id: self.config.origin.clone(),
            config_url: self.config.issuer.join(CONFIG_PATH),
        }
    }

    /// The nonce currently awaiting verification, if any.
    pub fn pending_nonce(&self, session: &SessionId) -> Option<Nonce> {
        match self.sessions.get(session)?.state {
            ChallengeState::Pending(nonce) => Some(nonce),
            ChallengeState::Consumed(_) => None,
        }
    }
}
