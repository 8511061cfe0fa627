//! Relying Party: per-session nonce challenges and assertion verification.

pub mod challenge;
pub mod verifier;

use std::time::Duration;

use crate::core::models::VerifiedIdentity;
use crate::core::types::{Nonce, Origin};
use crate::session::SessionStore;
use crate::token::AssertionVerifier;

pub use challenge::{Challenge, ChallengeResponse};
pub use verifier::VerifyRequest;

#[derive(Debug, Clone)]
pub struct RpConfig {
    /// This relying party's own origin; assertions must be addressed to it.
    pub origin: Origin,
    /// Expected `iss` of every assertion.
    pub issuer: Origin,
    pub session_ttl: Duration,
}

impl RpConfig {
    pub fn new(origin: Origin, issuer: Origin) -> Self {
        Self {
            origin,
            issuer,
            session_ttl: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ChallengeState {
    Pending(Nonce),
    Consumed(VerifiedIdentity),
}

pub struct RelyingParty {
    config: RpConfig,
    sessions: SessionStore<ChallengeState>,
    verifier: Box<dyn AssertionVerifier>,
}

impl std::fmt::Debug for RelyingParty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelyingParty")
            .field("config", &self.config)
            .finish()
    }
}

impl RelyingParty {
    pub fn new(config: RpConfig, verifier: Box<dyn AssertionVerifier>) -> Self {
        let sessions = SessionStore::new(config.session_ttl);
        Self {
            config,
            sessions,
            verifier,
        }
    }

    pub fn config(&self) -> &RpConfig {
        &self.config
    }

    pub fn session_ttl(&self) -> Duration {
        self.sessions.ttl()
    }

    pub fn clean_up(&self) -> usize {
        self.sessions.clean_up()
    }
}
