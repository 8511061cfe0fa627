//! Identity Provider: sessions, login, discovery documents and assertion
//! issuance.

pub mod accounts;
pub mod discovery;
pub mod issuer;
pub mod login;

use std::sync::Arc;
use std::time::Duration;

use crate::core::models::UserRecord;
use crate::core::types::Origin;
use crate::session::SessionStore;
use crate::token::AssertionSigner;
use crate::util::hash::HashingService;

use accounts::AccountDirectory;
use discovery::{Branding, ClientMetadata, Icon};

pub use issuer::TokenResponse;
pub use login::LoginRequest;

#[derive(Debug, Clone)]
pub struct IdpConfig {
    /// Value of the `iss` claim, and the base of every advertised URL.
    pub issuer: Origin,
    pub session_ttl: Duration,
    pub assertion_ttl: Duration,
    pub branding: Branding,
    pub client_metadata: ClientMetadata,
}

impl IdpConfig {
    pub fn new(issuer: Origin) -> Self {
        let branding = Branding {
            background_color: "#54a4ff".to_string(),
            color: "#ffffff".to_string(),
            icons: vec![Icon {
                url: issuer.join("/img/fed.png"),
                size: None,
            }],
        };
        Self {
            issuer,
            session_ttl: Duration::from_secs(30),
            assertion_ttl: Duration::from_secs(60 * 60),
            branding,
            client_metadata: ClientMetadata::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum IdpSession {
    Unauthenticated,
    Authenticated(UserRecord),
}

pub struct IdentityProvider {
    config: IdpConfig,
    sessions: SessionStore<IdpSession>,
    accounts: Arc<dyn AccountDirectory>,
    signer: Box<dyn AssertionSigner>,
    hasher: HashingService,
}

impl std::fmt::Debug for IdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityProvider")
            .field("config", &self.config)
            .field("accounts", &self.accounts)
            .finish()
    }
}

impl IdentityProvider {
    pub fn new(
        config: IdpConfig,
        accounts: Arc<dyn AccountDirectory>,
        signer: Box<dyn AssertionSigner>,
        hasher: HashingService,
    ) -> Self {
        let sessions = SessionStore::new(config.session_ttl);
        Self {
            config,
            sessions,
            accounts,
            signer,
            hasher,
        }
    }

    pub fn config(&self) -> &IdpConfig {
        &self.config
    }

    pub fn session_ttl(&self) -> Duration {
        self.sessions.ttl()
    }

    pub fn clean_up(&self) -> usize {
        self.sessions.clean_up()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::core::models::Account;
    use crate::token::JwtSigner;

    use super::accounts::{demo_account, MemoryDirectory};

    pub const SECRET: &str = "test-secret";

    pub fn issuer() -> Origin {
        Origin("https://idp.example".to_string())
    }

    pub fn provider() -> IdentityProvider {
        provider_with(|_| {})
    }

    pub fn provider_with(f: impl FnOnce(&mut Account)) -> IdentityProvider {
        let mut account = demo_account(&issuer());
        f(&mut account);
        provider_from(Arc::new(MemoryDirectory::new(vec![account])))
    }

    pub fn provider_from(accounts: Arc<dyn AccountDirectory>) -> IdentityProvider {
        IdentityProvider::new(
            IdpConfig::new(issuer()),
            accounts,
            Box::new(JwtSigner::from_secret(SECRET).unwrap()),
            HashingService::with_secret_key("s".to_string()),
        )
    }
}
