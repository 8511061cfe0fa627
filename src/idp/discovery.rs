use crate::core::models::UserRecord;

use super::IdentityProvider;

pub const CONFIG_PATH: &str = "/fedcm.json";
pub const ACCOUNTS_PATH: &str = "/accounts.json";
pub const CLIENT_METADATA_PATH: &str = "/client_metadata.json";
pub const ID_ASSERTION_PATH: &str = "/id_assertion.json";
pub const REVOCATION_PATH: &str = "/revocation.json";
pub const SIGNIN_PATH: &str = "/";

#[derive(Debug, serde::Serialize)]
pub struct WellKnown {
    pub provider_urls: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Icon {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Branding {
    pub background_color: String,
    pub color: String,
    pub icons: Vec<Icon>,
}

#[derive(Debug, serde::Serialize)]
pub struct ConfigDocument {
    pub accounts_endpoint: &'static str,
    pub client_metadata_endpoint: &'static str,
    pub id_assertion_endpoint: &'static str,
    pub revocation_endpoint: &'static str,
    pub signin_url: &'static str,
    pub branding: Branding,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ClientMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_policy_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_of_service_url: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct AccountsResponse {
    pub accounts: Vec<UserRecord>,
}

impl IdentityProvider {
    pub fn well_known(&self) -> WellKnown {
        WellKnown {
            provider_urls: vec![self.config.issuer.join(CONFIG_PATH)],
        }
    }

    pub fn config_document(&self) -> ConfigDocument {
        ConfigDocument {
            accounts_endpoint: ACCOUNTS_PATH,
            client_metadata_endpoint: CLIENT_METADATA_PATH,
            id_assertion_endpoint: ID_ASSERTION_PATH,
            revocation_endpoint: REVOCATION_PATH,
            signin_url: SIGNIN_PATH,
            branding: self.config.branding.clone(),
        }
    }

    pub fn client_metadata(&self) -> ClientMetadata {
        self.config.client_metadata.clone()
    }
}
