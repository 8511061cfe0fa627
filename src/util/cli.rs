use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{event, Level};

use crate::core::types::{HashedPassword, Origin, Password};
use crate::error::Error;
use crate::idp::accounts::{AccountDirectory, JsonFileDirectory, MemoryDirectory};
use crate::idp::discovery::Icon;
use crate::idp::{IdentityProvider, IdpConfig};
use crate::rp::{RelyingParty, RpConfig};
use crate::token::{self, JwtSigner, JwtVerifier, SigningKey, VerifyingKey};
use crate::util::hash::HashingService;

#[derive(Debug, Parser)]
#[clap(
    name = "fedid-idp",
    version = env!("CARGO_PKG_VERSION"),
    about = "Identity provider issuing signed identity assertions"
)]
pub struct IdpOptions {
    #[clap(long, env = "FEDID_BIND", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,
    /// Origin this provider is reachable at; becomes the `iss` claim.
    #[clap(long, env = "FEDID_ISSUER", default_value = "http://localhost:5000")]
    pub issuer: Origin,
    /// JSON array of accounts, re-read on every lookup. Without it only the
    /// built-in demo account exists.
    #[clap(long, env = "FEDID_ACCOUNTS_FILE")]
    pub accounts_file: Option<PathBuf>,
    #[clap(long, env = "FEDID_SESSION_TTL", default_value = "30")]
    pub session_ttl_secs: u64,
    #[clap(long, env = "FEDID_ASSERTION_TTL", default_value = "3600")]
    pub assertion_ttl_secs: u64,
    /// HS256 shared secret.
    #[clap(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,
    /// ES256 private key, PKCS#8 PEM. Preferred over `jwt_secret` when both are set.
    #[clap(long, env = "JWT_PRIVATE_KEY_FILE")]
    pub jwt_private_key_file: Option<PathBuf>,
    #[clap(long, env = "HASH_SECRET")]
    pub hash_secret: String,
    #[clap(long, env = "FEDID_BRAND_BACKGROUND", default_value = "#54a4ff")]
    pub brand_background_color: String,
    #[clap(long, env = "FEDID_BRAND_COLOR", default_value = "#ffffff")]
    pub brand_color: String,
    #[clap(long, env = "FEDID_BRAND_ICON")]
    pub brand_icon_url: Option<String>,
    #[clap(long, env = "FEDID_PRIVACY_POLICY_URL")]
    pub privacy_policy_url: Option<String>,
    #[clap(long, env = "FEDID_TERMS_OF_SERVICE_URL")]
    pub terms_of_service_url: Option<String>,
}

impl IdpOptions {
    pub fn config(&self) -> IdpConfig {
        let mut config = IdpConfig::new(self.issuer.clone());
        config.session_ttl = Duration::from_secs(self.session_ttl_secs);
        config.assertion_ttl = Duration::from_secs(self.assertion_ttl_secs);
        config.branding.background_color = self.brand_background_color.clone();
        config.branding.color = self.brand_color.clone();
        if let Some(url) = &self.brand_icon_url {
            config.branding.icons = vec![Icon {
                url: url.clone(),
                size: None,
            }];
        }
        config.client_metadata.privacy_policy_url = self.privacy_policy_url.clone();
        config.client_metadata.terms_of_service_url = self.terms_of_service_url.clone();
        config
    }

    pub fn signing_key(&self) -> Result<SigningKey, Error> {
        match (&self.jwt_private_key_file, &self.jwt_secret) {
            (Some(path), _) => Ok(SigningKey::EcPrivatePem(path.clone())),
            (None, Some(secret)) => Ok(SigningKey::Secret(secret.clone())),
            (None, None) => Err(Error::Internal(
                "supply JWT_SECRET or JWT_PRIVATE_KEY_FILE".to_string(),
            )),
        }
    }

    pub fn directory(&self) -> Arc<dyn AccountDirectory> {
        match &self.accounts_file {
            Some(path) => {
                event!(Level::INFO, path = %path.display(), "Using account file");
                Arc::new(JsonFileDirectory::new(path.clone()))
            }
            None => {
                event!(Level::WARN, "No account file configured, serving the demo account");
                Arc::new(MemoryDirectory::demo(&self.issuer))
            }
        }
    }

    pub fn provider(&self) -> Result<IdentityProvider, Error> {
        let signer = JwtSigner::load(&self.signing_key()?)?;
        let hasher = HashingService::with_secret_key(self.hash_secret.clone());
        Ok(IdentityProvider::new(
            self.config(),
            self.directory(),
            Box::new(signer),
            hasher,
        ))
    }
}

#[derive(Debug, Parser)]
#[clap(
    name = "fedid-rp",
    version = env!("CARGO_PKG_VERSION"),
    about = "Relying party verifying identity assertions"
)]
pub struct RpOptions {
    #[clap(long, env = "FEDID_BIND", default_value = "0.0.0.0:6000")]
    pub bind: SocketAddr,
    /// This relying party's origin; assertions must name it as `aud`.
    #[clap(long, env = "FEDID_ORIGIN", default_value = "http://localhost:6000")]
    pub origin: Origin,
    #[clap(long, env = "FEDID_ISSUER", default_value = "http://localhost:5000")]
    pub issuer: Origin,
    #[clap(long, env = "FEDID_SESSION_TTL", default_value = "30")]
    pub session_ttl_secs: u64,
    #[clap(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,
    /// ES256 public key, SPKI PEM. Preferred over `jwt_secret` when both are set.
    #[clap(long, env = "JWT_PUBLIC_KEY_FILE")]
    pub jwt_public_key_file: Option<PathBuf>,
}

impl RpOptions {
    pub fn config(&self) -> RpConfig {
        let mut config = RpConfig::new(self.origin.clone(), self.issuer.clone());
        config.session_ttl = Duration::from_secs(self.session_ttl_secs);
        config
    }

    pub fn verifying_key(&self) -> Result<VerifyingKey, Error> {
        match (&self.jwt_public_key_file, &self.jwt_secret) {
            (Some(path), _) => Ok(VerifyingKey::EcPublicPem(path.clone())),
            (None, Some(secret)) => Ok(VerifyingKey::Secret(secret.clone())),
            (None, None) => Err(Error::Internal(
                "supply JWT_SECRET or JWT_PUBLIC_KEY_FILE".to_string(),
            )),
        }
    }

    pub fn relying_party(&self) -> Result<RelyingParty, Error> {
        let verifier = JwtVerifier::load(&self.verifying_key()?)?;
        Ok(RelyingParty::new(self.config(), Box::new(verifier)))
    }
}

#[derive(Parser)]
#[clap(
    name = "fedid-util",
    version = env!("CARGO_PKG_VERSION"),
    about = "Operator tooling for fedid"
)]
pub struct UtilOptions {
    #[clap(subcommand)]
    command: SubCommand,
}

#[derive(Parser)]
enum SubCommand {
    HashPassword(HashPasswordCmd),
    ListAccounts(ListAccountsCmd),
    InspectToken(InspectTokenCmd),
}

/// Prints an argon2 hash suitable for an account's `password_hash`.
#[derive(Parser)]
struct HashPasswordCmd {
    #[clap(long, env = "HASH_SECRET")]
    hash_secret: String,
    password: String,
}

#[derive(Parser)]
struct ListAccountsCmd {
    #[clap(long, env = "FEDID_ACCOUNTS_FILE")]
    accounts_file: PathBuf,
}

/// Decodes an assertion without checking its signature.
#[derive(Parser)]
struct InspectTokenCmd {
    token: String,
}

fn hash_password(c: &HashPasswordCmd) -> Result<(), Error> {
    let hasher = HashingService::with_secret_key(c.hash_secret.clone());
    let hashed: HashedPassword = hasher.hash(&Password(c.password.clone()))?;
    println!("{}", hashed.0);
    Ok(())
}

async fn list_accounts(c: &ListAccountsCmd) -> Result<(), Error> {
    let accounts = JsonFileDirectory::new(c.accounts_file.clone())
        .load_all()
        .await?;

    for account in accounts {
        let approved = account
            .user
            .approved_clients
            .iter()
            .map(Origin::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{} {} (email: \"{}\", approved: [{}])",
            account.user.id, account.username, account.user.email, approved
        );
    }
    Ok(())
}

fn inspect_token(c: &InspectTokenCmd) -> Result<(), Error> {
    let (header, claims) = token::inspect(&c.token)?;
    println!("{}", serde_json::to_string_pretty(&header)?);
    println!("{}", serde_json::to_string_pretty(&claims)?);
    Ok(())
}

pub async fn run_cli_action(opts: UtilOptions) -> Result<(), Error> {
    use SubCommand::*;

    match &opts.command {
        HashPassword(c) => hash_password(c),
        ListAccounts(c) => list_accounts(c).await,
        InspectToken(c) => inspect_token(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idp(args: &[&str]) -> IdpOptions {
        let mut argv = vec!["fedid-idp", "--hash-secret", "pepper"];
        argv.extend_from_slice(args);
        IdpOptions::try_parse_from(argv).unwrap()
    }

    #[test]
    fn idp_options_build_config() {
        let opts = idp(&[
            "--issuer",
            "https://idp.example:443/ignored",
            "--assertion-ttl-secs",
            "60",
            "--privacy-policy-url",
            "https://rp.example/privacy",
        ]);
        let config = opts.config();

        assert_eq!(config.issuer.as_str(), "https://idp.example");
        assert_eq!(config.assertion_ttl, Duration::from_secs(60));
        assert_eq!(config.session_ttl, Duration::from_secs(30));
        assert_eq!(
            config.client_metadata.privacy_policy_url.as_deref(),
            Some("https://rp.example/privacy")
        );
        assert_eq!(config.branding.icons[0].url, "https://idp.example/img/fed.png");
    }

    #[test]
    fn issuer_must_be_an_origin() {
        let argv = ["fedid-idp", "--hash-secret", "pepper", "--issuer", "data:text/plain,hi"];
        assert!(IdpOptions::try_parse_from(argv).is_err());
    }

    #[test]
    fn signing_key_from_options() {
        let opts = idp(&["--jwt-private-key-file", "/keys/idp.pem"]);
        assert!(matches!(opts.signing_key(), Ok(SigningKey::EcPrivatePem(_))));

        let opts = idp(&["--jwt-secret", "s3cret"]);
        assert!(matches!(opts.signing_key(), Ok(SigningKey::Secret(s)) if s == "s3cret"));
    }

    #[test]
    fn provider_builds_with_secret() {
        let opts = idp(&["--jwt-secret", "s3cret"]);
        let provider = opts.provider().unwrap();
        assert_eq!(provider.session_ttl(), Duration::from_secs(30));
    }

    #[test]
    fn rp_options_build_relying_party() {
        let opts = RpOptions::try_parse_from([
            "fedid-rp",
            "--origin",
            "https://rp.example",
            "--issuer",
            "https://idp.example",
            "--jwt-secret",
            "s3cret",
        ])
        .unwrap();

        assert_eq!(opts.bind, "0.0.0.0:6000".parse().unwrap());
        let rp = opts.relying_party().unwrap();
        assert_eq!(rp.config().origin.as_str(), "https://rp.example");
        assert_eq!(rp.config().issuer.as_str(), "https://idp.example");
    }

    #[test]
    fn util_parses_subcommands() {
        assert!(UtilOptions::try_parse_from(["fedid-util", "inspect-token", "abc"]).is_ok());
        assert!(UtilOptions::try_parse_from([
            "fedid-util",
            "hash-password",
            "--hash-secret",
            "pepper",
            "hunter2"
        ])
        .is_ok());
        assert!(UtilOptions::try_parse_from(["fedid-util", "frobnicate"]).is_err());
    }

    #[tokio::test]
    async fn inspect_rejects_garbage() {
        let opts = UtilOptions::try_parse_from(["fedid-util", "inspect-token", "not-a-jwt"]).unwrap();
        assert!(matches!(
            run_cli_action(opts).await,
            Err(Error::MalformedRequest(_))
        ));
    }
}
