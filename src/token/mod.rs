//! Signing and signature checking for identity assertions.
//!
//! The IdP holds an [`AssertionSigner`], the RP an [`AssertionVerifier`].
//! Both are loaded once at startup. The JWT implementations support an
//! HS256 shared secret and an ES256 key pair.

pub mod claims;

use std::path::PathBuf;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{event, Level};

use crate::error::Error;
pub use claims::AssertionClaims;

pub trait AssertionSigner: Send + Sync {
    fn sign(&self, claims: &AssertionClaims) -> Result<String, Error>;
}

pub trait AssertionVerifier: Send + Sync {
    /// Parses `token` and checks its signature. Claim values are not
    /// validated here.
    fn verify(&self, token: &str) -> Result<AssertionClaims, Error>;
}

#[derive(Debug, Clone)]
pub enum SigningKey {
    Secret(String),
    EcPrivatePem(PathBuf),
}

#[derive(Debug, Clone)]
pub enum VerifyingKey {
    Secret(String),
    EcPublicPem(PathBuf),
}

fn read_key_file(path: &PathBuf) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|e| {
        event!(Level::ERROR, path = ?path, error = %e, "Failed to read key file");
        Error::Internal(format!("cannot read key file {}", path.display()))
    })
}

fn non_empty(secret: &str) -> Result<&[u8], Error> {
    if secret.is_empty() {
        Err(Error::Internal("empty signing secret".to_string()))
    } else {
        Ok(secret.as_bytes())
    }
}

pub struct JwtSigner {
    key: EncodingKey,
    algorithm: Algorithm,
}

impl std::fmt::Debug for JwtSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JwtSigner {{ algorithm: {:?}, ... }}", self.algorithm)
    }
}

impl JwtSigner {
    pub fn from_secret(secret: &str) -> Result<Self, Error> {
        Ok(Self {
            key: EncodingKey::from_secret(non_empty(secret)?),
            algorithm: Algorithm::HS256,
        })
    }

    pub fn from_ec_pem(pem: &[u8]) -> Result<Self, Error> {
        let key = EncodingKey::from_ec_pem(pem)
            .map_err(|e| Error::Internal(format!("invalid EC private key: {}", e)))?;
        Ok(Self {
            key,
            algorithm: Algorithm::ES256,
        })
    }

    pub fn load(key: &SigningKey) -> Result<Self, Error> {
        match key {
            SigningKey::Secret(secret) => Self::from_secret(secret),
            SigningKey::EcPrivatePem(path) => Self::from_ec_pem(&read_key_file(path)?),
        }
    }
}

impl AssertionSigner for JwtSigner {
    fn sign(&self, claims: &AssertionClaims) -> Result<String, Error> {
        jsonwebtoken::encode(&Header::new(self.algorithm), claims, &self.key).map_err(|e| {
            event!(Level::ERROR, error = %e, "Failed to sign assertion");
            Error::Internal(e.to_string())
        })
    }
}

pub struct JwtVerifier {
    key: DecodingKey<'static>,
    algorithm: Algorithm,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JwtVerifier {{ algorithm: {:?}, ... }}", self.algorithm)
    }
}

impl JwtVerifier {
    pub fn from_secret(secret: &str) -> Result<Self, Error> {
        Ok(Self {
            key: DecodingKey::from_secret(non_empty(secret)?).into_static(),
            algorithm: Algorithm::HS256,
        })
    }

    pub fn from_ec_pem(pem: &[u8]) -> Result<Self, Error> {
        let key = DecodingKey::from_ec_pem(pem)
            .map_err(|e| Error::Internal(format!("invalid EC public key: {}", e)))?
            .into_static();
        Ok(Self {
            key,
            algorithm: Algorithm::ES256,
        })
    }

    pub fn load(key: &VerifyingKey) -> Result<Self, Error> {
        match key {
            VerifyingKey::Secret(secret) => Self::from_secret(secret),
            VerifyingKey::EcPublicPem(path) => Self::from_ec_pem(&read_key_file(path)?),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation
    }
}

impl AssertionVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<AssertionClaims, Error> {
        jsonwebtoken::decode::<AssertionClaims>(token, &self.key, &self.validation())
            .map(|td| td.claims)
            .map_err(|e| {
                event!(Level::DEBUG, error = %e, "Rejected assertion");
                Error::SignatureInvalid
            })
    }
}

/// Decodes a token without checking its signature. For operator tooling only.
pub fn inspect(token: &str) -> Result<(Header, AssertionClaims), Error> {
    jsonwebtoken::dangerous_insecure_decode::<AssertionClaims>(token)
        .map(|td| (td.header, td.claims))
        .map_err(|e| Error::malformed(&e.to_string()))
}

pub fn current_timestamp() -> u64 {
    use std::time::SystemTime;

    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
