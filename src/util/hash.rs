use crate::core::types::{HashedPassword, HashedSessionId, Password, SessionId};
use crate::error::Error;

use super::random::FromRandom;

#[derive(Debug)]
pub struct Salt(pub String);

pub trait HashTo: AsRef<str> {
    type HashedType;
}

impl HashTo for Password {
    type HashedType = HashedPassword;
}

impl HashTo for SessionId {
    type HashedType = HashedSessionId;
}

/// Salted argon2 hashing for account passwords, keyed with a server secret.
pub struct HashingService {
    secret_key: String,
}

impl std::fmt::Debug for HashingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HashingService {{ ... }}")
    }
}

impl HashingService {
    pub fn with_secret_key(secret_key: String) -> Self {
        Self { secret_key }
    }

    fn get_config(&self) -> argon2::Config<'_> {
        let mut config = argon2::Config::default();
        config.secret = self.secret_key.as_bytes();
        config
    }

    pub fn hash<T, H>(&self, to_hash: &T) -> Result<H, Error>
    where
        T: HashTo<HashedType = H>,
        H: From<String>,
    {
        let salt = Salt::from_random();
        let hash = argon2::hash_encoded(
            to_hash.as_ref().as_bytes(),
            salt.0.as_bytes(),
            &self.get_config(),
        )
        .map_err(|e| Error::Internal(e.to_string()))?;

        Ok(hash.into())
    }

    pub fn verify<T, H>(&self, secret: &T, hashed: &H) -> Result<bool, Error>
    where
        T: HashTo<HashedType = H>,
        H: AsRef<str>,
    {
        argon2::verify_encoded_ext(
            hashed.as_ref(),
            secret.as_ref().as_bytes(),
            self.secret_key.as_bytes(),
            &[],
        )
        .map_err(|e| Error::Internal(e.to_string()))
    }
}

/// Unsalted SHA-512 digest, for values that are already high-entropy.
pub fn hash_without_salt<T, H>(to_hash: &T) -> H
where
    T: HashTo<HashedType = H>,
    H: From<String>,
{
    use sha2::Digest;

    let digest = sha2::Sha512::digest(to_hash.as_ref().as_bytes());
    base64::encode_config(digest, base64::URL_SAFE).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let hasher = HashingService::with_secret_key("pepper".to_string());
        let password = Password("correct horse".to_string());
        let hashed: HashedPassword = hasher.hash(&password).unwrap();

        assert!(hasher.verify(&password, &hashed).unwrap());
        assert!(!hasher
            .verify(&Password("wrong horse".to_string()), &hashed)
            .unwrap());
    }

    #[test]
    fn secret_key_is_part_of_the_hash() {
        let password = Password("correct horse".to_string());
        let hashed: HashedPassword = HashingService::with_secret_key("a".to_string())
            .hash(&password)
            .unwrap();

        let other = HashingService::with_secret_key("b".to_string());
        assert!(!other.verify(&password, &hashed).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        let hasher = HashingService::with_secret_key(String::new());
        let result = hasher.verify(
            &Password("x".to_string()),
            &HashedPassword("not-a-phc-string".to_string()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn session_digest_is_stable() {
        let id = SessionId("abc".to_string());
        let a: HashedSessionId = hash_without_salt(&id);
        let b: HashedSessionId = hash_without_salt(&id);
        assert_eq!(a, b);
        assert_ne!(a.0, "abc");
    }
}
