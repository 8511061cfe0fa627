use std::fmt;
use std::str::FromStr;

use subtle::ConstantTimeEq;

#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl FromStr for AccountId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A web origin (`scheme://host[:port]`).
///
/// Values arriving from clients are compared verbatim. Only configured
/// origins go through [`Origin::from_str`], which rejects anything that is
/// not a tuple origin and strips paths and default ports.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct Origin(pub String);

#[derive(Debug, thiserror::Error)]
#[error("not a valid origin: {0}")]
pub struct InvalidOrigin(pub String);

impl Origin {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Absolute URL for a path served from this origin.
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.0, path)
    }
}

impl FromStr for Origin {
    type Err = InvalidOrigin;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = url::Url::parse(s).map_err(|_| InvalidOrigin(s.to_string()))?;
        let origin = url.origin();
        if !origin.is_tuple() {
            return Err(InvalidOrigin(s.to_string()));
        }
        Ok(Self(origin.ascii_serialization()))
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct Nonce(pub String);

impl Nonce {
    /// Constant-time comparison. An empty nonce never matches.
    pub fn matches(&self, other: &Nonce) -> bool {
        if self.0.is_empty() || other.0.is_empty() {
            return false;
        }
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl AsRef<str> for Nonce {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Opaque browser session identifier, as carried in the session cookie.
#[derive(Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId {{ ... }}")
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Digest of a [`SessionId`]; the only form kept server side.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct HashedSessionId(pub String);

impl From<String> for HashedSessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Clone, Default, serde::Deserialize)]
#[serde(transparent)]
pub struct Password(pub String);

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password {{ ... }}")
    }
}

impl AsRef<str> for Password {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct HashedPassword(pub String);

impl From<String> for HashedPassword {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for HashedPassword {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_origin_is_normalized() {
        let origin: Origin = "https://rp.example:443/some/path".parse().unwrap();
        assert_eq!(origin.as_str(), "https://rp.example");

        let origin: Origin = "http://localhost:6000".parse().unwrap();
        assert_eq!(origin.as_str(), "http://localhost:6000");
    }

    #[test]
    fn opaque_origin_is_rejected() {
        assert!("data:text/plain,hello".parse::<Origin>().is_err());
        assert!("not a url".parse::<Origin>().is_err());
    }

    #[test]
    fn origin_join() {
        let origin = Origin("https://idp.example".to_string());
        assert_eq!(origin.join("/fedcm.json"), "https://idp.example/fedcm.json");
    }

    #[test]
    fn nonce_matching_is_exact() {
        let n = Nonce("abc123".to_string());
        assert!(n.matches(&Nonce("abc123".to_string())));
        assert!(!n.matches(&Nonce("abc12".to_string())));
        assert!(!n.matches(&Nonce("abc1234".to_string())));
        assert!(!n.matches(&Nonce("ABC123".to_string())));
    }

    #[test]
    fn empty_nonce_never_matches() {
        let empty = Nonce(String::new());
        assert!(!empty.matches(&empty.clone()));
        assert!(!Nonce("x".to_string()).matches(&empty));
    }

    #[test]
    fn secrets_are_not_printed() {
        let id = SessionId("very-secret".to_string());
        assert!(!format!("{:?}", id).contains("very-secret"));
        let password = Password("hunter2".to_string());
        assert!(!format!("{:?}", password).contains("hunter2"));
    }
}
