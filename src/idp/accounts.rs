use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{event, Level};

use crate::core::models::{Account, UserRecord};
use crate::core::types::{AccountId, Origin};
use crate::error::Error;

/// Where user accounts live. Implementations report any backend failure as
/// [`Error::AccountLookupFailed`].
#[async_trait]
pub trait AccountDirectory: Send + Sync + std::fmt::Debug {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, Error>;
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, Error>;
}

#[derive(Debug, Default)]
pub struct MemoryDirectory {
    accounts: Vec<Account>,
}

impl MemoryDirectory {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }

    /// A single demo user approved for `https://rp.example`.
    pub fn demo(issuer: &Origin) -> Self {
        Self::new(vec![demo_account(issuer)])
    }
}

pub fn demo_account(issuer: &Origin) -> Account {
    let user = UserRecord {
        id: AccountId("1001".to_string()),
        name: "Fed CM".to_string(),
        email: "fedcm@example.com".to_string(),
        picture: issuer.join("/img/icon.png"),
        approved_clients: std::iter::once(Origin("https://rp.example".to_string())).collect(),
    };
    Account {
        username: "fedcm@example.com".to_string(),
        password_hash: None,
        user,
    }
}

#[async_trait]
impl AccountDirectory for MemoryDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, Error> {
        Ok(self
            .accounts
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, Error> {
        Ok(self.accounts.iter().find(|a| &a.user.id == id).cloned())
    }
}

/// Accounts read from a JSON array on disk. The file is re-read on every
/// lookup, so edits take effect without a restart.
#[derive(Debug)]
pub struct JsonFileDirectory {
    path: PathBuf,
}

impl JsonFileDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn load_all(&self) -> Result<Vec<Account>, Error> {
        let contents = tokio::fs::read(&self.path).await.map_err(|e| {
            event!(Level::ERROR, path = ?self.path, error = %e, "Failed to read accounts file");
            Error::AccountLookupFailed
        })?;

        serde_json::from_slice(&contents).map_err(|e| {
            event!(Level::ERROR, path = ?self.path, error = %e, "Failed to parse accounts file");
            Error::AccountLookupFailed
        })
    }
}

#[async_trait]
impl AccountDirectory for JsonFileDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, Error> {
        let accounts = self.load_all().await?;
        Ok(accounts.into_iter().find(|a| a.username == username))
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, Error> {
        let accounts = self.load_all().await?;
        Ok(accounts.into_iter().find(|a| &a.user.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ACCOUNTS: &str = r#"[
        {
            "username": "alice",
            "id": "a-1",
            "name": "Alice",
            "email": "alice@example.com",
            "picture": "https://idp.example/alice.png",
            "approved_clients": ["https://rp.example", "https://other.example"]
        }
    ]"#;

    #[tokio::test]
    async fn demo_directory_has_reference_user() {
        let issuer = Origin("https://idp.example".to_string());
        let dir = MemoryDirectory::demo(&issuer);
        let account = dir.find_by_username("fedcm@example.com").await.unwrap().unwrap();
        assert_eq!(account.user.id, AccountId("1001".to_string()));
        assert_eq!(account.user.picture, "https://idp.example/img/icon.png");
        assert!(dir.find_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_directory_lookups() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ACCOUNTS.as_bytes()).unwrap();

        let dir = JsonFileDirectory::new(file.path());
        let by_name = dir.find_by_username("alice").await.unwrap().unwrap();
        let by_id = dir
            .find_by_id(&AccountId("a-1".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_name.user, by_id.user);
        assert_eq!(by_id.user.approved_clients.len(), 2);
    }

    #[tokio::test]
    async fn missing_file_fails_lookup() {
        let dir = JsonFileDirectory::new("/nonexistent/accounts.json");
        let result = dir.find_by_id(&AccountId("a-1".to_string())).await;
        assert!(matches!(result, Err(Error::AccountLookupFailed)));
    }

    #[tokio::test]
    async fn corrupt_file_fails_lookup() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let dir = JsonFileDirectory::new(file.path());
        let result = dir.find_by_username("alice").await;
        assert!(matches!(result, Err(Error::AccountLookupFailed)));
    }
}
