//! Credential storage for the admin session guard.
//!
//! The operator's session cookie or bearer token is the only local state this
//! crate persists. [`CredentialStore`] abstracts where it lives; the guard is
//! the only caller.
//!
//! # File Format
//!
//! ```toml
//! [instances.local]
//! email = "admin@example.com"
//! server_url = "http://127.0.0.1:5000"
//!
//! [instances.local.credential]
//! kind = "session_cookie"
//! name = "session"
//! value = "8f2c..."
//! ```

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::auth::Credential;
use crate::error::ConfigError;

pub type StoreResult<T> = std::result::Result<T, ConfigError>;

/// Credential saved for one backend instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    /// Operator email, for display only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,

    pub credential: Credential,
}

impl StoredCredential {
    pub fn new(credential: Credential) -> Self {
        Self {
            email: None,
            server_url: None,
            credential,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }
}

/// Storage backend for operator credentials, keyed by instance name.
pub trait CredentialStore: Send + Sync {
    /// `Ok(None)` when nothing is stored for the instance.
    fn get_credentials(&self, instance: &str) -> StoreResult<Option<StoredCredential>>;

    /// Overwrites any existing entry for the instance.
    fn set_credentials(&mut self, instance: &str, credentials: &StoredCredential) -> StoreResult<()>;

    /// `Ok(())` even if nothing was stored.
    fn delete_credentials(&mut self, instance: &str) -> StoreResult<()>;

    fn list_instances(&self) -> StoreResult<Vec<String>>;

    fn has_credentials(&self, instance: &str) -> StoreResult<bool> {
        Ok(self.get_credentials(instance)?.is_some())
    }
}

/// In-memory store; nothing survives a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    credentials: HashMap<String, StoredCredential>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get_credentials(&self, instance: &str) -> StoreResult<Option<StoredCredential>> {
        Ok(self.credentials.get(instance).cloned())
    }

    fn set_credentials(&mut self, instance: &str, credentials: &StoredCredential) -> StoreResult<()> {
        self.credentials
            .insert(instance.to_string(), credentials.clone());
        Ok(())
    }

    fn delete_credentials(&mut self, instance: &str) -> StoreResult<()> {
        self.credentials.remove(instance);
        Ok(())
    }

    fn list_instances(&self) -> StoreResult<Vec<String>> {
        let mut instances: Vec<String> = self.credentials.keys().cloned().collect();
        instances.sort();
        Ok(instances)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    instances: HashMap<String, StoredCredential>,
}

/// TOML-file store with owner-only permissions on Unix.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    file_path: PathBuf,
    cache: HashMap<String, StoredCredential>,
}

impl FileCredentialStore {
    /// `<config dir>/booking/credentials.toml`, falling back to `./.booking/`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("booking"))
            .unwrap_or_else(|| PathBuf::from(".booking"))
            .join("credentials.toml")
    }

    pub fn new() -> StoreResult<Self> {
        Self::with_path(Self::default_path())
    }

    pub fn with_path(file_path: impl Into<PathBuf>) -> StoreResult<Self> {
        let mut store = Self {
            file_path: file_path.into(),
            cache: HashMap::new(),
        };
        store.load_from_disk()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn load_from_disk(&mut self) -> StoreResult<()> {
        if !self.file_path.exists() {
            self.cache.clear();
            return Ok(());
        }

        let contents = fs::read_to_string(&self.file_path)
            .map_err(|e| ConfigError::io(&self.file_path, e))?;
        let file: CredentialsFile = toml::from_str(&contents)?;
        debug!(
            "[CREDENTIALS] Loaded {} instance(s) from {}",
            file.instances.len(),
            self.file_path.display()
        );
        self.cache = file.instances;
        Ok(())
    }

    fn save_to_disk(&self) -> StoreResult<()> {
        let file = CredentialsFile {
            instances: self.cache.clone(),
        };
        let contents = toml::to_string_pretty(&file)?;

        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
            }
        }
        fs::write(&self.file_path, contents).map_err(|e| ConfigError::io(&self.file_path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.file_path, fs::Permissions::from_mode(0o600))
                .map_err(|e| ConfigError::io(&self.file_path, e))?;
        }

        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get_credentials(&self, instance: &str) -> StoreResult<Option<StoredCredential>> {
        Ok(self.cache.get(instance).cloned())
    }

    fn set_credentials(&mut self, instance: &str, credentials: &StoredCredential) -> StoreResult<()> {
        self.cache.insert(instance.to_string(), credentials.clone());
        self.save_to_disk()
    }

    fn delete_credentials(&mut self, instance: &str) -> StoreResult<()> {
        if self.cache.remove(instance).is_some() {
            self.save_to_disk()?;
        }
        Ok(())
    }

    fn list_instances(&self) -> StoreResult<Vec<String>> {
        let mut instances: Vec<String> = self.cache.keys().cloned().collect();
        instances.sort();
        Ok(instances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cookie_entry() -> StoredCredential {
        StoredCredential::new(Credential::session_cookie("session", "abc"))
            .with_email("admin@x.com")
            .with_server_url("http://127.0.0.1:5000")
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryCredentialStore::new();
        assert!(!store.has_credentials("local").unwrap());

        store.set_credentials("local", &cookie_entry()).unwrap();
        assert_eq!(store.get_credentials("local").unwrap(), Some(cookie_entry()));
        assert_eq!(store.list_instances().unwrap(), vec!["local".to_string()]);

        store.delete_credentials("local").unwrap();
        store.delete_credentials("local").unwrap();
        assert!(store.get_credentials("local").unwrap().is_none());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("credentials.toml");

        let mut store = FileCredentialStore::with_path(&path).unwrap();
        store.set_credentials("local", &cookie_entry()).unwrap();
        store
            .set_credentials(
                "prod",
                &StoredCredential::new(Credential::bearer_token("tok")),
            )
            .unwrap();

        let reopened = FileCredentialStore::with_path(&path).unwrap();
        assert_eq!(reopened.get_credentials("local").unwrap(), Some(cookie_entry()));
        assert_eq!(
            reopened.get_credentials("prod").unwrap().unwrap().credential,
            Credential::bearer_token("tok")
        );
        assert_eq!(
            reopened.list_instances().unwrap(),
            vec!["local".to_string(), "prod".to_string()]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.toml");
        let mut store = FileCredentialStore::with_path(&path).unwrap();
        store.set_credentials("local", &cookie_entry()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.toml");
        fs::write(&path, "[instances.local\nbroken").unwrap();

        assert!(matches!(
            FileCredentialStore::with_path(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
