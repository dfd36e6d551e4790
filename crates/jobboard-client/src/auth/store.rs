use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::RwLock;

const SERVICE_NAME: &str = "jobboard";

/// The single key the bearer token lives under
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Trait for bearer credential storage
///
/// The client reads the token on every request and clears it when the
/// server rejects it; stores hand out whatever was written last.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the stored token, if any
    async fn get(&self) -> Result<Option<String>>;

    /// Stores the token, replacing any previous one
    async fn set(&self, token: &str) -> Result<()>;

    /// Removes the stored token
    async fn clear(&self) -> Result<()>;
}

/// Persistent credential storage using the file system with a keyring mirror
///
/// The plain file is authoritative; the keyring copy is only read back when
/// the file is missing. A blank file means signed out and never falls back.
pub struct FileCredentialStore {
    keyring_entry: Option<keyring::Entry>,
    path: PathBuf,
}

impl FileCredentialStore {
    /// Creates a store in the application config directory
    pub fn new() -> Result<Self> {
        let config_dir = crate::config::ConfigManager::config_dir()?;
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        let path = config_dir.join(AUTH_TOKEN_KEY);

        Ok(match keyring::Entry::new(SERVICE_NAME, AUTH_TOKEN_KEY) {
            Ok(entry) => Self::with_keyring(path, entry),
            Err(e) => {
                tracing::debug!("Keyring unavailable, using token file only: {}", e);
                Self::with_path(path)
            }
        })
    }

    /// Creates a store at a custom path mirrored to the given keyring entry
    pub fn with_keyring(path: PathBuf, entry: keyring::Entry) -> Self {
        Self {
            keyring_entry: Some(entry),
            path,
        }
    }

    /// Creates a file-only store at a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            keyring_entry: None,
            path,
        }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self) -> Result<Option<String>> {
        if self.path.exists() {
            let token = std::fs::read_to_string(&self.path).context("Failed to read token file")?;
            let token = token.trim();
            return Ok((!token.is_empty()).then(|| token.to_string()));
        }

        if let Some(ref entry) = self.keyring_entry {
            if let Ok(token) = entry.get_password() {
                return Ok(Some(token));
            }
        }

        Ok(None)
    }

    async fn set(&self, token: &str) -> Result<()> {
        std::fs::write(&self.path, token).context("Failed to write token file")?;

        if let Some(ref entry) = self.keyring_entry {
            if let Err(e) = entry.set_password(token) {
                tracing::debug!("Keyring unavailable, token kept in file only: {}", e);
            }
        }

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to delete token file")?;
        }

        if let Some(ref entry) = self.keyring_entry {
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => {
                    tracing::warn!("Failed to remove keyring token: {}", e);
                    // Blank file blocks the keyring fallback in get()
                    std::fs::write(&self.path, "").context("Failed to write token file")?;
                }
            }
        }

        Ok(())
    }
}

/// In-memory credential storage
///
/// Used for sessions that should not outlive the process, and in tests.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    /// Creates a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a memory store with an initial token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self) -> Result<Option<String>> {
        Ok(self.token.read().await.clone())
    }

    async fn set(&self, token: &str) -> Result<()> {
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.token.write().await = None;
        Ok(())
    }
}
