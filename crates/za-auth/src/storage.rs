//! Token storage for persisting the cached access token between runs.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};

/// Default file name for the persisted token.
pub const DEFAULT_TOKEN_FILE: &str = "access_token.json";

/// An access token together with the unix time (seconds) it was issued.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    /// The access token.
    pub access_token: String,
    /// Issue time in fractional unix seconds.
    pub token_timestamp: f64,
}

impl std::fmt::Debug for StoredToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredToken")
            .field("access_token", &"[REDACTED]")
            .field("token_timestamp", &self.token_timestamp)
            .finish()
    }
}

impl StoredToken {
    /// Create a token stamped with the current time.
    pub fn issued_now(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_timestamp: now_seconds(),
        }
    }

    /// Age of the token in seconds. Tokens from the future count as fresh.
    pub fn age_seconds(&self) -> f64 {
        (now_seconds() - self.token_timestamp).max(0.0)
    }
}

/// Current unix time in fractional seconds.
pub(crate) fn now_seconds() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Trait for token storage implementations.
pub trait TokenStorage: Send + Sync + std::fmt::Debug {
    /// Load the persisted token, if any.
    fn load(&self) -> Result<Option<StoredToken>>;

    /// Persist a token.
    fn save(&self, token: &StoredToken) -> Result<()>;

    /// Remove the persisted token.
    fn delete(&self) -> Result<()>;
}

/// File-based token storage holding a single JSON document.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Storage at `access_token.json` in the working directory.
    pub fn new() -> Self {
        Self::with_path(DEFAULT_TOKEN_FILE)
    }

    /// Storage at `~/.zoho-analytics/access_token.json`.
    pub fn in_home_dir() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            Error::new(ErrorKind::Config("Could not find home directory".to_string()))
        })?;
        Ok(Self::with_path(
            home.join(".zoho-analytics").join(DEFAULT_TOKEN_FILE),
        ))
    }

    /// Storage at a custom path.
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the token file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileTokenStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<StoredToken>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = std::fs::read_to_string(&self.path)?;
        let stored: StoredToken = serde_json::from_str(&json)?;
        Ok(Some(stored))
    }

    fn save(&self, token: &StoredToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string(token)?;
        std::fs::write(&self.path, json)?;

        // Owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    fn delete(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// In-process token storage, mostly useful in tests and short-lived tools.
#[derive(Debug, Default, Clone)]
pub struct MemoryTokenStorage {
    token: Arc<Mutex<Option<StoredToken>>>,
}

impl MemoryTokenStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage that already holds a token.
    pub fn with_token(token: StoredToken) -> Self {
        Self {
            token: Arc::new(Mutex::new(Some(token))),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<StoredToken>>> {
        self.token
            .lock()
            .map_err(|_| Error::new(ErrorKind::Other("token storage lock poisoned".to_string())))
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<StoredToken>> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, token: &StoredToken) -> Result<()> {
        *self.lock()? = Some(token.clone());
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}

type LoadFn = dyn Fn() -> Result<Option<StoredToken>> + Send + Sync;
type SaveFn = dyn Fn(&StoredToken) -> Result<()> + Send + Sync;

/// Storage backed by caller-supplied closures, e.g. a secrets manager or a
/// database row.
#[derive(Clone)]
pub struct CallbackTokenStorage {
    load: Arc<LoadFn>,
    save: Arc<SaveFn>,
}

impl std::fmt::Debug for CallbackTokenStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackTokenStorage").finish_non_exhaustive()
    }
}

impl CallbackTokenStorage {
    /// Create storage from load and save callbacks.
    pub fn new<L, S>(load: L, save: S) -> Self
    where
        L: Fn() -> Result<Option<StoredToken>> + Send + Sync + 'static,
        S: Fn(&StoredToken) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            load: Arc::new(load),
            save: Arc::new(save),
        }
    }
}

impl TokenStorage for CallbackTokenStorage {
    fn load(&self) -> Result<Option<StoredToken>> {
        (self.load)()
    }

    fn save(&self, token: &StoredToken) -> Result<()> {
        (self.save)(token)
    }

    /// Callback storage has no delete hook; this is a no-op.
    fn delete(&self) -> Result<()> {
        Ok(())
    }
}
