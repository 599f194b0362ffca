//! Session Token Holder
//!
//! A single bearer token, persisted under one key and passed explicitly to
//! every API call. There is no refresh and no expiry tracking: an expired
//! token simply makes requests fail.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

use crate::client::ClientError;

/// The one key the token is persisted under
pub const TOKEN_KEY: &str = "accessToken";

/// Persistence for the bearer token
pub trait TokenStore: Send + Sync {
    /// Read the stored token, if any
    fn load(&self) -> Result<Option<String>, SessionError>;

    /// Replace the stored token
    fn save(&self, token: &str) -> Result<(), SessionError>;

    /// Delete the stored token
    fn clear(&self) -> Result<(), SessionError>;
}

/// Token persisted as `{"accessToken": "..."}` in a JSON file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TokenFile {
    #[serde(default, rename = "accessToken")]
    access_token: Option<String>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, e: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            error: e.to_string(),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let file: TokenFile = serde_json::from_str(&content).map_err(|e| SessionError::Parse {
            path: self.path.clone(),
            error: e.to_string(),
        })?;

        Ok(file.access_token.filter(|t| !t.is_empty()))
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let body = serde_json::to_string_pretty(&TokenFile {
            access_token: Some(token.to_string()),
        })
        .map_err(|e| SessionError::Parse {
            path: self.path.clone(),
            error: e.to_string(),
        })?;

        std::fs::write(&self.path, body).map_err(|e| self.io_error(e))?;
        tracing::debug!(path = ?self.path, "Stored access token");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = ?self.path, "Removed access token");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// In-process token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, SessionError> {
        self.token
            .lock()
            .map_err(|e| SessionError::Lock(e.to_string()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self.slot()?.clone())
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        *self.slot()? = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.slot()? = None;
        Ok(())
    }
}

/// The credential handed to every authenticated call
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl Session {
    /// A session without a credential
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    /// A session holding `token` without persisting it
    pub fn with_token(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: (!token.is_empty()).then_some(token),
        }
    }

    /// Read whatever token the store currently holds
    pub fn restore(store: &dyn TokenStore) -> Result<Self, SessionError> {
        Ok(Self {
            token: store.load()?.filter(|t| !t.is_empty()),
        })
    }

    /// Persist `token` and hold it
    pub fn establish(store: &dyn TokenStore, token: &str) -> Result<Self, SessionError> {
        store.save(token)?;
        Ok(Self::with_token(token))
    }

    /// Delete the persisted token and drop the held one
    pub fn end(&mut self, store: &dyn TokenStore) -> Result<(), SessionError> {
        store.clear()?;
        self.token = None;
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The bearer token, or `MissingCredential` when none is held
    pub fn bearer(&self) -> Result<&str, ClientError> {
        self.token.as_deref().ok_or(ClientError::MissingCredential)
    }
}

/// Token persistence errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to access token file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse token file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Token store lock poisoned: {0}")]
    Lock(String),
}
