//! On-disk cache of a completed login
//!
//! After a successful handshake the CLI can store the bearer token and the
//! cookies of the HTTP session in `session.toml` so a later run may skip the
//! Smart-ID round trip. The cache carries no expiry information from the
//! broker; callers must validate a loaded entry before trusting it.
//!
//! ```toml
//! bearer_token = "eyJ..."
//! saved_at = "2026-10-15T08:30:00Z"
//!
//! [[cookies]]
//! url = "https://tahvel.edu.ee/"
//! cookie = "JSESSIONID=..."
//! ```

use crate::http::StoredCookie;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The name of the session cache file
pub const SESSION_FILE_NAME: &str = "session.toml";

/// Directory under the home directory holding config and cache
const APP_DIR_NAME: &str = ".tunniplaan";

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Session cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session cache is not valid TOML: {0}")]
    Deserialize(#[from] toml::de::Error),

    #[error("Failed to serialize session cache: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine home directory")]
    NoHomeDir,
}

/// A persisted login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCache {
    pub bearer_token: String,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub cookies: Vec<StoredCookie>,
}

impl SessionCache {
    pub fn new(bearer_token: impl Into<String>, cookies: Vec<StoredCookie>) -> Self {
        Self {
            bearer_token: bearer_token.into(),
            saved_at: Utc::now(),
            cookies,
        }
    }

    /// Age of the entry relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.saved_at
    }
}

/// Reads and writes the session cache file.
#[derive(Debug, Clone)]
pub struct SessionCacheStore {
    path: PathBuf,
}

impl SessionCacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached session, `None` when no cache file exists.
    pub fn load(&self) -> Result<Option<SessionCache>, CacheError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(toml::from_str(&content)?))
    }

    pub fn save(&self, cache: &SessionCache) -> Result<(), CacheError> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(cache)?;

        // Write to a temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("toml.tmp");
        std::fs::write(&temp_path, &content)?;

        // The file holds a bearer token: owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&temp_path, permissions)?;
        }

        std::fs::rename(&temp_path, &self.path)?;

        tracing::debug!(path = %self.path.display(), "Session cache saved");
        Ok(())
    }

    /// Remove the cache file. Returns whether a file was removed.
    pub fn clear(&self) -> Result<bool, CacheError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Get the default application directory (`~/.tunniplaan`)
pub fn get_default_app_dir() -> Result<PathBuf, CacheError> {
    let home = dirs::home_dir().ok_or(CacheError::NoHomeDir)?;
    Ok(home.join(APP_DIR_NAME))
}
