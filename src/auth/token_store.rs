//! Persistent storage for OAuth tokens
//!
//! The credential file is plain JSON written with owner-only permissions.
//! Load failures are absorbed into `None` so a corrupt or missing file simply
//! routes the coordinator back through the interactive flow.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Stored credentials (tokens)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    /// Access token
    pub access_token: String,

    /// Refresh token
    pub refresh_token: Option<String>,

    /// Token type (usually "Bearer")
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Granted scopes (space-separated)
    #[serde(default)]
    pub scope: String,

    /// Expiry timestamp (Unix seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<i64>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// File-backed token store
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Create a store for the given credential file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the credential file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load stored credentials. Any failure (missing file, unreadable,
    /// malformed JSON, record without an access token) yields `None`.
    pub fn load(&self) -> Option<StoredCredentials> {
        let data = std::fs::read_to_string(&self.path).ok()?;
        let creds: StoredCredentials = serde_json::from_str(&data).ok()?;
        if creds.access_token.is_empty() {
            tracing::debug!("ignoring stored credential without access token");
            return None;
        }
        Some(creds)
    }

    /// Save credentials with owner-only permissions
    pub fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(credentials)?;

        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

            // The file is born 0600; the token is never on disk with wider
            // permissions, not even between create and chmod.
            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)?;
            file.write_all(data.as_bytes())?;

            // mode() only applies on create; tighten a pre-existing file too.
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        #[cfg(not(unix))]
        std::fs::write(&self.path, data)?;

        Ok(())
    }

    /// Delete the credential file. Idempotent.
    pub fn delete(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_credentials() -> StoredCredentials {
        StoredCredentials {
            access_token: "test-access".to_string(),
            refresh_token: Some("test-refresh".to_string()),
            token_type: "Bearer".to_string(),
            scope: "https://www.googleapis.com/auth/gmail.modify".to_string(),
            expiry: Some(1234567890),
        }
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("credentials.json"));

        let creds = sample_credentials();
        store.save(&creds).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, creds);
    }

    #[test]
    fn load_missing_file_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("nope.json"));
        assert!(store.load().is_none());
    }

    #[test]
    fn load_corrupt_file_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(TokenStore::new(path).load().is_none());
    }

    #[test]
    fn load_rejects_empty_access_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"access_token":"","token_type":"Bearer"}"#).unwrap();
        assert!(TokenStore::new(path).load().is_none());
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("credentials.json"));
        store.save(&sample_credentials()).unwrap();
        store.delete().unwrap();
        store.delete().unwrap();
        assert!(store.load().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("credentials.json"));
        store.save(&sample_credentials()).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn save_tightens_preexisting_wide_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = TokenStore::new(&path);
        store.save(&sample_credentials()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
