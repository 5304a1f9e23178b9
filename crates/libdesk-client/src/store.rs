//! Credential persistence.
//!
//! A [`CredentialStore`] holds exactly one [`StoredCredentials`] record: the
//! access token, refresh token, role and username of the current session.
//! Tokens are opaque strings and are never inspected here.
//!
//! Two backends ship with the crate:
//!
//! - [`MemoryCredentialStore`] - process-local, for tests and embedding
//! - [`FileCredentialStore`] - JSON file under `~/.libdesk`, survives restarts
//!
//! Both write the whole record at once, so a reader never observes a new
//! access token paired with a stale refresh token.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use libdesk_core::StoredCredentials;
use tempfile::NamedTempFile;

use crate::error::StoreError;

/// Durable holder of the current session's credentials.
///
/// `read` never fails: a missing, unreadable or partial record is reported
/// as absent.
pub trait CredentialStore: Send + Sync {
    /// Replace the stored record. Both tokens must be present.
    fn save(&self, credentials: &StoredCredentials) -> Result<(), StoreError>;

    /// Current record, if a complete one exists.
    fn read(&self) -> Option<StoredCredentials>;

    /// Remove the stored record. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), StoreError>;

    fn access_token(&self) -> Option<String> {
        self.read().map(|c| c.access_token)
    }

    fn refresh_token(&self) -> Option<String> {
        self.read().map(|c| c.refresh_token)
    }
}

/// In-memory credential store.
///
/// Does NOT persist across restarts.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    current: ArcSwapOption<StoredCredentials>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `credentials`.
    pub fn with_credentials(credentials: StoredCredentials) -> Self {
        Self {
            current: ArcSwapOption::from_pointee(credentials),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, credentials: &StoredCredentials) -> Result<(), StoreError> {
        if !credentials.is_complete() {
            return Err(StoreError::IncompletePair);
        }
        self.current.store(Some(Arc::new(credentials.clone())));
        Ok(())
    }

    fn read(&self) -> Option<StoredCredentials> {
        self.current
            .load_full()
            .filter(|c| c.is_complete())
            .map(|c| (*c).clone())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.current.store(None);
        Ok(())
    }
}

/// Credential store backed by a JSON file.
///
/// The file holds the four fixed keys `accessToken`, `refreshToken`,
/// `userRole` and `username`. Writes go to an owner-only temp file in the
/// same directory that is then renamed over the target; a failed write
/// leaves neither a partial target nor a stray temp file behind.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/credentials.<profile>.json`
    pub fn for_profile(dir: &Path, profile: &str) -> Self {
        Self::new(dir.join(format!("credentials.{profile}.json")))
    }

    /// Store for `profile` under `~/.libdesk`.
    pub fn default_for_profile(profile: &str) -> Result<Self, StoreError> {
        let dir = dirs::home_dir()
            .ok_or(StoreError::NoHomeDirectory)?
            .join(".libdesk");
        Ok(Self::for_profile(&dir, profile))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, credentials: &StoredCredentials) -> Result<(), StoreError> {
        if !credentials.is_complete() {
            return Err(StoreError::IncompletePair);
        }
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;
        let content = serde_json::to_string_pretty(credentials)?;
        // Created 0600 and removed on drop unless persisted.
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        tracing::debug!(path = %self.path.display(), "credentials saved");
        Ok(())
    }

    fn read(&self) -> Option<StoredCredentials> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read credentials");
                return None;
            }
        };
        match serde_json::from_str::<StoredCredentials>(&content) {
            Ok(creds) if creds.is_complete() => Some(creds),
            Ok(_) => {
                tracing::warn!(path = %self.path.display(), "ignoring partial credentials record");
                None
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring corrupt credentials file");
                None
            }
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "credentials removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(access: &str) -> StoredCredentials {
        StoredCredentials {
            access_token: access.to_string(),
            refresh_token: "refresh".to_string(),
            role: "USER".to_string(),
            username: "reader".to_string(),
        }
    }

    #[test]
    fn test_memory_store_basic_operations() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.read(), None);

        store.save(&creds("a1")).unwrap();
        assert_eq!(store.access_token().as_deref(), Some("a1"));
        assert_eq!(store.refresh_token().as_deref(), Some("refresh"));

        store.save(&creds("a2")).unwrap();
        assert_eq!(store.read(), Some(creds("a2")));

        store.clear().unwrap();
        assert_eq!(store.read(), None);
        store.clear().unwrap();
    }

    #[test]
    fn test_memory_store_rejects_partial_pair() {
        let store = MemoryCredentialStore::with_credentials(creds("a1"));
        let mut partial = creds("a2");
        partial.refresh_token.clear();

        assert!(matches!(store.save(&partial), Err(StoreError::IncompletePair)));
        assert_eq!(store.access_token().as_deref(), Some("a1"));
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::for_profile(dir.path(), "default");
        assert_eq!(store.read(), None);

        store.save(&creds("a1")).unwrap();
        assert!(store.path().ends_with("credentials.default.json"));

        // A second handle on the same file sees the record, as after a restart.
        let reopened = FileCredentialStore::for_profile(dir.path(), "default");
        assert_eq!(reopened.read(), Some(creds("a1")));

        reopened.clear().unwrap();
        assert_eq!(store.read(), None);
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_uses_fixed_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::for_profile(dir.path(), "work");
        store.save(&creds("a1")).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        let mut keys: Vec<&str> = raw.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort();
        assert_eq!(keys, vec!["accessToken", "refreshToken", "userRole", "username"]);
    }

    #[test]
    fn test_file_store_treats_corrupt_file_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::for_profile(dir.path(), "default");
        fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.read(), None);

        fs::write(store.path(), r#"{"accessToken": "a", "refreshToken": ""}"#).unwrap();
        assert_eq!(store.read(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::for_profile(dir.path(), "default");
        store.save(&creds("a1")).unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_store_failed_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::for_profile(dir.path(), "default");
        // A non-empty directory at the target path makes the final rename fail.
        fs::create_dir(store.path()).unwrap();
        fs::write(store.path().join("keep"), "x").unwrap();

        assert!(matches!(store.save(&creds("secret-access")), Err(StoreError::Io(_))));

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path != store.path())
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }
}
