use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;
use std::sync::Mutex;

use keyring::Entry;
use thiserror::Error;
use tracing::debug;

/// Service name used for OS keychain entries
const KEYRING_SERVICE: &str = "genchat";

/// Entry written and removed when opening the keychain
const KEYRING_CHECK_KEY: &str = "genchat-availability-check";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Keychain unavailable: {0}")]
    Unavailable(String),
}

/// Durable client-side key/value storage.
///
/// Every call takes effect immediately. Removing a key that is not present
/// is not an error.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-local storage. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// Stores each key as a file holding the raw value, under a root directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.root)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(self.path_for(key))?;
        file.write_all(value.as_bytes())?;
        debug!(key, root = ?self.root, "Wrote storage file");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Stores values in the OS keychain, one entry per key.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    /// Open the keychain under the default service name
    pub fn open() -> Result<Self, StoreError> {
        Self::open_service(KEYRING_SERVICE)
    }

    /// Open the keychain under `service`, refusing when nothing written to it
    /// can be read back (no native credential store available).
    pub fn open_service(service: impl Into<String>) -> Result<Self, StoreError> {
        let store = Self {
            service: service.into(),
        };
        store.check_persistence()?;
        Ok(store)
    }

    fn check_persistence(&self) -> Result<(), StoreError> {
        const CHECK_VALUE: &str = "ok";

        self.set(KEYRING_CHECK_KEY, CHECK_VALUE)?;
        let read_back = self.get(KEYRING_CHECK_KEY)?;
        self.remove(KEYRING_CHECK_KEY)?;

        if read_back.as_deref() == Some(CHECK_VALUE) {
            debug!(service = %self.service, "Keychain available");
            Ok(())
        } else {
            Err(StoreError::Unavailable(
                "no persistent OS keychain is available".to_string(),
            ))
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, StoreError> {
        Ok(Entry::new(&self.service, key)?)
    }
}

impl KeyValueStore for KeyringStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_memory_store_remove_missing_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove("missing").is_ok());
    }

    #[test]
    fn test_file_store_round_trip_raw_value() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("store");
        let store = FileStore::new(root.clone());

        assert_eq!(store.get("auth_token").unwrap(), None);

        store.set("auth_token", "abc").unwrap();
        // The file holds the raw value, nothing else
        let raw = std::fs::read_to_string(root.join("auth_token")).unwrap();
        assert_eq!(raw, "abc");
        assert_eq!(store.get("auth_token").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_file_store_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());

        store.set("auth_token", "abc").unwrap();
        store.remove("auth_token").unwrap();
        store.remove("auth_token").unwrap();
        assert_eq!(store.get("auth_token").unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        store.set("auth_token", "abc").unwrap();

        let mode = std::fs::metadata(dir.path().join("auth_token"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_store_overwrite_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        store.set("auth_token", "a-much-longer-token").unwrap();
        store.set("auth_token", "short").unwrap();
        assert_eq!(store.get("auth_token").unwrap().as_deref(), Some("short"));
    }

    #[test]
    fn test_keyring_store_round_trips_or_refuses() {
        // Whether a keychain exists depends on the machine; an opened store
        // must persist what it is given.
        match KeyringStore::open_service("genchat-test") {
            Ok(store) => {
                store.set("auth_token", "abc").unwrap();
                assert_eq!(store.get("auth_token").unwrap().as_deref(), Some("abc"));
                store.remove("auth_token").unwrap();
                assert_eq!(store.get("auth_token").unwrap(), None);
            }
            Err(e) => assert!(matches!(e, StoreError::Unavailable(_) | StoreError::Keyring(_))),
        }
    }

    #[test]
    fn test_file_store_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        FileStore::new(dir.path().to_path_buf())
            .set("auth_token", "persisted")
            .unwrap();

        let reopened = FileStore::new(dir.path().to_path_buf());
        assert_eq!(reopened.get("auth_token").unwrap().as_deref(), Some("persisted"));
    }
}
