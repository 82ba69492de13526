//! Key-value persistence for host (development) builds.
//!
//! Stands in for NVS by keeping all records in one JSON file, by default
//! `~/.wifi-portal/store.json`. Values are stored as byte arrays.
//!
//! # Usage
//!
//! ```ignore
//! use wifi_portal_esp32::persistence_host::FileStore;
//! use wifi_portal_esp32::session::SessionStore;
//!
//! let store = FileStore::open_default()?;
//! let session = SessionStore::new(Box::new(store));
//! log::info!("Logged in: {}", session.restore());
//! ```

use crate::session::{KeyValueStore, StoreError};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory under `$HOME` holding portal state.
const DATA_DIR: &str = ".wifi-portal";

/// File name of the key-value store.
const STORE_FILE: &str = "store.json";

/// Get the default data directory.
///
/// Returns `~/.wifi-portal`
pub fn default_data_dir() -> io::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| io::Error::new(io::ErrorKind::NotFound, "HOME not set"))?;
    Ok(PathBuf::from(home).join(DATA_DIR))
}

/// Get the default store file path.
///
/// Honors `PORTAL_STORE_PATH`, falling back to `~/.wifi-portal/store.json`.
pub fn default_store_path() -> io::Result<PathBuf> {
    if let Ok(path) = std::env::var("PORTAL_STORE_PATH") {
        return Ok(PathBuf::from(path));
    }
    Ok(default_data_dir()?.join(STORE_FILE))
}

/// On-disk layout of the store file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    records: BTreeMap<String, Vec<u8>>,
}

/// File-backed [`KeyValueStore`].
///
/// Every write rewrites the whole file; the store only ever holds a handful
/// of tiny records.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Use the store file at `path`. The file is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use the store file at [`default_store_path`].
    pub fn open_default() -> io::Result<Self> {
        Ok(Self::open(default_store_path()?))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoreFile, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No store file at {:?}", self.path);
                return Ok(StoreFile::default());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&text).map_err(|e| StoreError::Format(e.to_string()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.load()?.records.remove(key))
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        // A corrupt file is replaced rather than blocking every future write.
        let mut file = self.load().unwrap_or_else(|e| {
            log::warn!("Discarding unreadable store {:?}: {}", self.path, e);
            StoreFile::default()
        });
        file.records.insert(key.to_string(), value.to_vec());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json =
            serde_json::to_string(&file).map_err(|e| StoreError::Format(e.to_string()))?;
        fs::write(&self.path, json)?;

        debug!("Stored {:?} in {:?}", key, self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionStore, LOGIN_STATE_KEY};
    use std::env;
    use std::sync::atomic::{AtomicU32, Ordering};

    // Counter to ensure unique test files even in parallel execution
    static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn unique_store_path() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let pid = std::process::id();
        env::temp_dir()
            .join(format!("wifi-portal-test-{}-{}", pid, id))
            .join(STORE_FILE)
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let store = FileStore::open(unique_store_path());
        assert_eq!(store.get(LOGIN_STATE_KEY).unwrap(), None);
    }

    #[test]
    fn test_set_get_roundtrip() {
        let path = unique_store_path();
        let mut store = FileStore::open(&path);
        store.set("a", &[1, 2, 3]).unwrap();
        store.set("b", &[]).unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("a").unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(reopened.get("b").unwrap(), Some(vec![]));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_session_survives_reopen() {
        let path = unique_store_path();
        SessionStore::new(Box::new(FileStore::open(&path)))
            .persist(true)
            .unwrap();

        let session = SessionStore::new(Box::new(FileStore::open(&path)));
        assert!(session.restore());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_logout_after_login_overwrites_flag() {
        let path = unique_store_path();
        let mut session = SessionStore::new(Box::new(FileStore::open(&path)));
        session.persist(true).unwrap();
        session.persist(false).unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get(LOGIN_STATE_KEY).unwrap(), Some(vec![0]));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_without_records_reads_empty() {
        let path = unique_store_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{}").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get(LOGIN_STATE_KEY).unwrap(), None);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file_fails_read_but_not_write() {
        let path = unique_store_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        let mut store = FileStore::open(&path);
        assert!(matches!(store.get("x"), Err(StoreError::Format(_))));
        assert!(!SessionStore::new(Box::new(store.clone())).restore());

        store.set(LOGIN_STATE_KEY, &[1]).unwrap();
        assert_eq!(store.get(LOGIN_STATE_KEY).unwrap(), Some(vec![1]));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
