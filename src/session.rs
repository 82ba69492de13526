//! Session persistence for the portal login flag.
//!
//! The portal remembers whether an operator is logged in across reboots by
//! storing a single byte under [`LOGIN_STATE_KEY`] in a durable key-value
//! store. The in-memory flag held by [`crate::auth::AuthGate`] is always the
//! truth during a run; the stored byte is a best-effort mirror.
//!
//! # Example
//!
//! ```
//! use wifi_portal_esp32::session::{MemoryStore, SessionStore};
//!
//! let store = MemoryStore::new();
//! let mut session = SessionStore::new(Box::new(store.clone()));
//! assert!(!session.restore());
//!
//! session.persist(true).unwrap();
//!
//! // A new session over the same backing store sees the flag.
//! let session = SessionStore::new(Box::new(store));
//! assert!(session.restore());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Key of the persisted login flag.
pub const LOGIN_STATE_KEY: &str = "login_state";

/// Durable key-value storage used for small records.
///
/// Implemented by NVS on ESP32 and by a JSON file on the host.
pub trait KeyValueStore: Send {
    /// Read the value stored under `key`, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;
}

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug)]
pub enum StoreError {
    /// Filesystem I/O failed.
    Io(std::io::Error),
    /// Stored data could not be encoded or decoded.
    Format(String),
    /// The backing store refused the operation.
    Unavailable(String),
    /// ESP-IDF NVS error.
    #[cfg(feature = "esp32")]
    Esp(esp_idf_sys::EspError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Format(msg) => write!(f, "invalid stored data: {}", msg),
            Self::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
            #[cfg(feature = "esp32")]
            Self::Esp(e) => write!(f, "NVS error: {:?}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(feature = "esp32")]
impl From<esp_idf_sys::EspError> for StoreError {
    fn from(e: esp_idf_sys::EspError) -> Self {
        Self::Esp(e)
    }
}

/// Persists and restores the "authenticated" flag.
pub struct SessionStore {
    store: Box<dyn KeyValueStore>,
}

impl SessionStore {
    /// Wrap a durable store.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Write the login flag as one byte (`1` or `0`).
    pub fn persist(&mut self, authenticated: bool) -> Result<(), StoreError> {
        self.store.set(LOGIN_STATE_KEY, &[u8::from(authenticated)])
    }

    /// Read the login flag.
    ///
    /// Anything other than a stored single `1` byte, including read errors,
    /// yields `false`.
    pub fn restore(&self) -> bool {
        match self.store.get(LOGIN_STATE_KEY) {
            Ok(Some(bytes)) => bytes.as_slice() == [1],
            Ok(None) => {
                log::debug!("No login state stored");
                false
            }
            Err(e) => {
                log::warn!("Failed to read login state: {}", e);
                false
            }
        }
    }
}

/// In-memory [`KeyValueStore`].
///
/// Clones share the same map, so a test can keep a handle after boxing one
/// into a [`SessionStore`]. Reads and writes can be made to fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    values: Mutex<HashMap<String, Vec<u8>>>,
    writes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose reads and writes always fail.
    ///
    /// Stands in when the durable store cannot be opened: the session then
    /// restores as logged out and login state lives only in memory.
    pub fn unavailable() -> Self {
        let store = Self::new();
        store.set_fail_reads(true);
        store.set_fail_writes(true);
        store
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Raw value stored under `key`.
    pub fn value(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().get(key).cloned()
    }

    /// Make subsequent reads fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.inner
            .values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("read failure injected".into()));
        }
        Ok(self.lock().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write failure injected".into()));
        }
        self.lock().insert(key.to_string(), value.to_vec());
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
