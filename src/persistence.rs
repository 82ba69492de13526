//! NVS-backed key-value store for ESP32.
//!
//! Portal state lives in the `storage` namespace of the default NVS
//! partition. Single-byte values are written as NVS `u8` entries so the
//! login flag stays readable by firmware that uses `nvs_get_u8`; longer
//! values are stored as blobs.
//!
//! # Usage
//!
//! ```ignore
//! use esp_idf_svc::nvs::EspDefaultNvsPartition;
//! use wifi_portal_esp32::persistence::NvsStore;
//!
//! let partition = EspDefaultNvsPartition::take()?;
//! let store = NvsStore::new(partition.clone())?;
//! ```

use crate::session::{KeyValueStore, StoreError};
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};

/// NVS namespace for portal state.
const NVS_NAMESPACE: &str = "storage";

/// Largest blob read back from NVS.
const MAX_VALUE_LEN: usize = 256;

/// [`KeyValueStore`] over an ESP-IDF NVS namespace.
pub struct NvsStore {
    nvs: EspNvs<NvsDefault>,
}

impl NvsStore {
    /// Open the portal namespace read-write on the given partition.
    ///
    /// The partition handle is shared with the WiFi driver, so callers take
    /// it once and clone it.
    pub fn new(partition: EspDefaultNvsPartition) -> Result<Self, StoreError> {
        let nvs = EspNvs::new(partition, NVS_NAMESPACE, true)?;
        Ok(Self { nvs })
    }
}

impl KeyValueStore for NvsStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if let Ok(Some(value)) = self.nvs.get_u8(key) {
            return Ok(Some(vec![value]));
        }

        let mut buf = [0u8; MAX_VALUE_LEN];
        let bytes = self.nvs.get_raw(key, &mut buf)?;
        Ok(bytes.map(|b| b.to_vec()))
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        match value {
            [byte] => self.nvs.set_u8(key, *byte)?,
            _ => {
                self.nvs.set_raw(key, value)?;
            }
        }
        log::debug!("Stored {} byte(s) under NVS key {}", value.len(), key);
        Ok(())
    }
}
