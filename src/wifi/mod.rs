//! WiFi radio control and network scanning.
//!
//! # Components
//!
//! - [`radio`] - the [`Radio`] mode-switch contract and soft-AP settings
//! - [`scan`] - bounded scan snapshots and the station/AP scan cycle
//! - [`simulated`] - a hardware-free radio for the host (host-testable)
//! - `esp_radio` - ESP-IDF WiFi driver wrapper (ESP32 only)

#[cfg(feature = "esp32")]
mod esp_radio;
pub mod radio;
pub mod scan;
pub mod simulated;

#[cfg(feature = "esp32")]
pub use esp_radio::EspRadio;
pub use radio::{
    AccessPointSettings, AuthMode, Radio, RadioError, RadioMode, MIN_AP_PASSWORD_LEN,
};
pub use scan::{AccessPointRecord, NetworkScanner, ScanSnapshot, MAX_SCAN_RESULTS};
pub use simulated::SimulatedRadio;
