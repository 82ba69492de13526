//! WiFi provisioning portal for ESP32.
//!
//! On boot the device scans for nearby networks, brings up its own access
//! point and serves a small password-protected web form where an operator
//! enters network and addressing settings.
//!
//! Everything except the ESP-IDF drivers (`esp32` feature) is
//! platform-independent and tested on the host machine.

pub mod auth;
pub mod boot;
pub mod config;
pub mod mount;
#[cfg(feature = "esp32")]
pub mod persistence;
#[cfg(not(target_os = "espidf"))]
pub mod persistence_host;
pub mod portal;
pub mod session;
pub mod wifi;

// Re-export commonly used items
pub use auth::{AuthGate, AuthState, CredentialCheck, LoginOutcome, StaticCredentials};
pub use boot::{BootError, BootParts};
pub use config::{AccessPolicy, ConfigField, ConfigurationRecord, PortalSettings};
pub use mount::{DirectoryMount, FilesystemMount, MountError};
pub use portal::{Portal, PortalServer, Request, Response, Route};
pub use session::{KeyValueStore, MemoryStore, SessionStore, StoreError};
pub use wifi::{AccessPointRecord, NetworkScanner, Radio, RadioError, ScanSnapshot, SimulatedRadio};

#[cfg(feature = "esp32")]
pub use mount::SpiffsMount;
#[cfg(feature = "esp32")]
pub use persistence::NvsStore;
#[cfg(feature = "esp32")]
pub use wifi::EspRadio;

#[cfg(not(target_os = "espidf"))]
pub use persistence_host::FileStore;
