//! Portal configuration.
//!
//! # Components
//!
//! - [`record`] - the target-network and static-IP record filled in by the
//!   operator (host-testable)
//! - [`settings`] - compiled-in portal defaults and their overrides

pub mod record;
pub mod settings;

pub use record::{
    truncate_utf8, Ack, ConfigField, ConfigurationRecord, MAX_ADDR_LEN, MAX_PASSWORD_LEN,
    MAX_PORTAL_CREDENTIAL_LEN, MAX_SSID_LEN,
};
pub use settings::{AccessPolicy, PortalSettings, SettingsError, DEFAULT_HTTP_ADDR};
