//! Radio mode switching.
//!
//! The [`Radio`] trait is the narrow contract the portal needs from a WiFi
//! driver: flip between station mode (for scanning) and access-point mode
//! (for serving), and run one blocking scan. Every call blocks until the
//! driver is done; none are retried.

use super::scan::AccessPointRecord;
use std::fmt;

/// WPA2 requires at least this many passphrase bytes.
pub const MIN_AP_PASSWORD_LEN: usize = 8;

/// Soft-AP authentication mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// No password.
    Open,
    /// WPA2-PSK.
    Wpa2Personal,
    /// Mixed WPA/WPA2-PSK.
    WpaWpa2Personal,
}

/// Parameters for bringing up the soft-AP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPointSettings {
    /// Advertised network name.
    pub ssid: String,
    /// WPA passphrase, ignored for [`AuthMode::Open`].
    pub password: String,
    /// Maximum associated stations.
    pub max_clients: u16,
    /// Requested authentication mode.
    pub auth_mode: AuthMode,
    /// WiFi channel.
    pub channel: u8,
}

impl AccessPointSettings {
    /// Authentication mode the driver should actually use.
    ///
    /// A password too short for WPA leaves the AP open, which is what the
    /// ESP-IDF driver would otherwise refuse to start with.
    pub fn effective_auth_mode(&self) -> AuthMode {
        if self.password.len() < MIN_AP_PASSWORD_LEN {
            AuthMode::Open
        } else {
            self.auth_mode
        }
    }
}

/// Current radio mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioMode {
    /// Radio not started.
    Off,
    /// Client mode, able to scan.
    Station,
    /// Hosting the soft-AP.
    AccessPoint,
}

/// Blocking WiFi radio primitives.
pub trait Radio {
    /// Switch to station mode and start the radio.
    fn enter_station_mode(&mut self) -> Result<(), RadioError>;

    /// Switch to access-point mode with the given settings and start it.
    fn enter_access_point_mode(&mut self, settings: &AccessPointSettings)
        -> Result<(), RadioError>;

    /// Run one blocking scan. Results are in driver order.
    ///
    /// Only valid in station mode.
    fn scan(&mut self) -> Result<Vec<AccessPointRecord>, RadioError>;

    /// Mode the radio was last put in.
    fn mode(&self) -> RadioMode;
}

/// Errors from the radio subsystem. All of them are fatal at boot.
#[derive(Debug)]
pub enum RadioError {
    /// SSID rejected by the driver (too long or not representable).
    InvalidSsid,
    /// Password rejected by the driver.
    InvalidPassword,
    /// Scan requested while not in station mode.
    NotInStationMode,
    /// Driver error.
    Driver(String),
    /// ESP-IDF error.
    #[cfg(feature = "esp32")]
    Esp(esp_idf_sys::EspError),
}

#[cfg(feature = "esp32")]
impl From<esp_idf_sys::EspError> for RadioError {
    fn from(e: esp_idf_sys::EspError) -> Self {
        Self::Esp(e)
    }
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "invalid SSID"),
            Self::InvalidPassword => write!(f, "invalid password"),
            Self::NotInStationMode => write!(f, "scan requires station mode"),
            Self::Driver(msg) => write!(f, "driver error: {}", msg),
            #[cfg(feature = "esp32")]
            Self::Esp(e) => write!(f, "ESP error: {:?}", e),
        }
    }
}

impl std::error::Error for RadioError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(password: &str) -> AccessPointSettings {
        AccessPointSettings {
            ssid: "ESP32Config".into(),
            password: password.into(),
            max_clients: 4,
            auth_mode: AuthMode::WpaWpa2Personal,
            channel: 1,
        }
    }

    #[test]
    fn test_effective_auth_mode_keeps_wpa() {
        assert_eq!(
            settings("12345678").effective_auth_mode(),
            AuthMode::WpaWpa2Personal
        );
    }

    #[test]
    fn test_short_password_forces_open() {
        assert_eq!(settings("1234567").effective_auth_mode(), AuthMode::Open);
        assert_eq!(settings("").effective_auth_mode(), AuthMode::Open);
    }
}
