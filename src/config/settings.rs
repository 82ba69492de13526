//! Portal settings.
//!
//! Defaults are compiled in. The soft-AP name and password and the admin
//! credential pair can be overridden at build time through environment
//! variables read with `option_env!`:
//!
//! - `PORTAL_AP_SSID` (default `ESP32Config`)
//! - `PORTAL_AP_PASSWORD` (default `12345678`)
//! - `PORTAL_ADMIN_USER` (default `admin`)
//! - `PORTAL_ADMIN_PASSWORD` (default `admin123`)
//!
//! Host builds additionally read `PORTAL_HTTP_ADDR` and
//! `PORTAL_ACCESS_POLICY` at runtime, see [`PortalSettings::from_env`].

use crate::wifi::{AccessPointSettings, AuthMode, MAX_SCAN_RESULTS};
use std::fmt;
use std::str::FromStr;

/// Default soft-AP channel.
pub const DEFAULT_AP_CHANNEL: u8 = 1;

/// Default number of stations allowed on the soft-AP.
pub const DEFAULT_MAX_CLIENTS: u16 = 4;

/// Address the portal listens on by default.
#[cfg(feature = "esp32")]
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:80";

/// Address the portal listens on by default.
#[cfg(not(feature = "esp32"))]
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8080";

fn ap_ssid() -> &'static str {
    option_env!("PORTAL_AP_SSID").unwrap_or("ESP32Config")
}

fn ap_password() -> &'static str {
    option_env!("PORTAL_AP_PASSWORD").unwrap_or("12345678")
}

fn admin_user() -> &'static str {
    option_env!("PORTAL_ADMIN_USER").unwrap_or("admin")
}

fn admin_password() -> &'static str {
    option_env!("PORTAL_ADMIN_PASSWORD").unwrap_or("admin123")
}

/// Which routes require a logged-in operator, and how denial is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessPolicy {
    /// Configuration form and submit are both gated; denial is `403`.
    #[default]
    Strict,
    /// Only the configuration form is gated; denial is `200` and submit is
    /// open. Matches the behavior of earlier firmware.
    Compatible,
}

impl AccessPolicy {
    /// Whether the submit endpoint requires a login.
    pub fn gates_submit(self) -> bool {
        matches!(self, Self::Strict)
    }

    /// HTTP status used for the "access denied" page.
    pub fn denial_status(self) -> u16 {
        match self {
            Self::Strict => 403,
            Self::Compatible => 200,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Compatible => "compatible",
        }
    }
}

impl FromStr for AccessPolicy {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "compatible" | "legacy" => Ok(Self::Compatible),
            _ => Err(SettingsError::UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors parsing settings overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// Unrecognized access policy name.
    UnknownPolicy(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPolicy(name) => write!(f, "unknown access policy: {}", name),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Everything the boot sequence and controller need to know.
#[derive(Debug, Clone)]
pub struct PortalSettings {
    /// Soft-AP parameters used when serving.
    pub access_point: AccessPointSettings,
    /// Admin username accepted by the login form.
    pub admin_user: String,
    /// Admin password accepted by the login form.
    pub admin_password: String,
    /// Socket address for the HTTP server.
    pub http_addr: String,
    /// Maximum networks kept from a scan.
    pub max_scan_results: usize,
    /// Route gating policy.
    pub access_policy: AccessPolicy,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            access_point: AccessPointSettings {
                ssid: ap_ssid().to_string(),
                password: ap_password().to_string(),
                max_clients: DEFAULT_MAX_CLIENTS,
                auth_mode: AuthMode::WpaWpa2Personal,
                channel: DEFAULT_AP_CHANNEL,
            },
            admin_user: admin_user().to_string(),
            admin_password: admin_password().to_string(),
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            max_scan_results: MAX_SCAN_RESULTS,
            access_policy: AccessPolicy::default(),
        }
    }
}

impl PortalSettings {
    /// Defaults with runtime overrides from the process environment.
    ///
    /// An unparsable `PORTAL_ACCESS_POLICY` is logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(addr) = lookup("PORTAL_HTTP_ADDR") {
            settings.http_addr = addr;
        }

        if let Some(policy) = lookup("PORTAL_ACCESS_POLICY") {
            match policy.parse::<AccessPolicy>() {
                Ok(policy) => settings.access_policy = policy,
                Err(e) => log::warn!("Ignoring PORTAL_ACCESS_POLICY: {}", e),
            }
        }

        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = PortalSettings::default();
        assert_eq!(settings.max_scan_results, 20);
        assert_eq!(settings.access_policy, AccessPolicy::Strict);
        assert_eq!(settings.access_point.max_clients, 4);
        assert_eq!(settings.access_point.auth_mode, AuthMode::WpaWpa2Personal);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("strict".parse::<AccessPolicy>(), Ok(AccessPolicy::Strict));
        assert_eq!(" Compatible ".parse::<AccessPolicy>(), Ok(AccessPolicy::Compatible));
        assert_eq!("legacy".parse::<AccessPolicy>(), Ok(AccessPolicy::Compatible));
        assert!(matches!(
            "open".parse::<AccessPolicy>(),
            Err(SettingsError::UnknownPolicy(_))
        ));
    }

    #[test]
    fn test_policy_behaviour() {
        assert!(AccessPolicy::Strict.gates_submit());
        assert_eq!(AccessPolicy::Strict.denial_status(), 403);
        assert!(!AccessPolicy::Compatible.gates_submit());
        assert_eq!(AccessPolicy::Compatible.denial_status(), 200);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("PORTAL_HTTP_ADDR", "0.0.0.0:9000"),
            ("PORTAL_ACCESS_POLICY", "compatible"),
        ]
        .into_iter()
        .collect();

        let settings = PortalSettings::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(settings.http_addr, "0.0.0.0:9000");
        assert_eq!(settings.access_policy, AccessPolicy::Compatible);
    }

    #[test]
    fn test_bad_policy_keeps_default() {
        let settings = PortalSettings::from_lookup(|k| {
            (k == "PORTAL_ACCESS_POLICY").then(|| "bogus".to_string())
        });
        assert_eq!(settings.access_policy, AccessPolicy::Strict);
    }
}
