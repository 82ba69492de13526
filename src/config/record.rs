//! The configuration record assembled by the portal.
//!
//! Every field is a bounded string. Submitted values longer than a field's
//! bound are truncated on a UTF-8 character boundary, never rejected. No
//! other validation takes place: an address that is not an address is stored
//! as-is.
//!
//! # Example
//!
//! ```
//! use wifi_portal_esp32::config::ConfigurationRecord;
//!
//! let mut record = ConfigurationRecord::default();
//! record.submit([("ssid", "MyNet"), ("pass", "secret")]);
//! record.submit([("ip", "10.0.0.5")]);
//!
//! assert_eq!(record.target_ssid(), "MyNet");
//! assert_eq!(record.target_password(), "secret");
//! assert_eq!(record.static_ip(), "10.0.0.5");
//! ```

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Maximum SSID length per IEEE 802.11 standard.
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA2 passphrase length.
pub const MAX_PASSWORD_LEN: usize = 64;

/// Maximum length of a dotted-quad IPv4 address.
pub const MAX_ADDR_LEN: usize = 15;

/// Maximum length of the portal username and password fields.
pub const MAX_PORTAL_CREDENTIAL_LEN: usize = 31;

/// Fields of the configuration record, keyed by their form names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    /// Target network SSID (`ssid`).
    TargetSsid,
    /// Target network password (`pass`).
    TargetPassword,
    /// Static IPv4 address (`ip`).
    StaticIp,
    /// Default gateway (`gateway`).
    Gateway,
    /// Subnet mask (`mask`).
    SubnetMask,
    /// DNS server (`dns`).
    DnsServer,
    /// Portal username (`user`).
    PortalUsername,
    /// Portal password (`userpass`).
    PortalPassword,
}

impl ConfigField {
    /// All fields in form order.
    pub const ALL: [ConfigField; 8] = [
        Self::TargetSsid,
        Self::TargetPassword,
        Self::StaticIp,
        Self::Gateway,
        Self::SubnetMask,
        Self::DnsServer,
        Self::PortalUsername,
        Self::PortalPassword,
    ];

    /// Form key carrying this field.
    pub fn key(self) -> &'static str {
        match self {
            Self::TargetSsid => "ssid",
            Self::TargetPassword => "pass",
            Self::StaticIp => "ip",
            Self::Gateway => "gateway",
            Self::SubnetMask => "mask",
            Self::DnsServer => "dns",
            Self::PortalUsername => "user",
            Self::PortalPassword => "userpass",
        }
    }

    /// Look up a field by form key. Unknown keys yield `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Maximum stored length in bytes.
    pub fn max_len(self) -> usize {
        match self {
            Self::TargetSsid => MAX_SSID_LEN,
            Self::TargetPassword => MAX_PASSWORD_LEN,
            Self::StaticIp | Self::Gateway | Self::SubnetMask | Self::DnsServer => MAX_ADDR_LEN,
            Self::PortalUsername | Self::PortalPassword => MAX_PORTAL_CREDENTIAL_LEN,
        }
    }

    fn is_secret(self) -> bool {
        matches!(self, Self::TargetPassword | Self::PortalPassword)
    }
}

/// Acknowledgment of a submit. Submits always succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    /// Number of recognized fields that were written.
    pub updated: usize,
}

/// Truncate `s` to at most `max` bytes without splitting a character.
pub fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Target-network and static-IP settings being assembled.
///
/// Password fields are zeroed when overwritten and on drop.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ConfigurationRecord {
    target_ssid: String,
    target_password: String,
    static_ip: String,
    gateway: String,
    subnet_mask: String,
    dns_server: String,
    portal_username: String,
    portal_password: String,
}

impl ConfigurationRecord {
    /// Apply submitted form fields.
    ///
    /// Recognized keys overwrite their field (truncated to the field bound),
    /// unknown keys are ignored and missing keys leave the field untouched.
    pub fn submit<'a, I>(&mut self, fields: I) -> Ack
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut updated = 0;
        for (key, value) in fields {
            match ConfigField::from_key(key) {
                Some(field) => {
                    self.set(field, value);
                    updated += 1;
                }
                None => log::debug!("Ignoring unknown form field {:?}", key),
            }
        }
        Ack { updated }
    }

    /// Overwrite one field, truncating to its bound.
    pub fn set(&mut self, field: ConfigField, value: &str) {
        let bounded = truncate_utf8(value, field.max_len());
        if bounded.len() < value.len() {
            log::warn!(
                "Truncated {} from {} to {} bytes",
                field.key(),
                value.len(),
                bounded.len()
            );
        }

        let slot = self.slot_mut(field);
        slot.zeroize();
        slot.push_str(bounded);
    }

    /// Current value of one field.
    pub fn get(&self, field: ConfigField) -> &str {
        match field {
            ConfigField::TargetSsid => &self.target_ssid,
            ConfigField::TargetPassword => &self.target_password,
            ConfigField::StaticIp => &self.static_ip,
            ConfigField::Gateway => &self.gateway,
            ConfigField::SubnetMask => &self.subnet_mask,
            ConfigField::DnsServer => &self.dns_server,
            ConfigField::PortalUsername => &self.portal_username,
            ConfigField::PortalPassword => &self.portal_password,
        }
    }

    fn slot_mut(&mut self, field: ConfigField) -> &mut String {
        match field {
            ConfigField::TargetSsid => &mut self.target_ssid,
            ConfigField::TargetPassword => &mut self.target_password,
            ConfigField::StaticIp => &mut self.static_ip,
            ConfigField::Gateway => &mut self.gateway,
            ConfigField::SubnetMask => &mut self.subnet_mask,
            ConfigField::DnsServer => &mut self.dns_server,
            ConfigField::PortalUsername => &mut self.portal_username,
            ConfigField::PortalPassword => &mut self.portal_password,
        }
    }

    pub fn target_ssid(&self) -> &str {
        &self.target_ssid
    }

    pub fn target_password(&self) -> &str {
        &self.target_password
    }

    pub fn static_ip(&self) -> &str {
        &self.static_ip
    }

    pub fn gateway(&self) -> &str {
        &self.gateway
    }

    pub fn subnet_mask(&self) -> &str {
        &self.subnet_mask
    }

    pub fn dns_server(&self) -> &str {
        &self.dns_server
    }

    pub fn portal_username(&self) -> &str {
        &self.portal_username
    }

    pub fn portal_password(&self) -> &str {
        &self.portal_password
    }

    /// True if no field has been set.
    pub fn is_empty(&self) -> bool {
        ConfigField::ALL.iter().all(|f| self.get(*f).is_empty())
    }
}

impl fmt::Debug for ConfigurationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ConfigurationRecord");
        for field in ConfigField::ALL {
            let value = self.get(field);
            if field.is_secret() && !value.is_empty() {
                s.field(field.key(), &"<redacted>");
            } else {
                s.field(field.key(), &value);
            }
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Submit Tests ====================

    #[test]
    fn test_default_record_is_empty() {
        let record = ConfigurationRecord::default();
        assert!(record.is_empty());
        assert_eq!(record.target_ssid(), "");
    }

    #[test]
    fn test_independent_field_updates() {
        let mut record = ConfigurationRecord::default();
        record.submit([("ssid", "MyNet"), ("pass", "secret")]);
        record.submit([("ip", "10.0.0.5")]);

        assert_eq!(record.target_ssid(), "MyNet");
        assert_eq!(record.target_password(), "secret");
        assert_eq!(record.static_ip(), "10.0.0.5");
        assert_eq!(record.gateway(), "");
    }

    #[test]
    fn test_all_keys_recognized() {
        let mut record = ConfigurationRecord::default();
        let ack = record.submit([
            ("ssid", "Home"),
            ("pass", "pw"),
            ("ip", "192.168.1.50"),
            ("gateway", "192.168.1.1"),
            ("mask", "255.255.255.0"),
            ("dns", "8.8.8.8"),
            ("user", "operator"),
            ("userpass", "hunter2"),
        ]);

        assert_eq!(ack.updated, 8);
        assert_eq!(record.subnet_mask(), "255.255.255.0");
        assert_eq!(record.dns_server(), "8.8.8.8");
        assert_eq!(record.portal_username(), "operator");
        assert_eq!(record.portal_password(), "hunter2");
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let mut record = ConfigurationRecord::default();
        let ack = record.submit([("ssid_select", "x"), ("color", "blue")]);
        assert_eq!(ack.updated, 0);
        assert!(record.is_empty());
    }

    #[test]
    fn test_empty_value_overwrites() {
        let mut record = ConfigurationRecord::default();
        record.submit([("ssid", "MyNet")]);
        record.submit([("ssid", "")]);
        assert_eq!(record.target_ssid(), "");
    }

    // ==================== Bounds Tests ====================

    #[test]
    fn test_long_ssid_truncated() {
        let mut record = ConfigurationRecord::default();
        let long = "s".repeat(100);
        record.submit([("ssid", long.as_str())]);
        assert_eq!(record.target_ssid().len(), MAX_SSID_LEN);
    }

    #[test]
    fn test_every_field_bounded() {
        let mut record = ConfigurationRecord::default();
        let long = "9".repeat(200);
        for field in ConfigField::ALL {
            record.set(field, &long);
            assert_eq!(record.get(field).len(), field.max_len(), "{:?}", field);
        }
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        // 'é' is two bytes; 31 ASCII + 'é' would be 33 bytes.
        let s = format!("{}é", "a".repeat(31));
        assert_eq!(truncate_utf8(&s, 32), "a".repeat(31));
        assert_eq!(truncate_utf8("short", 32), "short");
    }

    #[test]
    fn test_field_key_lookup() {
        for field in ConfigField::ALL {
            assert_eq!(ConfigField::from_key(field.key()), Some(field));
        }
        assert_eq!(ConfigField::from_key("SSID"), None);
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let mut record = ConfigurationRecord::default();
        record.submit([("ssid", "Visible"), ("pass", "topsecret")]);
        let debug = format!("{:?}", record);
        assert!(debug.contains("Visible"));
        assert!(!debug.contains("topsecret"));
    }
}
