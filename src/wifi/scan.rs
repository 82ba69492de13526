//! Network scanning.
//!
//! A scan takes the radio out of access-point mode: the portal is down for
//! the duration. [`NetworkScanner::scan`] switches to station mode, runs one
//! blocking scan, keeps the first `max_results` networks in the order the
//! driver reported them, and brings the soft-AP back up.
//!
//! # Example
//!
//! ```
//! use wifi_portal_esp32::config::PortalSettings;
//! use wifi_portal_esp32::wifi::{NetworkScanner, SimulatedRadio};
//!
//! let settings = PortalSettings::default();
//! let mut radio = SimulatedRadio::with_networks([("HomeNet", -42), ("Cafe", -71)]);
//! let mut scanner = NetworkScanner::new(&mut radio, &settings.access_point);
//!
//! let snapshot = scanner.scan(20).unwrap();
//! assert_eq!(snapshot.len(), 2);
//! assert_eq!(snapshot.records()[0].ssid(), "HomeNet");
//! ```

use super::radio::{AccessPointSettings, Radio, RadioError};
use crate::config::{truncate_utf8, MAX_SSID_LEN};
use log::info;

/// Most networks a snapshot can hold.
pub const MAX_SCAN_RESULTS: usize = 20;

/// One visible access point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPointRecord {
    ssid: String,
    signal_strength: i8,
}

impl AccessPointRecord {
    /// Capture a scan result. SSIDs over 32 bytes are truncated.
    pub fn new(ssid: &str, signal_strength: i8) -> Self {
        Self {
            ssid: truncate_utf8(ssid, MAX_SSID_LEN).to_string(),
            signal_strength,
        }
    }

    /// Network name.
    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Signal strength in dBm.
    pub fn signal_strength(&self) -> i8 {
        self.signal_strength
    }
}

/// Bounded, ordered list of access points from one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSnapshot {
    records: Vec<AccessPointRecord>,
}

impl ScanSnapshot {
    /// Keep at most `max_results` (capped at [`MAX_SCAN_RESULTS`]) records in
    /// their given order; the rest are dropped.
    pub fn from_records<I>(records: I, max_results: usize) -> Self
    where
        I: IntoIterator<Item = AccessPointRecord>,
    {
        let limit = max_results.min(MAX_SCAN_RESULTS);
        let mut kept = Vec::with_capacity(limit);
        kept.extend(records.into_iter().take(limit));
        Self { records: kept }
    }

    pub fn records(&self) -> &[AccessPointRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AccessPointRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a ScanSnapshot {
    type Item = &'a AccessPointRecord;
    type IntoIter = std::slice::Iter<'a, AccessPointRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Runs a scan cycle on a radio.
pub struct NetworkScanner<'r, R: Radio> {
    radio: &'r mut R,
    access_point: &'r AccessPointSettings,
}

impl<'r, R: Radio> NetworkScanner<'r, R> {
    /// Create a scanner that restores `access_point` after scanning.
    pub fn new(radio: &'r mut R, access_point: &'r AccessPointSettings) -> Self {
        Self {
            radio,
            access_point,
        }
    }

    /// Scan for networks, keeping the first `max_results`.
    ///
    /// Finding nothing is not an error. Any radio failure is returned
    /// immediately without attempting to restore access-point mode.
    pub fn scan(&mut self, max_results: usize) -> Result<ScanSnapshot, RadioError> {
        info!("Switching to station mode for scan");
        self.radio.enter_station_mode()?;

        let found = self.radio.scan()?;
        let seen = found.len();
        let snapshot = ScanSnapshot::from_records(found, max_results);
        info!("Scan found {} networks, keeping {}", seen, snapshot.len());

        info!("Restoring access point {}", self.access_point.ssid);
        self.radio.enter_access_point_mode(self.access_point)?;

        Ok(snapshot)
    }
}
