//! Simulated radio for host builds and tests.
//!
//! Reports a fixed list of networks and records every mode transition so
//! tests can assert on the station → access-point sequence.

use super::radio::{AccessPointSettings, Radio, RadioError, RadioMode};
use super::scan::AccessPointRecord;
use log::debug;

/// A [`Radio`] with no hardware behind it.
#[derive(Debug, Clone)]
pub struct SimulatedRadio {
    networks: Vec<AccessPointRecord>,
    mode: RadioMode,
    transitions: Vec<RadioMode>,
    access_point: Option<AccessPointSettings>,
    fail_station_switch: bool,
}

impl SimulatedRadio {
    /// A radio that sees no networks.
    pub fn new() -> Self {
        Self {
            networks: Vec::new(),
            mode: RadioMode::Off,
            transitions: Vec::new(),
            access_point: None,
            fail_station_switch: false,
        }
    }

    /// A radio that reports `networks` in the given order.
    pub fn with_networks<I, S>(networks: I) -> Self
    where
        I: IntoIterator<Item = (S, i8)>,
        S: AsRef<str>,
    {
        Self {
            networks: networks
                .into_iter()
                .map(|(ssid, rssi)| AccessPointRecord::new(ssid.as_ref(), rssi))
                .collect(),
            ..Self::new()
        }
    }

    /// A handful of plausible neighbours, for running the portal on a laptop.
    pub fn demo() -> Self {
        Self::with_networks([
            ("HomeNetwork", -41),
            ("CafeGuest", -63),
            ("Neighbor's 2.4G", -72),
            ("IoT-Lab", -80),
            ("xfinitywifi", -86),
        ])
    }

    /// Make the next `enter_station_mode` call fail.
    pub fn fail_next_station_switch(&mut self) {
        self.fail_station_switch = true;
    }

    /// Every mode entered so far, oldest first.
    pub fn transitions(&self) -> &[RadioMode] {
        &self.transitions
    }

    /// Settings of the last soft-AP brought up.
    pub fn access_point(&self) -> Option<&AccessPointSettings> {
        self.access_point.as_ref()
    }
}

impl Default for SimulatedRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl Radio for SimulatedRadio {
    fn enter_station_mode(&mut self) -> Result<(), RadioError> {
        if std::mem::take(&mut self.fail_station_switch) {
            return Err(RadioError::Driver("station mode unavailable".into()));
        }
        debug!("Simulated radio: station mode");
        self.mode = RadioMode::Station;
        self.transitions.push(RadioMode::Station);
        Ok(())
    }

    fn enter_access_point_mode(
        &mut self,
        settings: &AccessPointSettings,
    ) -> Result<(), RadioError> {
        debug!(
            "Simulated radio: access point {} ({:?}, {} clients)",
            settings.ssid,
            settings.effective_auth_mode(),
            settings.max_clients
        );
        self.mode = RadioMode::AccessPoint;
        self.transitions.push(RadioMode::AccessPoint);
        self.access_point = Some(settings.clone());
        Ok(())
    }

    fn scan(&mut self) -> Result<Vec<AccessPointRecord>, RadioError> {
        if self.mode != RadioMode::Station {
            return Err(RadioError::NotInStationMode);
        }
        Ok(self.networks.clone())
    }

    fn mode(&self) -> RadioMode {
        self.mode
    }
}
