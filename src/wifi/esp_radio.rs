//! ESP-IDF radio driver.
//!
//! Wraps the blocking ESP-IDF WiFi driver behind the [`Radio`] trait. Each
//! mode switch stops the driver, applies the new configuration and starts it
//! again.

use super::radio::{AccessPointSettings, AuthMode, Radio, RadioError, RadioMode};
use super::scan::AccessPointRecord;
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{
    AccessPointConfiguration, AuthMethod, BlockingWifi, ClientConfiguration, Configuration,
    EspWifi,
};
use log::info;

/// WiFi radio backed by ESP-IDF.
pub struct EspRadio<'a> {
    /// ESP-IDF WiFi driver.
    wifi: BlockingWifi<EspWifi<'a>>,
    mode: RadioMode,
}

impl<'a> EspRadio<'a> {
    /// Create the driver. The radio stays off until a mode is entered.
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
    ) -> Result<Self, RadioError> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), nvs)?;
        let wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;

        Ok(Self {
            wifi,
            mode: RadioMode::Off,
        })
    }

    fn reconfigure(&mut self, config: &Configuration) -> Result<(), RadioError> {
        if self.wifi.is_started()? {
            self.wifi.stop()?;
        }
        self.wifi.set_configuration(config)?;
        self.wifi.start()?;
        Ok(())
    }
}

fn auth_method(mode: AuthMode) -> AuthMethod {
    match mode {
        AuthMode::Open => AuthMethod::None,
        AuthMode::Wpa2Personal => AuthMethod::WPA2Personal,
        AuthMode::WpaWpa2Personal => AuthMethod::WPAWPA2Personal,
    }
}

impl<'a> Radio for EspRadio<'a> {
    fn enter_station_mode(&mut self) -> Result<(), RadioError> {
        info!("Radio: station mode");
        self.reconfigure(&Configuration::Client(ClientConfiguration::default()))?;
        self.mode = RadioMode::Station;
        Ok(())
    }

    fn enter_access_point_mode(
        &mut self,
        settings: &AccessPointSettings,
    ) -> Result<(), RadioError> {
        let auth_mode = settings.effective_auth_mode();
        info!(
            "Radio: access point {} ({:?}, max {} clients)",
            settings.ssid, auth_mode, settings.max_clients
        );

        let password = if auth_mode == AuthMode::Open {
            ""
        } else {
            settings.password.as_str()
        };

        let config = Configuration::AccessPoint(AccessPointConfiguration {
            ssid: settings
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| RadioError::InvalidSsid)?,
            password: password
                .try_into()
                .map_err(|_| RadioError::InvalidPassword)?,
            auth_method: auth_method(auth_mode),
            max_connections: settings.max_clients,
            channel: settings.channel,
            ssid_hidden: false,
            ..Default::default()
        });

        self.reconfigure(&config)?;
        self.mode = RadioMode::AccessPoint;
        Ok(())
    }

    fn scan(&mut self) -> Result<Vec<AccessPointRecord>, RadioError> {
        if self.mode != RadioMode::Station {
            return Err(RadioError::NotInStationMode);
        }

        let found = self.wifi.scan()?;
        Ok(found
            .iter()
            .map(|ap| AccessPointRecord::new(ap.ssid.as_str(), ap.signal_strength))
            .collect())
    }

    fn mode(&self) -> RadioMode {
        self.mode
    }
}
