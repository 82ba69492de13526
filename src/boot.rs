//! Two-phase boot.
//!
//! 1. Restore the login flag from the durable store.
//! 2. Mount the local filesystem (failure is logged, not fatal).
//! 3. Scan phase: station mode, one blocking scan, back to access-point mode.
//! 4. Build the [`Portal`] around the session, settings and snapshot.
//!
//! Serving starts only after this returns; a radio failure aborts boot.
//!
//! # Example
//!
//! ```
//! use wifi_portal_esp32::boot::{self, BootParts};
//! use wifi_portal_esp32::config::PortalSettings;
//! use wifi_portal_esp32::mount::DirectoryMount;
//! use wifi_portal_esp32::session::MemoryStore;
//! use wifi_portal_esp32::wifi::SimulatedRadio;
//!
//! let mut radio = SimulatedRadio::demo();
//! let portal = boot::run(BootParts {
//!     settings: PortalSettings::default(),
//!     store: Box::new(MemoryStore::new()),
//!     mount: Box::new(DirectoryMount::new(std::env::temp_dir())),
//!     radio: &mut radio,
//! })
//! .unwrap();
//! assert_eq!(portal.snapshot().len(), 5);
//! ```

use crate::auth::{AuthGate, StaticCredentials};
use crate::config::PortalSettings;
use crate::mount::FilesystemMount;
use crate::portal::Portal;
use crate::session::{KeyValueStore, SessionStore};
use crate::wifi::{NetworkScanner, Radio, RadioError};
use log::{info, warn};
use std::fmt;

/// Collaborators handed to [`run`].
pub struct BootParts<'r, R: Radio> {
    pub settings: PortalSettings,
    pub store: Box<dyn KeyValueStore>,
    pub mount: Box<dyn FilesystemMount>,
    pub radio: &'r mut R,
}

/// Boot failures. Only the radio can stop the portal from coming up.
#[derive(Debug)]
pub enum BootError {
    Radio(RadioError),
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Radio(e) => write!(f, "radio failure during boot: {}", e),
        }
    }
}

impl std::error::Error for BootError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Radio(e) => Some(e),
        }
    }
}

impl From<RadioError> for BootError {
    fn from(e: RadioError) -> Self {
        Self::Radio(e)
    }
}

/// Run the boot sequence and return a controller ready to serve.
///
/// On return the radio is in access-point mode.
pub fn run<R: Radio>(parts: BootParts<'_, R>) -> Result<Portal, BootError> {
    let BootParts {
        settings,
        store,
        mut mount,
        radio,
    } = parts;

    let credentials = StaticCredentials::new(
        settings.admin_user.as_str(),
        settings.admin_password.as_str(),
    );
    let gate = AuthGate::restore(Box::new(credentials), SessionStore::new(store));

    if let Err(e) = mount.mount() {
        warn!("Filesystem mount failed, continuing without it: {}", e);
    }

    let snapshot =
        NetworkScanner::new(radio, &settings.access_point).scan(settings.max_scan_results)?;

    info!(
        "Boot complete: {} networks, policy {}, logged in: {}",
        snapshot.len(),
        settings.access_policy,
        gate.is_logged_in()
    );

    Ok(Portal::new(gate, snapshot, settings.access_policy))
}
