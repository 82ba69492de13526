//! WiFi provisioning portal binary.
//!
//! On ESP32 this scans with the real radio, mounts SPIFFS, keeps the login
//! flag in NVS and serves the portal on port 80 of the soft AP.
//!
//! On the host it runs the same portal against a simulated radio and a JSON
//! store, which is handy for working on the pages:
//!
//! ```bash
//! RUST_LOG=debug cargo run --bin portal
//! # then open http://127.0.0.1:8080/
//! ```

#[cfg(feature = "esp32")]
fn platform_init() {
    // Link ESP-IDF patches (must be first!)
    esp_idf_sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
}

#[cfg(not(feature = "esp32"))]
fn platform_init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

#[cfg(feature = "esp32")]
fn main() {
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use log::{error, info, warn};
    use std::sync::Arc;
    use std::time::Duration;
    use wifi_portal_esp32::boot::{self, BootParts};
    use wifi_portal_esp32::{
        EspRadio, KeyValueStore, MemoryStore, NvsStore, PortalServer, PortalSettings, SpiffsMount,
    };

    platform_init();
    info!("=== WiFi portal starting ===");

    let settings = PortalSettings::default();

    let peripherals = match Peripherals::take() {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to take peripherals: {}", e);
            return;
        }
    };
    let sysloop = match EspSystemEventLoop::take() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to take system event loop: {}", e);
            return;
        }
    };
    let nvs_partition = match EspDefaultNvsPartition::take() {
        Ok(n) => n,
        Err(e) => {
            error!("Failed to take NVS partition: {}", e);
            return;
        }
    };

    let store: Box<dyn KeyValueStore> = match NvsStore::new(nvs_partition.clone()) {
        Ok(s) => Box::new(s),
        Err(e) => {
            warn!("Failed to open NVS namespace, login will not persist: {}", e);
            Box::new(MemoryStore::unavailable())
        }
    };
    let mount = match SpiffsMount::new() {
        Ok(m) => m,
        Err(e) => {
            error!("Invalid SPIFFS mount point: {}", e);
            return;
        }
    };
    let mut radio = match EspRadio::new(peripherals.modem, sysloop, Some(nvs_partition)) {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to initialize WiFi: {}", e);
            return;
        }
    };

    let http_addr = settings.http_addr.clone();
    let portal = match boot::run(BootParts {
        settings,
        store,
        mount: Box::new(mount),
        radio: &mut radio,
    }) {
        Ok(p) => Arc::new(p),
        Err(e) => {
            error!("Boot failed: {}", e);
            return;
        }
    };

    // Keep server alive - dropping it stops serving
    let mut server = match PortalServer::start(&http_addr, portal.clone()) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start portal server: {}", e);
            return;
        }
    };

    info!("Entering main loop...");
    loop {
        std::thread::sleep(Duration::from_secs(10));
        if server.is_running() {
            log::debug!("Heartbeat");
            continue;
        }

        warn!("Portal server stopped, restarting");
        server.stop();
        match PortalServer::start(&http_addr, portal.clone()) {
            Ok(restarted) => server = restarted,
            Err(e) => error!("Failed to restart portal server: {}", e),
        }
    }
}

#[cfg(all(not(feature = "esp32"), not(target_os = "espidf")))]
#[tokio::main(flavor = "current_thread")]
async fn main() {
    use log::{error, info, warn};
    use std::sync::Arc;
    use wifi_portal_esp32::boot::{self, BootParts};
    use wifi_portal_esp32::persistence_host::{default_data_dir, FileStore};
    use wifi_portal_esp32::{
        DirectoryMount, KeyValueStore, MemoryStore, PortalServer, PortalSettings, SimulatedRadio,
    };

    platform_init();
    info!("=== WiFi portal (host) starting ===");

    let settings = PortalSettings::from_env();

    let data_dir = default_data_dir().unwrap_or_else(|e| {
        let fallback = std::env::temp_dir().join("wifi-portal");
        warn!("Cannot locate data directory ({}), using {:?}", e, fallback);
        fallback
    });
    let store: Box<dyn KeyValueStore> = match FileStore::open_default() {
        Ok(store) => {
            info!("Using store {:?}", store.path());
            Box::new(store)
        }
        Err(e) => {
            warn!("Cannot locate store file, login will not persist: {}", e);
            Box::new(MemoryStore::unavailable())
        }
    };

    let mut radio = SimulatedRadio::demo();
    let http_addr = settings.http_addr.clone();
    let portal = match boot::run(BootParts {
        settings,
        store,
        mount: Box::new(DirectoryMount::new(data_dir)),
        radio: &mut radio,
    }) {
        Ok(p) => Arc::new(p),
        Err(e) => {
            error!("Boot failed: {}", e);
            std::process::exit(1);
        }
    };

    let mut server = match PortalServer::start(&http_addr, portal) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start portal server on {}: {}", http_addr, e);
            std::process::exit(1);
        }
    };

    info!("Serving (Ctrl+C to exit)...");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
    }

    if !server.is_running() {
        warn!("Portal server had already stopped");
    }
    info!("Shutting down");
    server.stop();
}

#[cfg(all(not(feature = "esp32"), target_os = "espidf"))]
fn main() {
    println!("This binary requires the 'esp32' feature on ESP-IDF targets.");
}
