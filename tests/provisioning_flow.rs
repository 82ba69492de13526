//! End-to-end provisioning over real HTTP on the loopback interface.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wifi_portal_esp32::boot::{self, BootParts};
use wifi_portal_esp32::{
    AuthState, DirectoryMount, FileStore, KeyValueStore, MemoryStore, Portal, PortalServer,
    PortalSettings, SimulatedRadio,
};

static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

fn unique_dir() -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("wifi-portal-flow-{}-{}", std::process::id(), id))
}

fn boot_portal(store: Box<dyn KeyValueStore>, dir: &PathBuf) -> Arc<Portal> {
    let mut radio = SimulatedRadio::demo();
    let portal = boot::run(BootParts {
        settings: PortalSettings::default(),
        store,
        mount: Box::new(DirectoryMount::new(dir)),
        radio: &mut radio,
    })
    .unwrap();
    Arc::new(portal)
}

/// Send a GET and return (status, body).
fn get(addr: SocketAddr, path: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    write!(
        stream,
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        path, addr
    )
    .unwrap();

    let mut raw = String::new();
    stream.read_to_string(&mut raw).unwrap();

    let status = raw
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap();
    let body = raw
        .split_once("\r\n\r\n")
        .map(|(_, body)| body.to_string())
        .unwrap_or_default();
    (status, body)
}

// ==================== Flow Tests ====================

#[test]
fn test_full_provisioning_flow() {
    let dir = unique_dir();
    let portal = boot_portal(Box::new(MemoryStore::new()), &dir);
    let server = PortalServer::start("127.0.0.1:0", portal.clone()).unwrap();
    let addr = server.local_addr().unwrap();

    let (status, body) = get(addr, "/");
    assert_eq!(status, 200);
    assert!(body.contains("/login"));

    let (status, _) = get(addr, "/config");
    assert_eq!(status, 403);

    let (status, body) = get(addr, "/do_login?user=admin&pass=wrong");
    assert_eq!(status, 200);
    assert!(body.contains("Invalid login!"));
    assert_eq!(portal.auth_state(), AuthState::LoggedOut);

    let (status, _) = get(addr, "/do_login?user=admin&pass=admin123");
    assert_eq!(status, 302);
    assert_eq!(portal.auth_state(), AuthState::LoggedIn);

    let (status, body) = get(addr, "/config");
    assert_eq!(status, 200);
    assert!(body.contains("(RSSI:"));

    let (status, body) = get(addr, "/submit?ssid=My+Home&pass=s3cret%21&dns=8.8.8.8");
    assert_eq!(status, 200);
    assert!(body.contains("Settings saved!"));

    let record = portal.configuration();
    assert_eq!(record.target_ssid(), "My Home");
    assert_eq!(record.target_password(), "s3cret!");
    assert_eq!(record.dns_server(), "8.8.8.8");

    let (status, _) = get(addr, "/logout");
    assert_eq!(status, 200);
    let (status, _) = get(addr, "/config");
    assert_eq!(status, 403);

    let (status, _) = get(addr, "/nope");
    assert_eq!(status, 404);

    drop(server);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_login_survives_restart() {
    let dir = unique_dir();
    let store_path = dir.join("store.json");

    {
        let portal = boot_portal(Box::new(FileStore::open(&store_path)), &dir);
        let server = PortalServer::start("127.0.0.1:0", portal).unwrap();
        let addr = server.local_addr().unwrap();
        let (status, _) = get(addr, "/do_login?user=admin&pass=admin123");
        assert_eq!(status, 302);
    }

    let portal = boot_portal(Box::new(FileStore::open(&store_path)), &dir);
    assert_eq!(portal.auth_state(), AuthState::LoggedIn);

    let server = PortalServer::start("127.0.0.1:0", portal.clone()).unwrap();
    let addr = server.local_addr().unwrap();
    let (status, _) = get(addr, "/config");
    assert_eq!(status, 200);

    get(addr, "/logout");
    drop(server);

    let portal = boot_portal(Box::new(FileStore::open(&store_path)), &dir);
    assert_eq!(portal.auth_state(), AuthState::LoggedOut);

    let _ = std::fs::remove_dir_all(&dir);
}
