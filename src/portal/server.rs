//! HTTP adapter for the portal.
//!
//! Binds a [`Portal`] to a `tiny_http` server, which works on both the host
//! and ESP32 (via `std::net`). Requests are served one at a time on a single
//! background thread.

use super::{Method, Portal, Request, Response};
use log::{error, info, warn};
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Server, StatusCode};

/// How often the serving loop checks for shutdown.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Stack size for the serving thread; ESP32 tasks default to far less.
const SERVER_STACK_SIZE: usize = 16 * 1024;

/// Running portal HTTP server.
pub struct PortalServer {
    /// Server thread handle.
    handle: Option<thread::JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
    /// Cleared when the serving loop exits for any reason.
    running: Arc<AtomicBool>,
    local_addr: Option<SocketAddr>,
}

impl PortalServer {
    /// Start serving `portal` on `addr` (e.g. `0.0.0.0:80`).
    ///
    /// Drop the returned handle to stop the server.
    pub fn start(addr: &str, portal: Arc<Portal>) -> Result<Self, std::io::Error> {
        let server = Server::http(addr)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::AddrInUse, format!("{}", e)))?;
        let local_addr = server.server_addr().to_ip();

        info!(
            "Portal listening on http://{}/",
            local_addr.map_or_else(|| addr.to_string(), |a| a.to_string())
        );

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = thread::Builder::new()
            .name("portal-http".into())
            .stack_size(SERVER_STACK_SIZE)
            .spawn(move || {
                Self::run_server(server, portal, shutdown_clone);
                running_clone.store(false, Ordering::Release);
            })?;

        Ok(Self {
            handle: Some(handle),
            shutdown,
            running,
            local_addr,
        })
    }

    /// Address actually bound, useful when started on port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Whether the serving thread is still accepting requests.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn run_server(server: Server, portal: Arc<Portal>, shutdown: Arc<AtomicBool>) {
        loop {
            // Acquire pairs with the Release store in stop().
            if shutdown.load(Ordering::Acquire) {
                info!("Portal server shutting down");
                break;
            }

            match server.recv_timeout(POLL_INTERVAL) {
                Ok(Some(request)) => {
                    let method = Method::parse(request.method().as_str());
                    let portal_request = Request::new(method, request.url());
                    let response = portal.handle(&portal_request);

                    info!(
                        "{} {} -> {}",
                        request.method(),
                        portal_request.path,
                        response.status
                    );

                    if let Err(e) = request.respond(to_tiny_http(response)) {
                        warn!("Failed to send response: {}", e);
                    }
                }
                Ok(None) => {
                    // Timeout, check shutdown flag and continue
                }
                Err(e) => {
                    error!("Server error, portal stopped: {}", e);
                    break;
                }
            }
        }
    }

    /// Stop the server.
    ///
    /// May take up to one poll interval.
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PortalServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn to_tiny_http(response: Response) -> tiny_http::Response<Cursor<Vec<u8>>> {
    let headers = response
        .headers
        .iter()
        .filter_map(|(name, value)| match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            Ok(header) => Some(header),
            Err(()) => {
                warn!("Dropping invalid header {}", name);
                None
            }
        })
        .collect();

    let body = response.body.into_bytes();
    let len = body.len();
    tiny_http::Response::new(
        StatusCode(response.status),
        headers,
        Cursor::new(body),
        Some(len),
        None,
    )
}
