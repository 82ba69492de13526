//! Provisioning controller.
//!
//! [`Portal`] owns all mutable portal state (login gate, configuration
//! record, scan snapshot) behind one mutex and maps each request to exactly
//! one route. It knows nothing about sockets: [`server::PortalServer`] feeds
//! it requests from `tiny_http`, tests call [`Portal::handle`] directly.
//!
//! | Path        | Route                  | Login required          |
//! |-------------|------------------------|-------------------------|
//! | `/`         | landing page           | no                      |
//! | `/login`    | login form             | no                      |
//! | `/do_login` | login attempt          | no                      |
//! | `/logout`   | logout                 | no                      |
//! | `/config`   | configuration form     | yes                     |
//! | `/submit`   | configuration submit   | with `Strict` policy    |
//! | `/exit`     | exit page              | no                      |
//!
//! # Example
//!
//! ```
//! use wifi_portal_esp32::auth::{AuthGate, StaticCredentials};
//! use wifi_portal_esp32::config::AccessPolicy;
//! use wifi_portal_esp32::portal::{Portal, Request};
//! use wifi_portal_esp32::session::{MemoryStore, SessionStore};
//! use wifi_portal_esp32::wifi::ScanSnapshot;
//!
//! let gate = AuthGate::restore(
//!     Box::new(StaticCredentials::new("admin", "admin123")),
//!     SessionStore::new(Box::new(MemoryStore::new())),
//! );
//! let portal = Portal::new(gate, ScanSnapshot::default(), AccessPolicy::Strict);
//!
//! let response = portal.handle(&Request::get("/do_login?user=admin&pass=admin123"));
//! assert_eq!(response.status, 302);
//! assert_eq!(response.header("Location"), Some("/config"));
//! ```

pub mod html;
pub mod query;
pub mod server;

use crate::auth::{AuthGate, AuthState, LoginOutcome};
use crate::config::{AccessPolicy, ConfigField, ConfigurationRecord};
use crate::wifi::ScanSnapshot;
use log::{debug, info, warn};
use query::QueryParams;
use std::sync::{Mutex, MutexGuard};

pub use server::PortalServer;

/// Content type of every HTML page.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Longest query string accepted by `/do_login`.
pub const MAX_LOGIN_QUERY_LEN: usize = 127;

/// Longest query string accepted by `/submit`.
pub const MAX_SUBMIT_QUERY_LEN: usize = 511;

/// HTTP request method, as far as the portal cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Other(String),
}

impl Method {
    pub fn parse(method: &str) -> Self {
        if method.eq_ignore_ascii_case("GET") {
            Self::Get
        } else {
            Self::Other(method.to_string())
        }
    }
}

/// Transport-independent request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: String,
}

impl Request {
    /// Build a request from a method and a URL such as `/submit?ssid=x`.
    pub fn new(method: Method, url: &str) -> Self {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        Self {
            method,
            path: path.to_string(),
            query: query.to_string(),
        }
    }

    /// Shorthand for a `GET` request.
    pub fn get(url: &str) -> Self {
        Self::new(Method::Get, url)
    }
}

/// Transport-independent response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl Response {
    /// `200 OK` HTML page.
    pub fn html(body: impl Into<String>) -> Self {
        Self::html_with_status(200, body)
    }

    pub fn html_with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: vec![("Content-Type", HTML_CONTENT_TYPE.to_string())],
            body: body.into(),
        }
    }

    /// `302 Found` to `location` with an empty body.
    pub fn redirect(location: &str) -> Self {
        Self {
            status: 302,
            headers: vec![("Location", location.to_string())],
            body: String::new(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: vec![("Content-Type", "text/plain; charset=utf-8".to_string())],
            body: body.to_string(),
        }
    }

    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    /// First header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Portal routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    LoginForm,
    Login,
    Logout,
    ConfigForm,
    Submit,
    Exit,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Self::Landing,
        Self::LoginForm,
        Self::Login,
        Self::Logout,
        Self::ConfigForm,
        Self::Submit,
        Self::Exit,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::LoginForm => "/login",
            Self::Login => "/do_login",
            Self::Logout => "/logout",
            Self::ConfigForm => "/config",
            Self::Submit => "/submit",
            Self::Exit => "/exit",
        }
    }

    /// Route for an exact path match.
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.path() == path)
    }

    /// Longest query string this route reads. Routes without form input
    /// read none.
    pub fn max_query_len(self) -> usize {
        match self {
            Self::Login => MAX_LOGIN_QUERY_LEN,
            Self::Submit => MAX_SUBMIT_QUERY_LEN,
            _ => 0,
        }
    }

    /// Whether this route needs a logged-in operator under `policy`.
    pub fn requires_login(self, policy: AccessPolicy) -> bool {
        match self {
            Self::ConfigForm => true,
            Self::Submit => policy.gates_submit(),
            _ => false,
        }
    }
}

struct PortalState {
    gate: AuthGate,
    record: ConfigurationRecord,
    snapshot: ScanSnapshot,
}

/// The provisioning controller.
pub struct Portal {
    state: Mutex<PortalState>,
    policy: AccessPolicy,
}

impl Portal {
    /// Create a controller serving `snapshot`, with an empty configuration
    /// record.
    pub fn new(gate: AuthGate, snapshot: ScanSnapshot, policy: AccessPolicy) -> Self {
        Self {
            state: Mutex::new(PortalState {
                gate,
                record: ConfigurationRecord::default(),
                snapshot,
            }),
            policy,
        }
    }

    pub fn policy(&self) -> AccessPolicy {
        self.policy
    }

    /// Current login state.
    pub fn auth_state(&self) -> AuthState {
        self.lock().gate.state()
    }

    /// Copy of the configuration record.
    pub fn configuration(&self) -> ConfigurationRecord {
        self.lock().record.clone()
    }

    /// Copy of the scan snapshot being served.
    pub fn snapshot(&self) -> ScanSnapshot {
        self.lock().snapshot.clone()
    }

    /// Replace the scan snapshot, e.g. after a re-scan.
    pub fn replace_snapshot(&self, snapshot: ScanSnapshot) {
        self.lock().snapshot = snapshot;
    }

    /// Handle one request.
    ///
    /// The query is parsed before the state lock is taken; everything else
    /// runs under it.
    pub fn handle(&self, request: &Request) -> Response {
        let Some(route) = Route::from_path(&request.path) else {
            debug!("No route for {}", request.path);
            return Response::text(404, html::NOT_FOUND);
        };

        if request.method != Method::Get {
            return Response::text(405, html::METHOD_NOT_ALLOWED).with_header("Allow", "GET");
        }

        let params = if request.query.len() <= route.max_query_len() {
            QueryParams::parse(&request.query)
        } else {
            if route.max_query_len() > 0 {
                warn!(
                    "Ignoring {}-byte query on {} (limit {})",
                    request.query.len(),
                    route.path(),
                    route.max_query_len()
                );
            }
            QueryParams::default()
        };

        let mut state = self.lock();

        if route.requires_login(self.policy) && !state.gate.is_logged_in() {
            info!("Denied {} to logged-out client", route.path());
            return Response::html_with_status(
                self.policy.denial_status(),
                html::ACCESS_DENIED_PAGE,
            );
        }

        match route {
            Route::Landing => Response::html(html::LANDING_PAGE),
            Route::LoginForm => Response::html(html::login_page()),
            Route::Login => {
                let user = params.get("user").unwrap_or_default();
                let pass = params.get("pass").unwrap_or_default();
                match state.gate.login(user, pass) {
                    LoginOutcome::Success => Response::redirect(Route::ConfigForm.path()),
                    LoginOutcome::InvalidCredentials => Response::html(html::INVALID_LOGIN_PAGE),
                }
            }
            Route::Logout => {
                state.gate.logout();
                Response::html(html::LOGOUT_PAGE)
            }
            Route::ConfigForm => Response::html(html::config_page(&state.snapshot)),
            Route::Submit => {
                let fields = ConfigField::ALL
                    .into_iter()
                    .filter_map(|field| params.get(field.key()).map(|value| (field.key(), value)));
                let ack = state.record.submit(fields);
                info!("Configuration updated ({} field(s))", ack.updated);
                Response::html(html::SAVED_PAGE)
            }
            Route::Exit => {
                info!("Operator left configuration mode");
                Response::html(html::EXIT_PAGE)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, PortalState> {
        // Handlers never leave the state half-written, so a poisoned lock is
        // still usable.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
