//! Portal login gate.
//!
//! A two-state machine (`LoggedOut`, `LoggedIn`) guarded by a single
//! credential pair. Every successful login and every logout is mirrored to
//! the [`SessionStore`]; a failed write is logged and otherwise ignored
//! because the in-memory state stays authoritative for the current run.
//!
//! There is no lockout and no attempt counting.
//!
//! # Example
//!
//! ```
//! use wifi_portal_esp32::auth::{AuthGate, AuthState, LoginOutcome, StaticCredentials};
//! use wifi_portal_esp32::session::{MemoryStore, SessionStore};
//!
//! let session = SessionStore::new(Box::new(MemoryStore::new()));
//! let mut gate = AuthGate::restore(Box::new(StaticCredentials::new("admin", "admin123")), session);
//! assert_eq!(gate.state(), AuthState::LoggedOut);
//!
//! assert_eq!(gate.login("admin", "admin123"), LoginOutcome::Success);
//! assert_eq!(gate.state(), AuthState::LoggedIn);
//!
//! gate.logout();
//! assert!(!gate.is_logged_in());
//! ```

use crate::session::SessionStore;
use log::{info, warn};
use zeroize::Zeroizing;

/// Login state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    LoggedOut,
    LoggedIn,
}

/// Result of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials accepted; the caller should redirect to the form.
    Success,
    /// Credentials rejected; state unchanged.
    InvalidCredentials,
}

/// Decides whether a username/password pair is acceptable.
///
/// Swap the implementation to back the portal with a real secret store.
pub trait CredentialCheck: Send {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// A single compiled-in credential pair.
pub struct StaticCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }
}

impl CredentialCheck for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        // Both comparisons always run.
        let user_ok = constant_time_eq(self.username.as_bytes(), username.as_bytes());
        let pass_ok = constant_time_eq(self.password.as_bytes(), password.as_bytes());
        user_ok & pass_ok
    }
}

/// Compare two byte strings without an early exit on the first difference.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Login state machine with persisted mirror.
pub struct AuthGate {
    state: AuthState,
    credentials: Box<dyn CredentialCheck>,
    session: SessionStore,
}

impl AuthGate {
    /// Create a gate whose initial state is read from `session`.
    pub fn restore(credentials: Box<dyn CredentialCheck>, session: SessionStore) -> Self {
        let state = if session.restore() {
            AuthState::LoggedIn
        } else {
            AuthState::LoggedOut
        };
        info!("Restored session: {:?}", state);

        Self {
            state,
            credentials,
            session,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_logged_in(&self) -> bool {
        self.state == AuthState::LoggedIn
    }

    /// Attempt a login.
    ///
    /// On success the state becomes `LoggedIn` and `true` is persisted. On
    /// failure nothing changes and nothing is written.
    pub fn login(&mut self, username: &str, password: &str) -> LoginOutcome {
        if !self.credentials.verify(username, password) {
            warn!("Rejected login attempt for user {:?}", username);
            return LoginOutcome::InvalidCredentials;
        }

        self.state = AuthState::LoggedIn;
        self.mirror();
        info!("Operator {:?} logged in", username);
        LoginOutcome::Success
    }

    /// Log out. Always succeeds and always persists `false`.
    pub fn logout(&mut self) {
        self.state = AuthState::LoggedOut;
        self.mirror();
        info!("Operator logged out");
    }

    fn mirror(&mut self) {
        if let Err(e) = self.session.persist(self.is_logged_in()) {
            warn!("Failed to persist login state: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemoryStore, LOGIN_STATE_KEY};

    fn gate_over(store: &MemoryStore) -> AuthGate {
        AuthGate::restore(
            Box::new(StaticCredentials::new("admin", "admin123")),
            SessionStore::new(Box::new(store.clone())),
        )
    }

    // ==================== Restore Tests ====================

    #[test]
    fn test_fresh_boot_is_logged_out() {
        let store = MemoryStore::new();
        assert_eq!(gate_over(&store).state(), AuthState::LoggedOut);
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_login_survives_reboot() {
        let store = MemoryStore::new();
        gate_over(&store).login("admin", "admin123");
        assert_eq!(gate_over(&store).state(), AuthState::LoggedIn);
    }

    // ==================== Login Tests ====================

    #[test]
    fn test_valid_login_persists_true() {
        let store = MemoryStore::new();
        let mut gate = gate_over(&store);

        assert_eq!(gate.login("admin", "admin123"), LoginOutcome::Success);
        assert_eq!(gate.state(), AuthState::LoggedIn);
        assert_eq!(store.value(LOGIN_STATE_KEY), Some(vec![1]));
    }

    #[test]
    fn test_invalid_login_does_not_write() {
        let store = MemoryStore::new();
        let mut gate = gate_over(&store);

        for (user, pass) in [
            ("admin", "wrong"),
            ("root", "admin123"),
            ("", ""),
            ("admin", "admin1234"),
            ("ADMIN", "admin123"),
        ] {
            assert_eq!(gate.login(user, pass), LoginOutcome::InvalidCredentials);
        }
        assert_eq!(gate.state(), AuthState::LoggedOut);
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_no_lockout_after_failures() {
        let store = MemoryStore::new();
        let mut gate = gate_over(&store);
        for _ in 0..50 {
            gate.login("admin", "nope");
        }
        assert_eq!(gate.login("admin", "admin123"), LoginOutcome::Success);
    }

    #[test]
    fn test_persist_failure_keeps_memory_state() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let mut gate = gate_over(&store);

        assert_eq!(gate.login("admin", "admin123"), LoginOutcome::Success);
        assert!(gate.is_logged_in());
        assert_eq!(store.writes(), 0);
    }

    // ==================== Logout Tests ====================

    #[test]
    fn test_logout_persists_false() {
        let store = MemoryStore::new();
        let mut gate = gate_over(&store);
        gate.login("admin", "admin123");
        gate.logout();

        assert_eq!(gate.state(), AuthState::LoggedOut);
        assert_eq!(store.value(LOGIN_STATE_KEY), Some(vec![0]));
        assert!(!gate_over(&store).is_logged_in());
    }

    #[test]
    fn test_logout_idempotent() {
        let store = MemoryStore::new();
        let mut gate = gate_over(&store);
        gate.logout();
        gate.logout();

        assert_eq!(gate.state(), AuthState::LoggedOut);
        assert_eq!(store.value(LOGIN_STATE_KEY), Some(vec![0]));
    }

    // ==================== Credential Tests ====================

    #[test]
    fn test_custom_credential_check() {
        struct AnyPassword;
        impl CredentialCheck for AnyPassword {
            fn verify(&self, username: &str, _password: &str) -> bool {
                username == "ops"
            }
        }

        let store = MemoryStore::new();
        let mut gate = AuthGate::restore(
            Box::new(AnyPassword),
            SessionStore::new(Box::new(store.clone())),
        );
        assert_eq!(gate.login("ops", "whatever"), LoginOutcome::Success);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(constant_time_eq(b"", b""));
    }
}
