//! Session state and its store.
//!
//! The session is the client-held record of the signed-in user: an
//! opaque token, the cached role string and the email address. It is
//! written by sign-in, cleared by sign-out and read everywhere else.
//!
//! # Injection
//!
//! There is exactly one store per process, shared as a
//! [`SharedSessionStore`] (`Arc<dyn SessionStore>`) and handed to every
//! service that needs it. Nothing reads session keys directly.
//!
//! ```
//! use siap_auth::{MemorySessionStore, SessionStore, SharedSessionStore};
//! use std::sync::Arc;
//!
//! let store: SharedSessionStore = Arc::new(MemorySessionStore::new());
//! store.set_session("tok", "Head", "head@siap.example");
//! assert!(store.has_token());
//! assert_eq!(store.role().as_deref(), Some("Head"));
//!
//! store.clear_session();
//! store.clear_session();
//! assert!(!store.has_token());
//! ```

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Snapshot of the session fields.
///
/// `token` is a presence flag backed by the opaque token text; an empty
/// token counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Session {
    /// Builds a populated session.
    #[must_use]
    pub fn new(token: &str, role: &str, email: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            role: Some(role.to_string()),
            email: Some(email.to_string()),
        }
    }

    /// Whether a non-empty token is present.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Cached role text, if any.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// Signed-in email, if any.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// Client colour scheme, stored next to the session but never cleared by sign-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Parses `light` / `dark`, ignoring case.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    /// The other theme.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => f.write_str("light"),
            Self::Dark => f.write_str("dark"),
        }
    }
}

/// Process-wide session storage.
///
/// Every operation is total: implementations that persist must log
/// persistence failures and keep their in-memory state authoritative.
///
/// # Implementors
///
/// - [`MemorySessionStore`]: in-process only
/// - `FileSessionStore` (in `siap-runtime`): JSON key/value file
pub trait SessionStore: Send + Sync {
    /// Overwrites all three session fields. No validation is performed.
    fn set_session(&self, token: &str, role: &str, email: &str);

    /// Removes token, role and email. Idempotent.
    fn clear_session(&self);

    /// Returns a copy of the current session.
    fn snapshot(&self) -> Session;

    /// Current theme preference.
    fn theme(&self) -> Theme;

    /// Stores a theme preference.
    fn set_theme(&self, theme: Theme);

    /// Cached role, or `None` if never set.
    fn role(&self) -> Option<String> {
        self.snapshot().role
    }

    /// Signed-in email, or `None`.
    fn email(&self) -> Option<String> {
        self.snapshot().email
    }

    /// Whether a session token is present.
    fn has_token(&self) -> bool {
        self.snapshot().has_token()
    }
}

/// Shared handle injected into services.
pub type SharedSessionStore = Arc<dyn SessionStore>;

#[derive(Debug, Default)]
struct State {
    session: Session,
    theme: Theme,
}

/// In-memory [`SessionStore`].
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    state: RwLock<State>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `session`.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            state: RwLock::new(State {
                session,
                theme: Theme::default(),
            }),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn set_session(&self, token: &str, role: &str, email: &str) {
        self.state.write().session = Session::new(token, role, email);
    }

    fn clear_session(&self) {
        self.state.write().session = Session::default();
    }

    fn snapshot(&self) -> Session {
        self.state.read().session.clone()
    }

    fn theme(&self) -> Theme {
        self.state.read().theme
    }

    fn set_theme(&self, theme: Theme) {
        self.state.write().theme = theme;
    }
}
