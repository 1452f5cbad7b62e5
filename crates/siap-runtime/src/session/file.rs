//! Session store persisted as a small JSON key/value file.
//!
//! ```text
//! ~/.siap/session.json
//! {
//!   "token": "4b0c…",
//!   "role": "Head",
//!   "email": "head@plant.example",
//!   "theme": "dark"
//! }
//! ```

use crate::config::expand_tilde;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use siap_auth::{Session, SessionStore, Theme};
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Stored {
    #[serde(flatten)]
    session: Session,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    theme: Option<Theme>,
}

/// [`SessionStore`] backed by a JSON file.
///
/// The file is read once at open. Every mutation updates memory first,
/// then rewrites the file through a temp file and a rename. Mutations
/// are serialized end to end, so the file always holds the latest
/// in-memory state. A failed
/// write is logged and the in-memory state stays authoritative, so the
/// store operations never fail.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    default_theme: Theme,
    state: RwLock<Stored>,
    /// Held from the in-memory update until the rename completes.
    persist_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Opens the store at `path`.
    ///
    /// A missing file is an empty session. An unreadable or corrupt
    /// file is logged and treated as empty.
    #[must_use]
    pub fn open(path: impl AsRef<Path>, default_theme: Theme) -> Self {
        let path = expand_tilde(path.as_ref());
        let state = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "corrupt session file, starting signed out");
                Stored::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Stored::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable session file, starting signed out");
                Stored::default()
            }
        };
        debug!(path = %path.display(), signed_in = state.session.has_token(), "session store opened");
        Self {
            path,
            default_theme,
            state: RwLock::new(state),
            persist_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, stored: &Stored) {
        if let Err(e) = self.write_file(stored) {
            error!(path = %self.path.display(), error = %e, "failed to persist session");
        }
    }

    fn write_file(&self, stored: &Stored) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(stored).map_err(std::io::Error::other)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let temp = self.path.with_extension("json.tmp");
        std::fs::write(&temp, json)?;
        std::fs::rename(&temp, &self.path)
    }

    fn mutate(&self, f: impl FnOnce(&mut Stored)) {
        let _persist = self.persist_lock.lock();
        let snapshot = {
            let mut state = self.state.write();
            f(&mut state);
            state.clone()
        };
        self.persist(&snapshot);
    }
}

impl SessionStore for FileSessionStore {
    fn set_session(&self, token: &str, role: &str, email: &str) {
        self.mutate(|s| s.session = Session::new(token, role, email));
    }

    fn clear_session(&self) {
        self.mutate(|s| s.session = Session::default());
    }

    fn snapshot(&self) -> Session {
        self.state.read().session.clone()
    }

    fn theme(&self) -> Theme {
        self.state.read().theme.unwrap_or(self.default_theme)
    }

    fn set_theme(&self, theme: Theme) {
        self.mutate(|s| s.theme = Some(theme));
    }
}
