//! Persistent session storage.
//!
//! [`siap_auth::SessionStore`] defines the contract; this module adds a
//! store that survives process restarts, the CLI's stand-in for browser
//! local storage.

mod file;

pub use file::FileSessionStore;
