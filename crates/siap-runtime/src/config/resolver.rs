//! Configuration resolution.
//!
//! ```text
//! ConfigLoader.load()  →  SiapConfig (files + env)
//!                              │
//!                              ▼
//!                  ConfigResolver.resolve()   ← front-end overrides (CLI flags)
//!                              │
//!                              ▼
//!                     SiapConfig (final)
//! ```

use super::{ConfigError, SiapConfig};

/// Produces the final configuration for an application instance.
///
/// Front ends implement this to layer their own overrides on top of
/// [`ConfigLoader`](super::ConfigLoader); `SiapApp::builder` consumes it.
pub trait ConfigResolver {
    /// Resolves the effective configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when any layer cannot be loaded.
    fn resolve(&self) -> Result<SiapConfig, ConfigError>;
}

/// A fixed configuration resolves to itself.
impl ConfigResolver for SiapConfig {
    fn resolve(&self) -> Result<SiapConfig, ConfigError> {
        Ok(self.clone())
    }
}
