//! Configuration management with hierarchical layering.
//!
//! # Architecture
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌─────────────────────────────────────────┐
//! │  1. CLI flags (ConfigResolver)          │  Per invocation
//! ├─────────────────────────────────────────┤
//! │  2. Environment Variables (SIAP_*)      │  Runtime override
//! ├─────────────────────────────────────────┤
//! │  3. Project Config (.siap/config.toml)  │  Deployment-specific
//! ├─────────────────────────────────────────┤
//! │  4. Global Config (~/.siap/config.toml) │  User defaults
//! ├─────────────────────────────────────────┤
//! │  5. Default Values (compile-time)       │  Fallback
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Directory Structure
//!
//! ```text
//! ~/.siap/
//! ├── config.toml        # Global configuration
//! ├── session.json       # Token, role, email, theme
//! ├── accounts.toml      # Local identity accounts
//! ├── data/              # Local document store
//! ├── blobs/             # Local blob store
//! └── logs/siap.log      # File log (when enabled)
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `SIAP_DEBUG` | `debug` | bool |
//! | `SIAP_VERBOSE` | `ui.verbose` | bool |
//! | `SIAP_APP_ID` | `backend.app_id` | String |
//! | `SIAP_DATA_DIR` | `backend.data_dir` | PathBuf |
//! | `SIAP_BLOB_DIR` | `backend.blob_dir` | PathBuf |
//! | `SIAP_ACCOUNTS_FILE` | `backend.accounts_file` | PathBuf |
//! | `SIAP_SESSION_FILE` | `paths.session_file` | PathBuf |
//! | `SIAP_ROLE_MATCH` | `auth.role_match` | `exact` \| `ignore_case` |
//!
//! # Example Configuration
//!
//! ```toml
//! debug = false
//!
//! [backend]
//! app_id = "Ij8HEOktiALS0zjKB3ay"
//! data_dir = "~/.siap/data"
//!
//! [auth]
//! role_match = "exact"
//!
//! [ui]
//! theme = "dark"
//!
//! [logging]
//! file = true
//! file_level = "info"
//! ```

mod error;
mod loader;
mod resolver;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use resolver::ConfigResolver;
pub use types::{
    AuthConfig, BackendConfig, LoggingConfig, PathsConfig, SiapConfig, UiConfig, DEFAULT_APP_ID,
};

/// Project-local config directory name.
pub const PROJECT_CONFIG_DIR: &str = ".siap";

/// Config file name inside a config directory.
pub const PROJECT_CONFIG_FILE: &str = "config.toml";

/// Default global SIAP directory (`~/.siap`).
#[must_use]
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(PROJECT_CONFIG_DIR)
}

/// Default global config file path.
#[must_use]
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join(PROJECT_CONFIG_FILE)
}

/// Expands a leading `~/` to the home directory.
pub(crate) fn expand_tilde(path: &std::path::Path) -> std::path::PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/")) {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}
