//! Configuration types.
//!
//! All types implement [`Default`] for compile-time fallback values.

use super::{default_config_dir, expand_tilde};
use serde::{Deserialize, Serialize};
use siap_auth::{RoleMatch, Theme};
use std::path::PathBuf;

/// Artifact namespace the production collections live under.
pub const DEFAULT_APP_ID: &str = "Ij8HEOktiALS0zjKB3ay";

/// Main configuration structure, after merging all layers.
///
/// ```
/// use siap_runtime::config::SiapConfig;
///
/// let config = SiapConfig::default();
/// assert!(!config.debug);
/// assert_eq!(config.backend.app_id, "Ij8HEOktiALS0zjKB3ay");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiapConfig {
    /// Enable debug mode.
    pub debug: bool,

    /// Collaborator locations.
    pub backend: BackendConfig,

    /// Authorization behaviour.
    pub auth: AuthConfig,

    /// Client-local file locations.
    pub paths: PathsConfig,

    pub ui: UiConfig,

    pub logging: LoggingConfig,
}

impl SiapConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes to TOML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserializes from TOML.
    ///
    /// # Errors
    ///
    /// Returns error if the text is not valid config TOML.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Merges `other` into `self`.
    ///
    /// Values from `other` win only where they differ from the default,
    /// so an overlay file that omits a key keeps the base value.
    pub fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.debug != default.debug {
            self.debug = other.debug;
        }

        self.backend.merge(&other.backend);
        self.auth.merge(&other.auth);
        self.paths.merge(&other.paths);
        self.ui.merge(&other.ui);
        self.logging.merge(&other.logging);
    }
}

/// Where the document, blob and identity collaborators keep their data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// Namespace segment of scoped collections (`artifacts/{app_id}/...`).
    pub app_id: String,

    /// Local document store root. Defaults to `~/.siap/data`.
    pub data_dir: Option<PathBuf>,

    /// Local blob store root. Defaults to `~/.siap/blobs`.
    pub blob_dir: Option<PathBuf>,

    /// Local identity accounts file. Defaults to `~/.siap/accounts.toml`.
    pub accounts_file: Option<PathBuf>,

    /// How often live views re-check documents changed by other processes.
    pub watch_poll_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            app_id: DEFAULT_APP_ID.into(),
            data_dir: None,
            blob_dir: None,
            accounts_file: None,
            watch_poll_ms: 1_000,
        }
    }
}

impl BackendConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.app_id != default.app_id {
            self.app_id.clone_from(&other.app_id);
        }
        if other.data_dir.is_some() {
            self.data_dir.clone_from(&other.data_dir);
        }
        if other.blob_dir.is_some() {
            self.blob_dir.clone_from(&other.blob_dir);
        }
        if other.accounts_file.is_some() {
            self.accounts_file.clone_from(&other.accounts_file);
        }
        if other.watch_poll_ms != default.watch_poll_ms {
            self.watch_poll_ms = other.watch_poll_ms;
        }
    }

    #[must_use]
    pub fn data_dir_or_default(&self) -> PathBuf {
        self.data_dir
            .as_deref()
            .map_or_else(|| default_config_dir().join("data"), expand_tilde)
    }

    #[must_use]
    pub fn blob_dir_or_default(&self) -> PathBuf {
        self.blob_dir
            .as_deref()
            .map_or_else(|| default_config_dir().join("blobs"), expand_tilde)
    }

    #[must_use]
    pub fn accounts_file_or_default(&self) -> PathBuf {
        self.accounts_file
            .as_deref()
            .map_or_else(|| default_config_dir().join("accounts.toml"), expand_tilde)
    }
}

/// Authorization settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    /// How the authorization gate compares role strings.
    pub role_match: RoleMatch,
}

impl AuthConfig {
    fn merge(&mut self, other: &Self) {
        if other.role_match != RoleMatch::default() {
            self.role_match = other.role_match;
        }
    }
}

/// Client-local paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    /// Session key/value file. Defaults to `~/.siap/session.json`.
    pub session_file: Option<PathBuf>,
}

impl PathsConfig {
    fn merge(&mut self, other: &Self) {
        if other.session_file.is_some() {
            self.session_file.clone_from(&other.session_file);
        }
    }

    #[must_use]
    pub fn session_file_or_default(&self) -> PathBuf {
        self.session_file
            .as_deref()
            .map_or_else(|| default_config_dir().join("session.json"), expand_tilde)
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub verbose: bool,

    pub color: bool,

    /// Theme used until the user picks one.
    pub theme: Theme,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            color: true,
            theme: Theme::Light,
        }
    }
}

impl UiConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.verbose != default.verbose {
            self.verbose = other.verbose;
        }
        if other.color != default.color {
            self.color = other.color;
        }
        if other.theme != default.theme {
            self.theme = other.theme;
        }
    }
}

/// File logging settings. Terminal logging is controlled by CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write `siap.log` in addition to terminal output.
    pub file: bool,

    /// `EnvFilter` level for the file layer.
    pub file_level: String,

    /// Log directory. Defaults to `~/.siap/logs`.
    pub file_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: false,
            file_level: "debug".into(),
            file_path: None,
        }
    }
}

impl LoggingConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.file != default.file {
            self.file = other.file;
        }
        if other.file_level != default.file_level {
            self.file_level.clone_from(&other.file_level);
        }
        if other.file_path.is_some() {
            self.file_path.clone_from(&other.file_path);
        }
    }

    #[must_use]
    pub fn resolved_file_path(&self) -> PathBuf {
        self.file_path
            .as_deref()
            .map_or_else(|| default_config_dir().join("logs"), expand_tilde)
    }

    /// Filter directive for the file layer; noisy runtime crates are capped at `warn`.
    #[must_use]
    pub fn file_filter_directive(&self) -> String {
        format!("{},tokio=warn", self.file_level)
    }
}
