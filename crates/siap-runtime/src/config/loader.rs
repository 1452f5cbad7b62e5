//! Configuration loader with hierarchical merging.
//!
//! # Load Order
//!
//! 1. Default values (compile-time)
//! 2. Global config (`~/.siap/config.toml`)
//! 3. Project config (`<root>/.siap/config.toml`)
//! 4. Environment variables (`SIAP_*`)
//!
//! Each layer overrides the previous.

use super::{default_config_path, ConfigError, SiapConfig, PROJECT_CONFIG_DIR, PROJECT_CONFIG_FILE};
use siap_auth::RoleMatch;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parses a boolean environment variable into a config field.
macro_rules! parse_env_bool {
    ($field:expr, $var:literal) => {
        if let Ok(val) = std::env::var($var) {
            $field = parse_bool(&val)
                .ok_or_else(|| ConfigError::invalid_env_var($var, "expected bool"))?;
        }
    };
}

/// Sets an optional path field from an environment variable.
macro_rules! parse_env_path {
    ($field:expr, $var:literal) => {
        if let Ok(val) = std::env::var($var) {
            if val.is_empty() {
                return Err(ConfigError::invalid_env_var($var, "expected a path"));
            }
            $field = Some(PathBuf::from(val));
        }
    };
}

/// Configuration loader with builder pattern.
///
/// ```ignore
/// use siap_runtime::config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_project_root("/srv/siap")
///     .skip_env_vars()
///     .load()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    global_config_path: Option<PathBuf>,
    project_root: Option<PathBuf>,
    skip_env: bool,
    skip_global: bool,
    skip_project: bool,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `path` instead of `~/.siap/config.toml`.
    #[must_use]
    pub fn with_global_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Project config is read from `<path>/.siap/config.toml`.
    #[must_use]
    pub fn with_project_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_root = Some(path.into());
        self
    }

    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    #[must_use]
    pub fn skip_global_config(mut self) -> Self {
        self.skip_global = true;
        self
    }

    #[must_use]
    pub fn skip_project_config(mut self) -> Self {
        self.skip_project = true;
        self
    }

    /// Loads and merges configuration from all enabled sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a config file exists but cannot be read
    /// or parsed, or an environment variable holds an invalid value.
    /// Missing files are skipped.
    pub fn load(&self) -> Result<SiapConfig, ConfigError> {
        let mut config = SiapConfig::default();

        if !self.skip_global {
            let global_path = self
                .global_config_path
                .clone()
                .unwrap_or_else(default_config_path);

            if let Some(global) = Self::load_file(&global_path)? {
                debug!(path = %global_path.display(), "Loaded global config");
                config.merge(&global);
            }
        }

        if !self.skip_project {
            if let Some(ref root) = self.project_root {
                let path = root.join(PROJECT_CONFIG_DIR).join(PROJECT_CONFIG_FILE);
                if let Some(project) = Self::load_file(&path)? {
                    debug!(path = %path.display(), "Loaded project config");
                    config.merge(&project);
                }
            }
        }

        if !self.skip_env {
            Self::apply_env_vars(&mut config)?;
        }

        Ok(config)
    }

    fn load_file(path: &Path) -> Result<Option<SiapConfig>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
        let config =
            SiapConfig::from_toml(&content).map_err(|e| ConfigError::parse(path, e))?;

        Ok(Some(config))
    }

    fn apply_env_vars(config: &mut SiapConfig) -> Result<(), ConfigError> {
        parse_env_bool!(config.debug, "SIAP_DEBUG");
        parse_env_bool!(config.ui.verbose, "SIAP_VERBOSE");

        if let Ok(val) = std::env::var("SIAP_APP_ID") {
            siap_types::validate_segment(&val)
                .map_err(|e| ConfigError::invalid_env_var("SIAP_APP_ID", e.to_string()))?;
            config.backend.app_id = val;
        }

        if let Ok(val) = std::env::var("SIAP_ROLE_MATCH") {
            config.auth.role_match = RoleMatch::parse(&val).ok_or_else(|| {
                ConfigError::invalid_env_var("SIAP_ROLE_MATCH", "expected exact or ignore_case")
            })?;
        }

        parse_env_path!(config.backend.data_dir, "SIAP_DATA_DIR");
        parse_env_path!(config.backend.blob_dir, "SIAP_BLOB_DIR");
        parse_env_path!(config.backend.accounts_file, "SIAP_ACCOUNTS_FILE");
        parse_env_path!(config.paths.session_file, "SIAP_SESSION_FILE");

        Ok(())
    }
}

/// Accepts `true/false`, `1/0`, `yes/no`, `on/off`, ignoring case.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siap_auth::Theme;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_defaults_only() {
        let config = ConfigLoader::new()
            .skip_global_config()
            .skip_project_config()
            .skip_env_vars()
            .load()
            .unwrap();

        assert_eq!(config, SiapConfig::default());
    }

    #[test]
    fn load_global_config() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            temp.path(),
            r#"
debug = true

[backend]
app_id = "staging"
"#,
        );

        let config = ConfigLoader::new()
            .with_global_config(&path)
            .skip_project_config()
            .skip_env_vars()
            .load()
            .unwrap();

        assert!(config.debug);
        assert_eq!(config.backend.app_id, "staging");
    }

    #[test]
    fn project_overrides_global() {
        let global = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();

        let global_path = write_config(
            global.path(),
            r#"
[auth]
role_match = "ignore_case"

[ui]
theme = "dark"
"#,
        );

        let dot = project.path().join(PROJECT_CONFIG_DIR);
        std::fs::create_dir_all(&dot).unwrap();
        write_config(
            &dot,
            r#"
[backend]
data_dir = "/srv/siap/data"
"#,
        );

        let config = ConfigLoader::new()
            .with_global_config(&global_path)
            .with_project_root(project.path())
            .skip_env_vars()
            .load()
            .unwrap();

        assert_eq!(config.auth.role_match, RoleMatch::IgnoreCase);
        assert_eq!(config.ui.theme, Theme::Dark);
        assert_eq!(
            config.backend.data_dir,
            Some(PathBuf::from("/srv/siap/data"))
        );
    }

    #[test]
    fn missing_files_are_ignored() {
        let temp = TempDir::new().unwrap();
        let config = ConfigLoader::new()
            .with_global_config(temp.path().join("absent.toml"))
            .with_project_root(temp.path())
            .skip_env_vars()
            .load()
            .unwrap();
        assert_eq!(config, SiapConfig::default());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "debug = \"sometimes\"");

        let err = ConfigLoader::new()
            .with_global_config(&path)
            .skip_project_config()
            .skip_env_vars()
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn parse_bool_variants() {
        for t in ["true", "TRUE", "1", "yes", "on"] {
            assert_eq!(parse_bool(t), Some(true), "{t}");
        }
        for f in ["false", "0", "No", "off"] {
            assert_eq!(parse_bool(f), Some(false), "{f}");
        }
        assert_eq!(parse_bool("maybe"), None);
    }
}
