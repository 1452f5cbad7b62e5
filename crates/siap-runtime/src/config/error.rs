//! Configuration errors.

use siap_types::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

/// Why a configuration layer could not be applied.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("cannot read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config file is not valid SIAP TOML.
    #[error("config '{path}' is not valid TOML: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("environment variable {name} is invalid: {reason}")]
    InvalidEnvVar { name: &'static str, reason: String },
}

impl ConfigError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_env_var(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name,
            reason: reason.into(),
        }
    }
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "CONFIG_READ_FILE",
            Self::Parse { .. } => "CONFIG_PARSE_TOML",
            Self::InvalidEnvVar { .. } => "CONFIG_INVALID_ENV_VAR",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Read { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siap_types::assert_error_code;

    #[test]
    fn env_var_error_names_the_variable() {
        let err = ConfigError::invalid_env_var("SIAP_ROLE_MATCH", "expected exact or ignore_case");
        assert_eq!(
            err.to_string(),
            "environment variable SIAP_ROLE_MATCH is invalid: expected exact or ignore_case"
        );
        assert_error_code(&err, "CONFIG_");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn unreadable_file_is_recoverable() {
        let err = ConfigError::read(
            "/nope/config.toml",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_error_code(&err, "CONFIG_");
        assert!(err.is_recoverable());
    }
}
