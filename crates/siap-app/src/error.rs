//! Application-level error type.
//!
//! [`AppError`] unifies all internal errors for the application layer.

use siap_auth::AccessDenied;
use siap_runtime::collab::{BlobError, IdentityError, StoreError};
use siap_runtime::config::ConfigError;
use siap_runtime::records::RecordError;
use siap_runtime::signin::AuthError;
use siap_types::ErrorCode;
use thiserror::Error;

/// Unified application error.
///
/// # Example
///
/// ```
/// use siap_app::{AccessDenied, AppError, ErrorCode};
///
/// let app_err: AppError = AccessDenied::Unauthenticated.into();
/// assert_eq!(app_err.code(), "AUTH_UNAUTHENTICATED");
/// assert!(app_err.is_redirect());
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Access(#[from] AccessDenied),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Blob error: {0}")]
    Blob(#[from] BlobError),

    /// Front-end input that could not be understood
    #[error("Invalid input: {0}")]
    Input(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    /// Whether this error means "no session, go to the entry page".
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        matches!(
            self,
            Self::Access(AccessDenied::Unauthenticated)
                | Self::Record(RecordError::Access(AccessDenied::Unauthenticated))
        )
    }

    /// Whether this error is a capability denial for a signed-in user.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(
            self,
            Self::Access(AccessDenied::CapabilityDenied { .. })
                | Self::Record(RecordError::Access(AccessDenied::CapabilityDenied { .. }))
        )
    }
}

impl ErrorCode for AppError {
    fn code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.code(),
            Self::Access(e) => e.code(),
            Self::Record(e) => e.code(),
            Self::Auth(e) => e.code(),
            Self::Identity(e) => e.code(),
            Self::Store(e) => e.code(),
            Self::Blob(e) => e.code(),
            Self::Input(_) => "APP_INVALID_INPUT",
            Self::Io(_) => "APP_IO_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Config(e) => e.is_recoverable(),
            Self::Access(e) => e.is_recoverable(),
            Self::Record(e) => e.is_recoverable(),
            Self::Auth(e) => e.is_recoverable(),
            Self::Identity(e) => e.is_recoverable(),
            Self::Store(e) => e.is_recoverable(),
            Self::Blob(e) => e.is_recoverable(),
            Self::Input(_) => false,
            Self::Io(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siap_auth::{Capability, Resource};

    #[test]
    fn record_access_errors_classify() {
        let denied = AccessDenied::CapabilityDenied {
            resource: Resource::Workers,
            role: "LMS".into(),
            required: Capability::EDIT,
            available: Capability::VIEW,
        };
        let err: AppError = RecordError::from(denied).into();
        assert!(err.is_denied());
        assert!(!err.is_redirect());
        assert_eq!(err.code(), "AUTH_CAPABILITY_DENIED");

        let err: AppError = RecordError::from(AccessDenied::Unauthenticated).into();
        assert!(err.is_redirect());
    }

    #[test]
    fn io_error_code() {
        let err: AppError = std::io::Error::other("disk").into();
        assert_eq!(err.code(), "APP_IO_ERROR");
        assert!(err.is_recoverable());
    }

    #[test]
    fn input_error_code() {
        let err = AppError::input("unknown resource 'tools'");
        assert_eq!(err.code(), "APP_INVALID_INPUT");
        assert!(!err.is_recoverable());
        assert!(!err.is_redirect() && !err.is_denied());
    }

    #[test]
    fn identity_errors_keep_codes() {
        let err: AppError = IdentityError::InvalidCredentials.into();
        assert_eq!(err.code(), "IDENTITY_INVALID_CREDENTIALS");
    }
}
