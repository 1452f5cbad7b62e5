//! Record service errors.

use crate::collab::{BlobError, StoreError};
use siap_auth::{AccessDenied, Resource, Route};
use siap_types::{DocId, ErrorCode, PathError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Access(#[from] AccessDenied),

    #[error("{resource} record '{id}' not found")]
    NotFound { resource: Resource, id: DocId },

    #[error("invalid value for '{field}': {reason}")]
    InvalidField { field: String, reason: &'static str },

    #[error("{resource} has no field '{field}'")]
    UnknownField { resource: Resource, field: String },

    #[error("'{0}' is required")]
    MissingField(&'static str),

    #[error("'{0}' cannot be changed after creation")]
    ImmutableField(&'static str),

    #[error("invalid record id: {0}")]
    InvalidId(#[from] PathError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Blob(#[from] BlobError),
}

impl RecordError {
    /// Where the page goes after this error, if anywhere.
    #[must_use]
    pub fn navigation(&self) -> Option<Route> {
        match self {
            Self::NotFound { .. } => Some(Route::NotFound),
            Self::Access(AccessDenied::Unauthenticated) => Some(Route::Entry),
            _ => None,
        }
    }
}

impl ErrorCode for RecordError {
    fn code(&self) -> &'static str {
        match self {
            Self::Access(e) => e.code(),
            Self::NotFound { .. } => "RECORD_NOT_FOUND",
            Self::InvalidField { .. } => "RECORD_INVALID_FIELD",
            Self::UnknownField { .. } => "RECORD_UNKNOWN_FIELD",
            Self::MissingField(_) => "RECORD_MISSING_FIELD",
            Self::ImmutableField(_) => "RECORD_IMMUTABLE_FIELD",
            Self::InvalidId(_) => "RECORD_INVALID_ID",
            Self::Store(e) => e.code(),
            Self::Blob(e) => e.code(),
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Access(e) => e.is_recoverable(),
            Self::Store(e) => e.is_recoverable(),
            Self::Blob(e) => e.is_recoverable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siap_types::{assert_error_codes, TryNew};

    #[test]
    fn record_codes() {
        let id = DocId::try_new("x".to_string()).unwrap();
        assert_error_codes(
            &[
                RecordError::NotFound {
                    resource: Resource::Assets,
                    id,
                },
                RecordError::InvalidField {
                    field: "age".into(),
                    reason: "expected a number",
                },
                RecordError::MissingField("name"),
                RecordError::ImmutableField("id"),
                RecordError::InvalidId(PathError::Empty),
            ],
            "RECORD_",
        );
    }

    #[test]
    fn wrapped_errors_keep_their_codes() {
        let err = RecordError::from(AccessDenied::Unauthenticated);
        assert_eq!(err.code(), "AUTH_UNAUTHENTICATED");
        assert!(err.is_recoverable());
        assert_eq!(err.navigation(), Some(Route::Entry));

        let err = RecordError::from(StoreError::io("/x", std::io::Error::other("disk")));
        assert_eq!(err.code(), "STORE_IO");
        assert!(err.navigation().is_none());
    }

    #[test]
    fn not_found_navigates() {
        let err = RecordError::NotFound {
            resource: Resource::OnCall,
            id: DocId::generate(),
        };
        assert_eq!(err.navigation(), Some(Route::NotFound));
        assert!(!err.is_recoverable());
    }
}
