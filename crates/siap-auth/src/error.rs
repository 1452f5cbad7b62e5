//! Access denied error.
//!
//! ```text
//! Effective access = Session(token) → Role → CapabilityTable
//!                        │                        │
//!                 Unauthenticated          CapabilityDenied
//! ```

use crate::{Capability, Resource};
use siap_types::ErrorCode;
use thiserror::Error;

/// Why an operation was refused.
///
/// ```
/// use siap_auth::{AccessDenied, Capability, Resource};
///
/// let err = AccessDenied::CapabilityDenied {
///     resource: Resource::Assets,
///     role: "LMS".to_string(),
///     required: Capability::DELETE,
///     available: Capability::VIEW,
/// };
/// assert!(err.to_string().contains("assets"));
/// assert_eq!(err.layer(), "capability");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    /// No session token; the caller should redirect to the entry page.
    #[error("not signed in")]
    Unauthenticated,

    /// The role lacks a capability on the resource.
    #[error("capability denied on {resource}: role '{role}' requires {required}, available: {available}")]
    CapabilityDenied {
        resource: Resource,
        /// Cached role text (empty when absent).
        role: String,
        required: Capability,
        available: Capability,
    },
}

impl AccessDenied {
    /// Returns the layer that refused access.
    #[must_use]
    pub fn layer(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "session",
            Self::CapabilityDenied { .. } => "capability",
        }
    }
}

impl ErrorCode for AccessDenied {
    fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "AUTH_UNAUTHENTICATED",
            Self::CapabilityDenied { .. } => "AUTH_CAPABILITY_DENIED",
        }
    }

    fn is_recoverable(&self) -> bool {
        // signing in fixes the first; the second needs a different role
        matches!(self, Self::Unauthenticated)
    }
}
