//! Error code conventions.
//!
//! Every SIAP error enum implements [`ErrorCode`] so the front end can
//! tell a transient failure (retry, or show a dismissible notice) from a
//! permanent one (permission denied, bad input).
//!
//! ```
//! use siap_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum UploadError {
//!     Offline,
//!     TooLarge { bytes: u64 },
//! }
//!
//! impl ErrorCode for UploadError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Offline => "UPLOAD_OFFLINE",
//!             Self::TooLarge { .. } => "UPLOAD_TOO_LARGE",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Offline)
//!     }
//! }
//!
//! assert_eq!(UploadError::Offline.code(), "UPLOAD_OFFLINE");
//! assert!(!UploadError::TooLarge { bytes: 1 << 30 }.is_recoverable());
//! ```

/// Machine-readable classification of an error.
///
/// # Code Format
///
/// - UPPER_SNAKE_CASE, prefixed with the owning domain
///   (`"AUTH_"`, `"STORE_"`, `"RECORD_"`, ...)
/// - Stable once published; front ends and logs match on them
///
/// # Recoverability
///
/// | Recoverable | Examples |
/// |-------------|----------|
/// | yes | I/O failure, collaborator unavailable, stale subscription |
/// | no | capability denied, unknown user, invalid field value |
pub trait ErrorCode {
    /// Returns the stable error code.
    fn code(&self) -> &'static str;

    /// Returns `true` when retrying (or user action) may succeed.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code is non-empty, prefixed and UPPER_SNAKE_CASE.
///
/// Intended for unit tests of error enums.
///
/// # Panics
///
/// Panics with a descriptive message when any check fails.
///
/// ```
/// use siap_types::{assert_error_code, ErrorCode};
///
/// struct Missing;
///
/// impl ErrorCode for Missing {
///     fn code(&self) -> &'static str { "RECORD_NOT_FOUND" }
///     fn is_recoverable(&self) -> bool { false }
/// }
///
/// assert_error_code(&Missing, "RECORD_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "Error code '{code}' must start with prefix '{expected_prefix}'"
    );
    assert!(
        is_upper_snake_case(code),
        "Error code '{code}' must be UPPER_SNAKE_CASE"
    );
}

/// Runs [`assert_error_code`] over a slice of variants.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('_')
        && !s.ends_with('_')
        && !s.contains("__")
        && s.chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum ProbeError {
        Flaky,
        Broken,
    }

    impl ErrorCode for ProbeError {
        fn code(&self) -> &'static str {
            match self {
                Self::Flaky => "PROBE_FLAKY",
                Self::Broken => "PROBE_BROKEN",
            }
        }

        fn is_recoverable(&self) -> bool {
            matches!(self, Self::Flaky)
        }
    }

    #[test]
    fn codes_and_recoverability() {
        assert_eq!(ProbeError::Flaky.code(), "PROBE_FLAKY");
        assert!(ProbeError::Flaky.is_recoverable());
        assert!(!ProbeError::Broken.is_recoverable());
    }

    #[test]
    fn all_variants_follow_convention() {
        assert_error_codes(&[ProbeError::Flaky, ProbeError::Broken], "PROBE_");
    }

    #[test]
    #[should_panic(expected = "must start with prefix")]
    fn wrong_prefix_panics() {
        assert_error_code(&ProbeError::Flaky, "STORE_");
    }

    #[test]
    fn upper_snake_case_detection() {
        assert!(is_upper_snake_case("AUTH_UNKNOWN_USER"));
        assert!(is_upper_snake_case("E2E"));
        assert!(!is_upper_snake_case(""));
        assert!(!is_upper_snake_case("auth_denied"));
        assert!(!is_upper_snake_case("_AUTH"));
        assert!(!is_upper_snake_case("AUTH_"));
        assert!(!is_upper_snake_case("AUTH__DENIED"));
    }
}
