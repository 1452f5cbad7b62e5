//! Identifier types.

use crate::path::{validate_segment, PathError};
use crate::TryNew;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::{uuid, Uuid};

/// Namespace for deterministic user ids derived from an email address.
const SIAP_NAMESPACE: Uuid = uuid!("6f1d5c2a-8b0e-4f7c-9a43-2d1e7c5b9f10");

/// Identifier of a single document within a collection.
///
/// A `DocId` is one path segment: non-empty, without `/`, and never
/// `.` or `..`.
///
/// # UUID Strategy
///
/// - Auto-id collections (assets, on-call, routine): [`DocId::generate`]
///   produces a random UUID v4 in simple (dash-free) form.
/// - Worker records use the worker number supplied in the form, so the
///   id comes from [`TryNew`].
///
/// ```
/// use siap_types::{DocId, TryNew};
///
/// let id = DocId::try_new("1042".to_string()).unwrap();
/// assert_eq!(id.as_str(), "1042");
///
/// assert!(DocId::try_new("a/b".to_string()).is_err());
/// assert_ne!(DocId::generate(), DocId::generate());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocId(String);

impl DocId {
    /// Generates a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryNew for DocId {
    type Error = PathError;
    type Args = String;

    fn try_new(value: String) -> Result<Self, Self::Error> {
        validate_segment(&value)?;
        Ok(Self(value))
    }
}

impl TryFrom<String> for DocId {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<DocId> for String {
    fn from(id: DocId) -> Self {
        id.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity-provider user id.
///
/// The user document for an account lives at `users/{uid}`, so a `Uid`
/// converts into a [`DocId`] via [`Uid::as_doc_id`].
///
/// ```
/// use siap_types::Uid;
///
/// let a = Uid::from_email("ops@siap.example");
/// let b = Uid::from_email("ops@siap.example");
/// assert_eq!(a, b);
/// assert_ne!(a, Uid::from_email("hse@siap.example"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uid(String);

impl Uid {
    /// Derives a deterministic uid from an email address (UUID v5).
    ///
    /// The address is lower-cased first so sign-in is not sensitive to
    /// how the user typed it.
    #[must_use]
    pub fn from_email(email: &str) -> Self {
        let normalized = email.trim().to_ascii_lowercase();
        Self(Uuid::new_v5(&SIAP_NAMESPACE, normalized.as_bytes()).simple().to_string())
    }

    /// Returns the uid as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the document id of this user's `users/{uid}` record.
    #[must_use]
    pub fn as_doc_id(&self) -> DocId {
        DocId(self.0.clone())
    }
}

impl TryNew for Uid {
    type Error = PathError;
    type Args = String;

    fn try_new(value: String) -> Result<Self, Self::Error> {
        validate_segment(&value)?;
        Ok(Self(value))
    }
}

impl TryFrom<String> for Uid {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<Uid> for String {
    fn from(uid: Uid) -> Self {
        uid.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_valid_segments() {
        let id = DocId::generate();
        assert_eq!(id.as_str().len(), 32);
        assert!(validate_segment(id.as_str()).is_ok());
    }

    #[test]
    fn doc_id_rejects_bad_segments() {
        for bad in ["", ".", "..", "x/y", "x\\y"] {
            assert!(DocId::try_new(bad.to_string()).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn doc_id_serde_validates() {
        let ok: DocId = serde_json::from_str("\"w-12\"").unwrap();
        assert_eq!(ok.as_str(), "w-12");

        let bad: Result<DocId, _> = serde_json::from_str("\"a/b\"");
        assert!(bad.is_err());
    }

    #[test]
    fn uid_from_email_ignores_case_and_whitespace() {
        assert_eq!(
            Uid::from_email("  Head@Siap.Example "),
            Uid::from_email("head@siap.example")
        );
    }

    #[test]
    fn uid_maps_to_doc_id() {
        let uid = Uid::try_new("u-1".to_string()).unwrap();
        assert_eq!(uid.as_doc_id().as_str(), "u-1");
    }
}
