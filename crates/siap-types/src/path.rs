//! Typed document paths.
//!
//! ```text
//! users                                   CollectionPath (1 segment)
//! users/3f2a…                             DocPath        (2 segments)
//! artifacts/Ij8HEOktiALS0zjKB3ay/assets   CollectionPath (3 segments)
//! artifacts/Ij8HEOktiALS0zjKB3ay/assets/x DocPath        (4 segments)
//! ```

use crate::{DocId, ErrorCode, TryNew};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Rejected path or path segment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path had no segments at all.
    #[error("path is empty")]
    Empty,

    /// A segment is empty, `.`/`..`, or contains a separator.
    #[error("invalid path segment '{segment}': {reason}")]
    InvalidSegment {
        segment: String,
        reason: &'static str,
    },

    /// Collection paths need an odd segment count, document paths an even one.
    #[error("'{path}' is not a {expected} path")]
    WrongKind { path: String, expected: &'static str },
}

impl PathError {
    fn invalid(segment: &str, reason: &'static str) -> Self {
        Self::InvalidSegment {
            segment: segment.to_string(),
            reason,
        }
    }
}

impl ErrorCode for PathError {
    fn code(&self) -> &'static str {
        match self {
            Self::Empty => "PATH_EMPTY",
            Self::InvalidSegment { .. } => "PATH_INVALID_SEGMENT",
            Self::WrongKind { .. } => "PATH_WRONG_KIND",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// Checks one path segment: non-empty, not `.`/`..`, no separators.
///
/// # Errors
///
/// Returns [`PathError::InvalidSegment`] describing the problem.
pub fn validate_segment(segment: &str) -> Result<(), PathError> {
    if segment.is_empty() {
        return Err(PathError::invalid(segment, "empty"));
    }
    if segment == "." || segment == ".." {
        return Err(PathError::invalid(segment, "relative segment"));
    }
    if segment.contains(['/', '\\', '\0']) {
        return Err(PathError::invalid(segment, "contains a separator"));
    }
    Ok(())
}

fn split(path: &str) -> Result<Vec<String>, PathError> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Err(PathError::Empty);
    }
    trimmed
        .split('/')
        .map(|s| validate_segment(s).map(|()| s.to_string()))
        .collect()
}

/// Location of a collection of documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionPath {
    segments: Vec<String>,
}

impl CollectionPath {
    /// Parses `a/b/c` style text.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] for invalid segments or an even segment count.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let segments = split(path)?;
        if segments.len() % 2 == 0 {
            return Err(PathError::WrongKind {
                path: path.to_string(),
                expected: "collection",
            });
        }
        Ok(Self { segments })
    }

    /// Returns the document path for `id` inside this collection.
    #[must_use]
    pub fn doc(&self, id: DocId) -> DocPath {
        DocPath {
            collection: self.clone(),
            id,
        }
    }

    /// Returns the collection name (last segment).
    #[must_use]
    pub fn name(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// Returns all segments in order.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl TryNew for CollectionPath {
    type Error = PathError;
    type Args = Vec<String>;

    fn try_new(segments: Vec<String>) -> Result<Self, Self::Error> {
        Self::parse(&segments.join("/"))
    }
}

impl TryFrom<String> for CollectionPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CollectionPath> for String {
    fn from(path: CollectionPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Location of a single document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocPath {
    collection: CollectionPath,
    id: DocId,
}

impl DocPath {
    /// Parses `collection/.../id` text.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] for invalid segments or an odd segment count.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let mut segments = split(path)?;
        if segments.len() % 2 != 0 {
            return Err(PathError::WrongKind {
                path: path.to_string(),
                expected: "document",
            });
        }
        let id = segments.pop().map(DocId::try_new).ok_or(PathError::Empty)??;
        Ok(Self {
            collection: CollectionPath { segments },
            id,
        })
    }

    /// Returns the enclosing collection.
    #[must_use]
    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    /// Returns the document id.
    #[must_use]
    pub fn id(&self) -> &DocId {
        &self.id
    }
}

impl TryFrom<String> for DocPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DocPath> for String {
    fn from(path: DocPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_error_codes;

    #[test]
    fn collection_parse_accepts_odd_depth() {
        let root = CollectionPath::parse("users").unwrap();
        assert_eq!(root.name(), "users");

        let scoped = CollectionPath::parse("/artifacts/app/oncall/").unwrap();
        assert_eq!(scoped.segments().len(), 3);
        assert_eq!(scoped.to_string(), "artifacts/app/oncall");
    }

    #[test]
    fn collection_parse_rejects_document_depth() {
        let err = CollectionPath::parse("users/u1").unwrap_err();
        assert!(matches!(err, PathError::WrongKind { expected: "collection", .. }));
    }

    #[test]
    fn doc_parse_splits_collection_and_id() {
        let doc = DocPath::parse("artifacts/app/routine/r-9").unwrap();
        assert_eq!(doc.id().as_str(), "r-9");
        assert_eq!(doc.collection().name(), "routine");
    }

    #[test]
    fn doc_parse_rejects_collection_depth() {
        assert!(DocPath::parse("artifacts/app/routine").is_err());
        assert_eq!(DocPath::parse("").unwrap_err(), PathError::Empty);
    }

    #[test]
    fn rejects_relative_segments() {
        let err = CollectionPath::parse("artifacts/../users").unwrap_err();
        assert_eq!(err.code(), "PATH_INVALID_SEGMENT");
    }

    #[test]
    fn try_new_from_segments() {
        let path =
            CollectionPath::try_new(vec!["artifacts".into(), "app".into(), "assets".into()])
                .unwrap();
        assert_eq!(path.name(), "assets");
    }

    #[test]
    fn serde_uses_string_form() {
        let doc = DocPath::parse("users/u1").unwrap();
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, "\"users/u1\"");
        let back: DocPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn error_codes_follow_convention() {
        assert_error_codes(
            &[
                PathError::Empty,
                PathError::invalid("", "empty"),
                PathError::WrongKind {
                    path: "x".into(),
                    expected: "document",
                },
            ],
            "PATH_",
        );
    }
}
