//! Core types for SIAP.
//!
//! This crate holds the vocabulary shared by every other SIAP crate:
//! document identifiers, typed document paths and the error-code
//! conventions all error enums follow.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Foundation Layer                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  siap-types   : DocId, Uid, paths, ErrorCode  ◄── HERE      │
//! │  siap-auth    : Session, Role, Capability, gates            │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Runtime Layer                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  siap-runtime : collaborators, config, records, sign-in     │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Application / Frontend Layer                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  siap-app     : SiapApp wiring + AppError                   │
//! │  siap-cli     : `siap` binary                               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Paths
//!
//! Document locations are never built by string concatenation. A
//! [`CollectionPath`] has an odd number of segments and a [`DocPath`] an
//! even number; both validate every segment on construction.
//!
//! ```
//! use siap_types::{CollectionPath, DocId, TryNew};
//!
//! let assets = CollectionPath::parse("artifacts/Ij8HEOktiALS0zjKB3ay/assets").unwrap();
//! let doc = assets.doc(DocId::try_new("pump-7".to_string()).unwrap());
//! assert_eq!(doc.to_string(), "artifacts/Ij8HEOktiALS0zjKB3ay/assets/pump-7");
//! assert_eq!(doc.collection(), &assets);
//! ```

pub mod construct;
pub mod error;
pub mod id;
pub mod path;

pub use construct::TryNew;
pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{DocId, Uid};
pub use path::{validate_segment, CollectionPath, DocPath, PathError};
