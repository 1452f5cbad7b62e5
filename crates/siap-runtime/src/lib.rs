//! SIAP Runtime - collaborators, configuration and services.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Core Layer                               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  siap-types : DocId, Uid, CollectionPath, ErrorCode         │
//! │  siap-auth  : Session, RouteGuard, AuthorizationGate, tabs  │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Runtime Layer (THIS CRATE)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  collab/  : DocumentStore, BlobStore, IdentityProvider      │
//! │  config/  : SiapConfig, ConfigLoader, ConfigResolver        │
//! │  session/ : FileSessionStore                                │
//! │  records/ : Schema, RecordService                           │
//! │  signin   : AuthService, Profile                            │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Application Layer                          │
//! │  (siap-app: SiapApp wiring + AppError)                      │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Frontend Layer                             │
//! │  (siap-cli)                                                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! ## [`collab`] - External Collaborators
//!
//! - [`DocumentStore`](collab::DocumentStore): documents and live subscriptions
//! - [`BlobStore`](collab::BlobStore): file uploads and download URLs
//! - [`IdentityProvider`](collab::IdentityProvider): email/password sign-in
//!
//! ## [`records`] - Record Pages
//!
//! One [`RecordService`](records::RecordService) driven by a static
//! [`Schema`](records::Schema) per resource. Every operation takes the
//! route guard's [`Authenticated`](siap_auth::Authenticated) witness and
//! checks the caller's capability before any collaborator call.
//!
//! ## [`signin`] - Sign-In Flow
//!
//! [`AuthService`](signin::AuthService) caches the token, the role read
//! from `users/{uid}` and the email in the injected session store.

pub mod collab;
pub mod config;
pub mod records;
pub mod session;
pub mod signin;

pub use collab::{
    BlobStore, DocumentStore, IdentityProvider, LocalBlobStore, LocalDocumentStore,
    LocalIdentityProvider, MemoryBlobStore, MemoryDocumentStore, Subscription,
};
pub use config::{ConfigError, ConfigLoader, ConfigResolver, SiapConfig};
pub use records::{RecordError, RecordInput, RecordOutcome, RecordService, Schema};
pub use session::FileSessionStore;
pub use signin::{AuthError, AuthService, Profile};
