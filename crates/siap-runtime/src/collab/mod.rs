//! External collaborators and their local implementations.
//!
//! ```text
//! ┌──────────────────────┐   ┌──────────────────┐   ┌────────────────────────┐
//! │ DocumentStore        │   │ BlobStore        │   │ IdentityProvider       │
//! │ get/list/add/put/    │   │ upload / url     │   │ sign_in / sign_out /   │
//! │ update/delete/       │   │                  │   │ auth_state             │
//! │ subscribe            │   │                  │   │                        │
//! └──────────┬───────────┘   └────────┬─────────┘   └───────────┬────────────┘
//!            │                        │                         │
//!   MemoryDocumentStore       MemoryBlobStore          LocalIdentityProvider
//!   LocalDocumentStore        LocalBlobStore           (accounts.toml)
//! ```
//!
//! The hosted services these traits stand for are opaque; the local
//! implementations keep the same observable contract so the rest of the
//! system runs against files on disk or process memory.

mod blob;
mod document;
mod identity;
mod local;
mod memory;

pub use blob::{BlobError, BlobHandle, BlobStore, LocalBlobStore, MemoryBlobStore};
pub use document::{Document, DocumentStore, Fields, StoreError, Subscription};
pub use identity::{Account, AuthUser, IdentityError, IdentityProvider, LocalIdentityProvider};
pub use local::LocalDocumentStore;
pub use memory::MemoryDocumentStore;
