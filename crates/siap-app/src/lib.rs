//! SIAP Application Layer.
//!
//! This crate provides:
//!
//! - **SiapApp**: one instance wiring configuration, the session store,
//!   the collaborators and the services together
//! - **Re-exports**: convenient access to the lower crates
//! - **AppError**: unified application-level error type
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Core Layer                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  siap-types, siap-auth                                      │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Runtime Layer                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  siap-runtime (collab, config, records, signin)             │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Application Layer  ◄── HERE                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  siap-app (SiapApp + re-exports + AppError)                 │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Frontend Layer                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  siap-cli (uses AppError → anyhow/eprintln)                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Error Handling Strategy
//!
//! ```text
//! Internal Errors (RecordError, AuthError, ConfigError, ...)
//!                    ↓ From impl
//!               AppError (this crate)
//!                    ↓ anyhow::Error / eprintln
//!               CLI output
//! ```

mod app;
mod error;

pub use app::{LocalAuth, LocalRecords, SiapApp, SiapAppBuilder};
pub use error::AppError;

pub use siap_auth::{
    AccessDenied, AuthorizationGate, AuthorizationPolicy, Authenticated, Capability,
    CapabilityTable, GuardOutcome, Resource, Role, RoleMatch, Route, RouteGuard, Session,
    SessionStore, SharedSessionStore, TabBar, TabView, Theme,
};
pub use siap_runtime::config::{
    default_config_dir, ConfigError, ConfigLoader, ConfigResolver, SiapConfig,
};
pub use siap_runtime::records::{
    Notice, NoticeLevel, Record, RecordError, RecordInput, RecordOutcome, Schema,
};
pub use siap_runtime::signin::{AuthError, Profile};
pub use siap_runtime::{IdentityProvider, Subscription};
pub use siap_types::{DocId, ErrorCode, Uid};
