//! Authorization and route-gating primitives for SIAP.
//!
//! # Permission Model
//!
//! ```text
//! Effective access = Session(token present?) → Role(who) → CapabilityTable(role, resource)
//!                          │                      │                 │
//!                   RouteGuard::check      Role::parse(mode)   AuthorizationGate
//! ```
//!
//! | Layer | Type | Decides |
//! |-------|------|---------|
//! | [`RouteGuard`] | Struct | Whether the page may initialize at all (token present) |
//! | [`Role`] + [`RoleMatch`] | Enum | Who the cached role string denotes |
//! | [`CapabilityTable`] | Table | What each role may do on each [`Resource`] |
//! | [`AuthorizationGate`] | Struct | Evaluates and audit-logs a decision |
//! | [`visible_tabs`] | Function | Which navigation tabs render |
//!
//! # Two-Phase Page Initialization
//!
//! ```text
//! page entry ──► RouteGuard::check(store) ──┬── Redirect(Route::Entry)   (no fetch happens)
//!                                           └── Proceed(Authenticated) ──► fetch(&Authenticated)
//! ```
//!
//! [`Authenticated`] can only be produced by the guard, and every record
//! operation downstream takes one by reference.
//!
//! # Example
//!
//! ```
//! use siap_auth::{
//!     AuthorizationGate, AuthorizationPolicy, Capability, GuardOutcome, MemorySessionStore, Resource, RouteGuard,
//!     SessionStore,
//! };
//!
//! let store = MemorySessionStore::new();
//! assert!(matches!(RouteGuard::check(&store), GuardOutcome::Redirect(_)));
//!
//! store.set_session("tok-1", "SPV", "spv@siap.example");
//! let GuardOutcome::Proceed(auth) = RouteGuard::check(&store) else {
//!     panic!("token is present");
//! };
//!
//! let gate = AuthorizationGate::default();
//! assert!(gate.can(auth.role(), Resource::Assets, Capability::DELETE));
//! assert!(!gate.can(auth.role(), Resource::OnCall, Capability::EDIT));
//! ```

pub mod capability;
pub mod error;
pub mod gate;
pub mod guard;
pub mod policy;
pub mod resource;
pub mod role;
pub mod session;
pub mod table;
pub mod tabs;

pub use capability::Capability;
pub use error::AccessDenied;
pub use gate::{can_mutate, AuthorizationGate};
pub use guard::{Authenticated, GuardOutcome, Route, RouteGuard};
pub use policy::AuthorizationPolicy;
pub use resource::Resource;
pub use role::{Role, RoleMatch, RoleSet};
pub use session::{MemorySessionStore, Session, SessionStore, SharedSessionStore, Theme};
pub use table::CapabilityTable;
pub use tabs::{visible_tabs, Icon, Tab, TabBar, TabView, TABS};
