//! Route guard and navigation targets.

use crate::{AccessDenied, Resource, Session, SessionStore};
use siap_types::DocId;
use std::fmt;
use tracing::debug;

/// A navigation target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// The public entry page (`/`), where unauthenticated sessions land.
    Entry,
    /// List page of a resource (`/assets`, `/dashboard`, ...).
    List(Resource),
    /// Detail page (`/assets/{id}`).
    Detail(Resource, DocId),
    /// Add form (`/assets/add`).
    Add(Resource),
    /// Edit form (`/assets/{id}/edit`).
    Edit(Resource, DocId),
    /// Shown when a document does not exist.
    NotFound,
}

impl Route {
    /// Returns the URL path of the route.
    ///
    /// ```
    /// use siap_auth::{Resource, Route};
    /// use siap_types::{DocId, TryNew};
    ///
    /// let id = DocId::try_new("17".to_string()).unwrap();
    /// assert_eq!(Route::Entry.path(), "/");
    /// assert_eq!(Route::Edit(Resource::Workers, id).path(), "/worker/17/edit");
    /// assert_eq!(Route::Add(Resource::Users).path(), "/management/user/add");
    /// ```
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Entry => "/".to_string(),
            Self::List(r) => r.href().to_string(),
            Self::Detail(r, id) => format!("{}/{id}", r.href()),
            Self::Add(r) => format!("{}/add", r.href()),
            Self::Edit(r, id) => format!("{}/{id}/edit", r.href()),
            Self::NotFound => "/not-found".to_string(),
        }
    }

    /// The resource whose capability row gates this route, if any.
    #[must_use]
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Self::List(r) | Self::Detail(r, _) | Self::Add(r) | Self::Edit(r, _) => Some(*r),
            Self::Entry | Self::NotFound => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Proof that the route guard passed.
///
/// Only [`RouteGuard`] constructs this value. Data-fetching code takes
/// `&Authenticated`, so a fetch cannot be started for a session that
/// would have been redirected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    session: Session,
}

impl Authenticated {
    /// Cached role at guard time.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.session.role()
    }

    /// Email at guard time.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.session.email()
    }

    /// Full session snapshot taken by the guard.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }
}

/// Result of the first initialization phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Token present; continue into the fetch phase.
    Proceed(Authenticated),
    /// No token; navigate here and do nothing else.
    Redirect(Route),
}

impl GuardOutcome {
    /// Converts into a `Result`, mapping a redirect to [`AccessDenied::Unauthenticated`].
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied::Unauthenticated`] for [`GuardOutcome::Redirect`].
    pub fn into_result(self) -> Result<Authenticated, AccessDenied> {
        match self {
            Self::Proceed(auth) => Ok(auth),
            Self::Redirect(_) => Err(AccessDenied::Unauthenticated),
        }
    }

    #[must_use]
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }
}

/// Synchronous session check run before any page data is requested.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

impl RouteGuard {
    /// Redirects to [`Route::Entry`] iff the store has no token at call time.
    #[must_use]
    pub fn check(store: &dyn SessionStore) -> GuardOutcome {
        let session = store.snapshot();
        if session.has_token() {
            GuardOutcome::Proceed(Authenticated { session })
        } else {
            debug!(to = %Route::Entry, "no session token, redirecting");
            GuardOutcome::Redirect(Route::Entry)
        }
    }

    /// Shorthand for `check(store).into_result()`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied::Unauthenticated`] when there is no token.
    pub fn require(store: &dyn SessionStore) -> Result<Authenticated, AccessDenied> {
        Self::check(store).into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySessionStore;
    use siap_types::TryNew;

    #[test]
    fn redirects_without_token() {
        let store = MemorySessionStore::new();
        assert_eq!(
            RouteGuard::check(&store),
            GuardOutcome::Redirect(Route::Entry)
        );
    }

    #[test]
    fn redirects_iff_no_token() {
        let store = MemorySessionStore::new();
        for (token, expect_redirect) in [("", true), ("tok", false)] {
            store.set_session(token, "Head", "h@x");
            assert_eq!(RouteGuard::check(&store).is_redirect(), expect_redirect);
            assert_eq!(store.has_token(), !expect_redirect);
        }
        store.clear_session();
        assert!(RouteGuard::check(&store).is_redirect());
    }

    #[test]
    fn proceed_carries_session_snapshot() {
        let store = MemorySessionStore::new();
        store.set_session("tok", "Maintainer", "m@siap.example");

        let auth = RouteGuard::require(&store).unwrap();
        store.clear_session();

        assert_eq!(auth.role(), Some("Maintainer"));
        assert_eq!(auth.email(), Some("m@siap.example"));
    }

    #[test]
    fn require_maps_redirect_to_unauthenticated() {
        let store = MemorySessionStore::new();
        assert_eq!(
            RouteGuard::require(&store).unwrap_err(),
            AccessDenied::Unauthenticated
        );
    }

    #[test]
    fn route_paths() {
        let id = DocId::try_new("a1".into()).unwrap();
        assert_eq!(Route::List(Resource::Dashboard).path(), "/dashboard");
        assert_eq!(Route::Detail(Resource::OnCall, id.clone()).path(), "/oncall/a1");
        assert_eq!(Route::Edit(Resource::Assets, id).resource(), Some(Resource::Assets));
        assert_eq!(Route::Entry.resource(), None);
    }
}
