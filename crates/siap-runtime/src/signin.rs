//! Sign-in, sign-out and profile.
//!
//! ```text
//! sign_in(email, password)
//!   │
//!   ├─ IdentityProvider::sign_in ─────────── bad credentials → AuthError::Identity
//!   ├─ DocumentStore::get(users/{uid}) ───── missing → sign out, clear, AuthError::UnknownUser
//!   └─ SessionStore::set_session(token, role or "USER", email)
//! ```

use crate::collab::{AuthUser, DocumentStore, IdentityError, IdentityProvider, StoreError};
use serde::Serialize;
use siap_auth::{Authenticated, Session, SessionStore, SharedSessionStore};
use siap_types::{CollectionPath, ErrorCode, Uid};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Collection holding one profile document per signed-up user.
pub const USERS_COLLECTION: &str = "users";

/// Role cached when the user document has none.
pub const DEFAULT_ROLE: &str = "USER";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Identity accepted the credentials but there is no user document.
    #[error("no user profile for uid {uid}")]
    UnknownUser { uid: Uid },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ErrorCode for AuthError {
    fn code(&self) -> &'static str {
        match self {
            Self::Identity(e) => e.code(),
            Self::UnknownUser { .. } => "SIGNIN_UNKNOWN_USER",
            Self::Store(e) => e.code(),
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Identity(e) => e.is_recoverable(),
            Self::UnknownUser { .. } => false,
            Self::Store(e) => e.is_recoverable(),
        }
    }
}

/// What the profile page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub email: String,
    pub role: String,
}

/// Keeps the session store in step with the identity collaborator.
pub struct AuthService<D, I> {
    docs: D,
    identity: I,
    session: SharedSessionStore,
}

impl<D: DocumentStore, I: IdentityProvider> AuthService<D, I> {
    pub fn new(docs: D, identity: I, session: SharedSessionStore) -> Self {
        Self {
            docs,
            identity,
            session,
        }
    }

    #[must_use]
    pub fn identity(&self) -> &I {
        &self.identity
    }

    #[must_use]
    pub fn session(&self) -> &SharedSessionStore {
        &self.session
    }

    /// Signs in and caches token, role and email.
    ///
    /// # Errors
    ///
    /// [`AuthError::Identity`] for rejected credentials (the session is
    /// left as it was), [`AuthError::UnknownUser`] when no user document
    /// exists (the session is cleared).
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let user = self.identity.sign_in(email, password).await?;
        self.establish(&user).await
    }

    /// Signs out of the identity collaborator and clears the session.
    /// Calling it while signed out succeeds.
    ///
    /// # Errors
    ///
    /// Returns the identity collaborator's error; the session is cleared regardless.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let result = self.identity.sign_out().await;
        self.session.clear_session();
        info!("signed out");
        Ok(result?)
    }

    /// Applies an auth-state change to the session store.
    ///
    /// # Errors
    ///
    /// Same as [`sign_in`](Self::sign_in) for `Some`.
    pub async fn sync(&self, user: Option<&AuthUser>) -> Result<Option<Session>, AuthError> {
        match user {
            Some(user) => self.establish(user).await.map(Some),
            None => {
                self.session.clear_session();
                debug!("auth state cleared");
                Ok(None)
            }
        }
    }

    /// Follows [`IdentityProvider::auth_state`] until the provider goes away.
    pub fn spawn_auth_sync(self: Arc<Self>) -> JoinHandle<()> {
        let mut state = self.identity.auth_state();
        tokio::spawn(async move {
            while state.changed().await.is_ok() {
                let user = state.borrow_and_update().clone();
                if let Err(e) = self.sync(user.as_ref()).await {
                    warn!(error = %e, "auth state sync failed");
                }
            }
        })
    }

    /// Email and role from the guard's session snapshot.
    #[must_use]
    pub fn profile(&self, who: &Authenticated) -> Profile {
        let or_na = |v: Option<&str>| {
            v.filter(|s| !s.is_empty())
                .map_or_else(|| "N/A".to_string(), str::to_string)
        };
        Profile {
            email: or_na(who.email()),
            role: or_na(who.role()),
        }
    }

    async fn establish(&self, user: &AuthUser) -> Result<Session, AuthError> {
        let users = CollectionPath::parse(USERS_COLLECTION).map_err(StoreError::from)?;
        let Some(doc) = self.docs.get(&users.doc(user.uid.as_doc_id())).await? else {
            warn!(uid = %user.uid, "signed in without a user profile, signing out");
            if let Err(e) = self.identity.sign_out().await {
                warn!(error = %e, "identity sign-out failed");
            }
            self.session.clear_session();
            return Err(AuthError::UnknownUser {
                uid: user.uid.clone(),
            });
        };

        let role = doc
            .str_field("role")
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_ROLE);
        self.session.set_session(&user.token, role, &user.email);
        info!(uid = %user.uid, role, "signed in");
        Ok(self.session.snapshot())
    }
}
