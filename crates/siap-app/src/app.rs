//! Application wiring.
//!
//! ```text
//! ConfigResolver ──► SiapConfig
//!                      │
//!      ┌───────────────┼──────────────────┬─────────────────────┐
//!      ▼               ▼                  ▼                     ▼
//! FileSessionStore  LocalDocumentStore  LocalBlobStore   LocalIdentityProvider
//!      │               │   │              │                     │
//!      │               │   └──────┬───────┘                     │
//!      │               │          ▼                             │
//!      │               │   RecordService ◄── AuthorizationGate(role_match)
//!      │               └──────────┬─────────────────────────────┘
//!      │                          ▼
//!      └────────────────────► AuthService
//! ```

use crate::AppError;
use serde_json::Value;
use siap_auth::{
    AuthorizationGate, GuardOutcome, Role, RoleMatch, RouteGuard, SessionStore, SharedSessionStore,
    TabBar, TabView, Theme,
};
use siap_runtime::collab::{
    DocumentStore, Fields, LocalBlobStore, LocalDocumentStore, LocalIdentityProvider, StoreError,
};
use siap_runtime::config::{ConfigResolver, SiapConfig};
use siap_runtime::records::RecordService;
use siap_runtime::session::FileSessionStore;
use siap_runtime::signin::{AuthService, USERS_COLLECTION};
use siap_types::{CollectionPath, Uid};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Record service over the local collaborators.
pub type LocalRecords = RecordService<LocalDocumentStore, LocalBlobStore>;

/// Sign-in service over the local collaborators.
pub type LocalAuth = AuthService<LocalDocumentStore, LocalIdentityProvider>;

/// A configured SIAP instance.
///
/// Holds the single session store of the process and hands it to every
/// service.
pub struct SiapApp {
    config: SiapConfig,
    session: SharedSessionStore,
    gate: Arc<AuthorizationGate>,
    docs: LocalDocumentStore,
    identity: LocalIdentityProvider,
    records: LocalRecords,
    auth: Arc<LocalAuth>,
}

impl SiapApp {
    /// Creates a builder that resolves configuration through `resolver`.
    #[must_use]
    pub fn builder<R: ConfigResolver>(resolver: R) -> SiapAppBuilder<R> {
        SiapAppBuilder {
            resolver,
            session: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SiapConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &SharedSessionStore {
        &self.session
    }

    #[must_use]
    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    #[must_use]
    pub fn records(&self) -> &LocalRecords {
        &self.records
    }

    #[must_use]
    pub fn auth(&self) -> &Arc<LocalAuth> {
        &self.auth
    }

    /// First phase of every gated page.
    #[must_use]
    pub fn guard(&self) -> GuardOutcome {
        RouteGuard::check(self.session.as_ref())
    }

    /// Tab bar for the page at `active_path`; empty when signed out.
    #[must_use]
    pub fn tabs(&self, active_path: &str) -> Vec<TabView> {
        TabBar::render(self.session.as_ref(), active_path)
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.session.theme()
    }

    pub fn set_theme(&self, theme: Theme) {
        self.session.set_theme(theme);
        debug!(%theme, "theme set");
    }

    /// Creates a local identity account and its `users/{uid}` profile.
    ///
    /// This is an operator bootstrap path: it writes the profile
    /// directly, outside the record service and its capability checks.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Identity`] for a duplicate or invalid email and
    /// [`AppError::Store`] if the profile cannot be written.
    pub async fn register_account(
        &self,
        email: &str,
        password: &str,
        username: &str,
        role: &str,
    ) -> Result<Uid, AppError> {
        if !Role::parse(role, RoleMatch::Exact).is_some_and(|r| r.is_known()) {
            warn!(role, "registering account with a role that grants nothing");
        }

        let uid = self.identity.add_account(email, password).await?;
        let mut fields = Fields::new();
        fields.insert("username".into(), Value::from(username));
        fields.insert("email".into(), Value::from(email.trim().to_lowercase()));
        fields.insert("role".into(), Value::from(role));

        let users = CollectionPath::parse(USERS_COLLECTION).map_err(StoreError::from)?;
        self.docs.put(&users.doc(uid.as_doc_id()), fields).await?;
        info!(uid = %uid, role, "account registered");
        Ok(uid)
    }
}

/// Builder for [`SiapApp`].
pub struct SiapAppBuilder<R> {
    resolver: R,
    session: Option<SharedSessionStore>,
}

impl<R: ConfigResolver> SiapAppBuilder<R> {
    /// Uses `store` instead of the configured session file.
    #[must_use]
    pub fn with_session_store(mut self, store: SharedSessionStore) -> Self {
        self.session = Some(store);
        self
    }

    /// Resolves configuration and opens every collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] if configuration cannot be resolved or a
    /// collaborator cannot open its storage.
    pub fn build(self) -> Result<SiapApp, AppError> {
        let config = self.resolver.resolve()?;
        let backend = &config.backend;

        let session = self.session.unwrap_or_else(|| {
            Arc::new(FileSessionStore::open(
                config.paths.session_file_or_default(),
                config.ui.theme,
            ))
        });

        let docs = LocalDocumentStore::new(backend.data_dir_or_default())?
            .with_poll_interval(Duration::from_millis(backend.watch_poll_ms));
        let blobs = LocalBlobStore::new(backend.blob_dir_or_default())?;
        let identity = LocalIdentityProvider::open(backend.accounts_file_or_default())?;
        let gate = Arc::new(AuthorizationGate::with_mode(config.auth.role_match));

        let records = RecordService::new(docs.clone(), blobs, Arc::clone(&gate), backend.app_id.clone());
        let auth = Arc::new(AuthService::new(
            docs.clone(),
            identity.clone(),
            Arc::clone(&session),
        ));

        info!(
            data_dir = %docs.base_path().display(),
            role_match = %config.auth.role_match,
            "application initialized"
        );

        Ok(SiapApp {
            config,
            session,
            gate,
            docs,
            identity,
            records,
            auth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siap_auth::MemorySessionStore;
    use siap_runtime::records::{RecordInput, WORKERS};
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> SiapConfig {
        let mut config = SiapConfig::default();
        config.backend.data_dir = Some(dir.path().join("data"));
        config.backend.blob_dir = Some(dir.path().join("blobs"));
        config.backend.accounts_file = Some(dir.path().join("accounts.toml"));
        config.paths.session_file = Some(dir.path().join("session.json"));
        config
    }

    #[tokio::test]
    async fn register_sign_in_and_create() {
        let dir = TempDir::new().unwrap();
        let app = SiapApp::builder(config_in(&dir)).build().unwrap();

        assert!(app.guard().is_redirect());
        assert!(app.tabs("/dashboard").is_empty());

        app.register_account("spv@plant.example", "pw", "spv", "SPV")
            .await
            .unwrap();
        app.auth().sign_in("spv@plant.example", "pw").await.unwrap();

        let GuardOutcome::Proceed(who) = app.guard() else {
            panic!("signed in");
        };
        let labels: Vec<&str> = app.tabs("/worker").iter().map(|t| t.label).collect();
        assert_eq!(labels, ["Home", "Workers", "Assets", "Profile"]);

        let input = RecordInput::new().set("id", "7").set("name", "Sari");
        app.records().create(&who, &WORKERS, input).await.unwrap();
        assert_eq!(app.records().list(&who, &WORKERS).await.unwrap().len(), 1);
        assert!(dir.path().join("data/artifacts").exists());
        assert_eq!(app.gate().mode(), RoleMatch::Exact);
    }

    #[tokio::test]
    async fn session_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        {
            let app = SiapApp::builder(config_in(&dir)).build().unwrap();
            app.register_account("head@plant.example", "pw", "head", "Head")
                .await
                .unwrap();
            app.auth().sign_in("head@plant.example", "pw").await.unwrap();
            app.set_theme(Theme::Dark);
        }

        let app = SiapApp::builder(config_in(&dir)).build().unwrap();
        assert!(!app.guard().is_redirect());
        assert_eq!(app.session().role().as_deref(), Some("Head"));
        assert_eq!(app.theme(), Theme::Dark);
    }

    #[test]
    fn injected_session_store_is_used() {
        let dir = TempDir::new().unwrap();
        let store: SharedSessionStore = Arc::new(MemorySessionStore::new());
        store.set_session("tok", "USER", "u@plant.example");

        let app = SiapApp::builder(config_in(&dir))
            .with_session_store(Arc::clone(&store))
            .build()
            .unwrap();
        let labels: Vec<&str> = app.tabs("/").iter().map(|t| t.label).collect();
        assert_eq!(labels, ["Home", "Profile"]);
        assert!(!dir.path().join("session.json").exists());
    }
}
