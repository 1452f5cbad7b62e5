//! Identity collaborator: email/password sign-in and auth-state changes.

use crate::config::expand_tilde;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use siap_types::{ErrorCode, Uid};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info};

/// Errors from an [`IdentityProvider`].
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Unknown email or wrong password. Which one is not disclosed.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("invalid email address: '{0}'")]
    InvalidEmail(String),

    #[error("an account for '{0}' already exists")]
    AccountExists(String),

    #[error("accounts file I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse accounts file '{path}': {source}")]
    ParseAccounts {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize accounts: {0}")]
    SerializeAccounts(#[from] toml::ser::Error),
}

impl IdentityError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl ErrorCode for IdentityError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "IDENTITY_INVALID_CREDENTIALS",
            Self::InvalidEmail(_) => "IDENTITY_INVALID_EMAIL",
            Self::AccountExists(_) => "IDENTITY_ACCOUNT_EXISTS",
            Self::Io { .. } => "IDENTITY_IO",
            Self::ParseAccounts { .. } => "IDENTITY_PARSE_ACCOUNTS",
            Self::SerializeAccounts(_) => "IDENTITY_SERIALIZE_ACCOUNTS",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials | Self::InvalidEmail(_) | Self::Io { .. }
        )
    }
}

/// A signed-in user as reported by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: Uid,
    pub email: String,
    /// Opaque session token, fresh on every sign-in.
    pub token: String,
}

/// Identity collaborator.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Verifies credentials and makes the user current.
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthUser, IdentityError>> + Send;

    /// Clears the current user. Signing out twice succeeds.
    fn sign_out(&self) -> impl Future<Output = Result<(), IdentityError>> + Send;

    fn current_user(&self) -> Option<AuthUser>;

    /// Receiver of auth-state changes, starting at the current state.
    fn auth_state(&self) -> watch::Receiver<Option<AuthUser>>;
}

/// One stored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub email: String,
    pub uid: Uid,
    /// Hex SHA-256 of `"<lowercased email>:<password>"`.
    pub password_sha256: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountsFile {
    #[serde(default, rename = "account")]
    accounts: Vec<Account>,
}

/// Identity provider backed by an accounts file.
///
/// ```toml
/// [[account]]
/// email = "head@plant.example"
/// uid = "0c6f…"
/// password_sha256 = "5e88…"
/// ```
#[derive(Debug, Clone)]
pub struct LocalIdentityProvider {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    accounts_file: Option<PathBuf>,
    accounts: RwLock<Vec<Account>>,
    /// Serializes account writes from the duplicate check to the file save.
    write_lock: Mutex<()>,
    state: watch::Sender<Option<AuthUser>>,
}

impl LocalIdentityProvider {
    /// Provider with no backing file.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_accounts(None, Vec::new())
    }

    /// Loads accounts from `path`. A missing file means no accounts yet.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IdentityError> {
        let path = expand_tilde(path.as_ref());
        let accounts = match std::fs::read_to_string(&path) {
            Ok(content) => {
                toml::from_str::<AccountsFile>(&content)
                    .map_err(|source| IdentityError::ParseAccounts {
                        path: path.clone(),
                        source,
                    })?
                    .accounts
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(IdentityError::io(&path, e)),
        };
        debug!(path = %path.display(), count = accounts.len(), "accounts loaded");
        Ok(Self::with_accounts(Some(path), accounts))
    }

    fn with_accounts(accounts_file: Option<PathBuf>, accounts: Vec<Account>) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                accounts_file,
                accounts: RwLock::new(accounts),
                write_lock: Mutex::new(()),
                state,
            }),
        }
    }

    /// Digest stored for an email/password pair.
    #[must_use]
    pub fn password_digest(email: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(normalize_email(email).as_bytes());
        hasher.update(b":");
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Registers an account and saves the accounts file.
    ///
    /// The uid is derived from the email.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::AccountExists`] for a duplicate email, or
    /// an I/O error if the file cannot be written.
    pub async fn add_account(&self, email: &str, password: &str) -> Result<Uid, IdentityError> {
        let email = validate_email(email)?;
        let account = Account {
            uid: Uid::from_email(&email),
            password_sha256: Self::password_digest(&email, password),
            email,
        };
        let uid = account.uid.clone();

        let _writing = self.inner.write_lock.lock().await;
        let mut snapshot = self.inner.accounts.read().clone();
        if snapshot.iter().any(|a| a.email == account.email) {
            return Err(IdentityError::AccountExists(account.email));
        }
        snapshot.push(account.clone());
        self.save(snapshot).await?;
        self.inner.accounts.write().push(account);

        info!(uid = %uid, "account registered");
        Ok(uid)
    }

    /// Registered accounts.
    #[must_use]
    pub fn accounts(&self) -> Vec<Account> {
        self.inner.accounts.read().clone()
    }

    async fn save(&self, accounts: Vec<Account>) -> Result<(), IdentityError> {
        let Some(path) = &self.inner.accounts_file else {
            return Ok(());
        };
        let content = toml::to_string_pretty(&AccountsFile { accounts })?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| IdentityError::io(parent, e))?;
        }
        let temp = path.with_extension("toml.tmp");
        tokio::fs::write(&temp, content)
            .await
            .map_err(|e| IdentityError::io(&temp, e))?;
        tokio::fs::rename(&temp, path)
            .await
            .map_err(|e| IdentityError::io(path, e))
    }
}

impl IdentityProvider for LocalIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, IdentityError> {
        let email = normalize_email(email);
        let digest = Self::password_digest(&email, password);

        let uid = {
            let accounts = self.inner.accounts.read();
            accounts
                .iter()
                .find(|a| a.email == email && a.password_sha256 == digest)
                .map(|a| a.uid.clone())
        }
        .ok_or(IdentityError::InvalidCredentials)?;

        let user = AuthUser {
            uid,
            email,
            token: uuid::Uuid::new_v4().to_string(),
        };
        self.inner.state.send_replace(Some(user.clone()));
        debug!(uid = %user.uid, "identity signed in");
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        if self.inner.state.send_replace(None).is_some() {
            debug!("identity signed out");
        }
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.inner.state.borrow().clone()
    }

    fn auth_state(&self) -> watch::Receiver<Option<AuthUser>> {
        self.inner.state.subscribe()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<String, IdentityError> {
    let normalized = normalize_email(email);
    match normalized.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(normalized)
        }
        _ => Err(IdentityError::InvalidEmail(email.to_string())),
    }
}
