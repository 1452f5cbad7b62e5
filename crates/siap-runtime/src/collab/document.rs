//! Document collaborator contract.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use siap_types::{CollectionPath, DocId, DocPath, ErrorCode, PathError};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio::time::Interval;
use tracing::{debug, warn};

/// Field map of a document.
pub type Fields = serde_json::Map<String, Value>;

/// A document and its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub fields: Fields,
}

impl Document {
    #[must_use]
    pub fn new(id: DocId, fields: Fields) -> Self {
        Self { id, fields }
    }

    /// Returns a string field, if present and a string.
    #[must_use]
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// Errors from a [`DocumentStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// `update` targeted a document that does not exist.
    #[error("document not found: {0}")]
    NotFound(DocPath),

    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored bytes are not a JSON object.
    #[error("malformed document '{path}': {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    InvalidPath(#[from] PathError),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Malformed {
            path: path.into(),
            source,
        }
    }
}

impl ErrorCode for StoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "STORE_NOT_FOUND",
            Self::Io { .. } => "STORE_IO",
            Self::Malformed { .. } => "STORE_MALFORMED",
            Self::InvalidPath(_) => "STORE_INVALID_PATH",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

/// Document collaborator.
///
/// Implementations are cheap handles (`Clone`), shared across tasks.
/// Every write publishes the written path on [`changes`](Self::changes),
/// which [`subscribe`](Self::subscribe) builds live views on.
pub trait DocumentStore: Clone + Send + Sync + 'static {
    /// Reads one document; `Ok(None)` when it does not exist.
    fn get(&self, path: &DocPath)
        -> impl Future<Output = Result<Option<Document>, StoreError>> + Send;

    /// Lists a collection, sorted by document id.
    fn list(
        &self,
        collection: &CollectionPath,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Creates or overwrites a document.
    fn put(&self, path: &DocPath, fields: Fields)
        -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Merges `partial` into an existing document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the document does not exist.
    fn update(
        &self,
        path: &DocPath,
        partial: Fields,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Deletes a document. Deleting a missing document succeeds.
    fn delete(&self, path: &DocPath) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Receiver of paths written after this call.
    fn changes(&self) -> broadcast::Receiver<DocPath>;

    /// Re-read interval for changes made outside this process, if any.
    fn poll_interval(&self) -> Option<Duration> {
        None
    }

    /// Creates a document with a generated id.
    fn add(
        &self,
        collection: &CollectionPath,
        fields: Fields,
    ) -> impl Future<Output = Result<DocId, StoreError>> + Send {
        let id = DocId::generate();
        let path = collection.doc(id.clone());
        async move {
            self.put(&path, fields).await?;
            Ok(id)
        }
    }

    /// Opens a live view of one document.
    ///
    /// `on_change` is called once with the current value before this
    /// returns, then after every change. Read failures after the first
    /// go to `on_error`. The view stays open until the returned
    /// [`Subscription`] is dropped or cancelled.
    ///
    /// # Errors
    ///
    /// Returns the error of the initial read.
    fn subscribe<F, E>(
        &self,
        path: &DocPath,
        on_change: F,
        on_error: E,
    ) -> impl Future<Output = Result<Subscription, StoreError>> + Send
    where
        F: Fn(Option<Document>) + Send + Sync + 'static,
        E: Fn(StoreError) + Send + Sync + 'static,
    {
        let store = self.clone();
        let path = path.clone();
        async move {
            let rx = store.changes();
            let initial = store.get(&path).await?;
            on_change(initial.clone());
            Ok(Subscription::spawn(store, path, rx, initial, on_change, on_error))
        }
    }
}

/// Live view handle. The listener task stops when this is dropped.
#[derive(Debug)]
pub struct Subscription {
    path: DocPath,
    handle: Option<JoinHandle<()>>,
}

enum Trigger {
    Changed,
    Poll,
}

impl Subscription {
    fn spawn<S, F, E>(
        store: S,
        path: DocPath,
        mut rx: broadcast::Receiver<DocPath>,
        mut last: Option<Document>,
        on_change: F,
        on_error: E,
    ) -> Self
    where
        S: DocumentStore,
        F: Fn(Option<Document>) + Send + Sync + 'static,
        E: Fn(StoreError) + Send + Sync + 'static,
    {
        let watched = path.clone();
        let mut ticker = store.poll_interval().map(tokio::time::interval);

        let handle = tokio::spawn(async move {
            loop {
                let trigger = tokio::select! {
                    msg = rx.recv() => match msg {
                        Ok(changed) if changed == watched => Trigger::Changed,
                        Ok(_) => continue,
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(path = %watched, skipped, "change feed lagged, re-reading");
                            Trigger::Changed
                        }
                        Err(RecvError::Closed) => break,
                    },
                    () = tick(&mut ticker) => Trigger::Poll,
                };

                match store.get(&watched).await {
                    Ok(doc) => {
                        if matches!(trigger, Trigger::Poll) && doc == last {
                            continue;
                        }
                        last.clone_from(&doc);
                        on_change(doc);
                    }
                    Err(e) => on_error(e),
                }
            }
        });

        debug!(path = %path, "subscription opened");
        Self {
            path,
            handle: Some(handle),
        }
    }

    /// Path being watched.
    #[must_use]
    pub fn path(&self) -> &DocPath {
        &self.path
    }

    /// Whether the listener task is still running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the view now. Equivalent to dropping it.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!(path = %self.path, "subscription closed");
        }
    }
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siap_types::assert_error_codes;

    #[test]
    fn store_error_codes() {
        let path = DocPath::parse("users/u1").unwrap();
        let errors = [
            StoreError::NotFound(path),
            StoreError::io("/x", std::io::Error::other("disk")),
            StoreError::InvalidPath(PathError::Empty),
        ];
        assert_error_codes(&errors, "STORE_");
        assert!(errors[1].is_recoverable());
        assert!(!errors[0].is_recoverable());
    }

    #[test]
    fn str_field_reads_strings_only() {
        let mut fields = Fields::new();
        fields.insert("role".into(), Value::from("Head"));
        fields.insert("age".into(), Value::from(31));
        let doc = Document::new(DocId::generate(), fields);

        assert_eq!(doc.str_field("role"), Some("Head"));
        assert_eq!(doc.str_field("age"), None);
        assert_eq!(doc.str_field("missing"), None);
    }
}
