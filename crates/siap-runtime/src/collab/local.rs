//! File-backed document store.
//!
//! Each document is one JSON object on disk, laid out by path:
//!
//! ```text
//! <data_dir>/
//! ├── users/
//! │   └── 3f2a9c….json
//! └── artifacts/Ij8HEOktiALS0zjKB3ay/
//!     ├── assets/
//!     │   └── 9b1e0d….json
//!     └── users/
//!         └── 1042.json
//! ```

use super::document::{Document, DocumentStore, Fields, StoreError};
use crate::config::expand_tilde;
use serde_json::Value;
use siap_types::{CollectionPath, DocId, DocPath, TryNew};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio::sync::broadcast;
use tracing::{debug, warn};

const CHANGE_CAPACITY: usize = 256;

/// Document store rooted at a local directory.
///
/// Writes go through a temp file and a rename. Writes made by this
/// process are announced immediately; changes made by other processes
/// are picked up by subscriptions at the configured poll interval.
#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    base_path: PathBuf,
    poll: Option<Duration>,
    changes: Arc<broadcast::Sender<DocPath>>,
}

impl LocalDocumentStore {
    /// Opens a store at `base_path`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let expanded = expand_tilde(base_path.as_ref());
        std::fs::create_dir_all(&expanded).map_err(|e| StoreError::io(&expanded, e))?;
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Ok(Self {
            base_path: expanded,
            poll: None,
            changes: Arc::new(changes),
        })
    }

    /// Sets the re-read interval for subscriptions. Zero disables polling.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll = (!interval.is_zero()).then_some(interval);
        self
    }

    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn collection_dir(&self, collection: &CollectionPath) -> PathBuf {
        let mut dir = self.base_path.clone();
        dir.extend(collection.segments());
        dir
    }

    fn doc_file(&self, path: &DocPath) -> PathBuf {
        self.collection_dir(path.collection())
            .join(format!("{}.json", path.id()))
    }

    fn temp_file(&self, path: &DocPath) -> PathBuf {
        self.collection_dir(path.collection())
            .join(format!(".{}.json.tmp", path.id()))
    }

    async fn read_fields(file: &Path) -> Result<Option<Fields>, StoreError> {
        let json = match fs::read_to_string(file).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(file, e)),
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| StoreError::malformed(file, e))
    }

    async fn write_fields(&self, path: &DocPath, fields: &Fields) -> Result<(), StoreError> {
        let dir = self.collection_dir(path.collection());
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::io(&dir, e))?;

        let json = serde_json::to_string_pretty(&Value::Object(fields.clone()))
            .map_err(|e| StoreError::malformed(self.doc_file(path), e))?;
        let file = self.doc_file(path);
        let temp = self.temp_file(path);

        fs::write(&temp, json)
            .await
            .map_err(|e| StoreError::io(&temp, e))?;
        fs::rename(&temp, &file)
            .await
            .map_err(|e| StoreError::io(&file, e))?;

        debug!(path = %path, "document written");
        let _ = self.changes.send(path.clone());
        Ok(())
    }
}

impl DocumentStore for LocalDocumentStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError> {
        let fields = Self::read_fields(&self.doc_file(path)).await?;
        Ok(fields.map(|f| Document::new(path.id().clone(), f)))
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        let dir = self.collection_dir(collection);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&dir, e)),
        };

        let mut docs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&dir, e))?
        {
            let file = entry.path();
            if file.extension() != Some(OsStr::new("json")) {
                continue;
            }
            let Some(stem) = file.file_stem().and_then(OsStr::to_str) else {
                continue;
            };
            if stem.starts_with('.') {
                continue;
            }
            let Ok(id) = DocId::try_new(stem.to_string()) else {
                warn!(file = %file.display(), "skipping file with invalid document id");
                continue;
            };

            match Self::read_fields(&file).await {
                Ok(Some(fields)) => docs.push(Document::new(id, fields)),
                Ok(None) => {}
                Err(e) => warn!(file = %file.display(), error = %e, "skipping unreadable document"),
            }
        }

        docs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(docs)
    }

    async fn put(&self, path: &DocPath, fields: Fields) -> Result<(), StoreError> {
        self.write_fields(path, &fields).await
    }

    async fn update(&self, path: &DocPath, partial: Fields) -> Result<(), StoreError> {
        let mut fields = Self::read_fields(&self.doc_file(path))
            .await?
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;
        fields.extend(partial);
        self.write_fields(path, &fields).await
    }

    async fn delete(&self, path: &DocPath) -> Result<(), StoreError> {
        let file = self.doc_file(path);
        match fs::remove_file(&file).await {
            Ok(()) => {
                debug!(path = %path, "document deleted");
                let _ = self.changes.send(path.clone());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(&file, e)),
        }
    }

    fn changes(&self) -> broadcast::Receiver<DocPath> {
        self.changes.subscribe()
    }

    fn poll_interval(&self) -> Option<Duration> {
        self.poll
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    fn test_store() -> (LocalDocumentStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = LocalDocumentStore::new(dir.path()).unwrap();
        (store, dir)
    }

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[tokio::test]
    async fn lays_documents_out_by_path() {
        let (store, dir) = test_store();
        let path = DocPath::parse("artifacts/app/users/1042").unwrap();
        store
            .put(&path, fields(json!({"Nama": "Budi"})))
            .await
            .unwrap();

        let file = dir.path().join("artifacts/app/users/1042.json");
        assert!(file.exists());
        let doc = store.get(&path).await.unwrap().unwrap();
        assert_eq!(doc.str_field("Nama"), Some("Budi"));
    }

    #[tokio::test]
    async fn missing_collection_lists_empty() {
        let (store, _dir) = test_store();
        let coll = CollectionPath::parse("artifacts/app/routine").unwrap();
        assert!(store.list(&coll).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_skips_temp_and_foreign_files() {
        let (store, dir) = test_store();
        let coll = CollectionPath::parse("users").unwrap();
        store
            .put(&coll.doc("u1".to_string().try_into().unwrap()), Fields::new())
            .await
            .unwrap();
        std::fs::write(dir.path().join("users/.u2.json.tmp"), "{}").unwrap();
        std::fs::write(dir.path().join("users/notes.txt"), "x").unwrap();
        std::fs::write(dir.path().join("users/broken.json"), "not json").unwrap();

        let docs = store.list(&coll).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id.as_str(), "u1");
    }

    #[tokio::test]
    async fn malformed_document_is_an_error_on_get() {
        let (store, dir) = test_store();
        std::fs::create_dir_all(dir.path().join("users")).unwrap();
        std::fs::write(dir.path().join("users/u1.json"), "[1, 2]").unwrap();

        let err = store
            .get(&DocPath::parse("users/u1").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }

    #[tokio::test]
    async fn update_and_delete() {
        let (store, _dir) = test_store();
        let path = DocPath::parse("users/u1").unwrap();
        store
            .put(&path, fields(json!({"username": "ana", "role": "USER"})))
            .await
            .unwrap();
        store
            .update(&path, fields(json!({"role": "Admin"})))
            .await
            .unwrap();
        let doc = store.get(&path).await.unwrap().unwrap();
        assert_eq!(doc.str_field("role"), Some("Admin"));
        assert_eq!(doc.str_field("username"), Some("ana"));

        store.delete(&path).await.unwrap();
        store.delete(&path).await.unwrap();
        assert!(store.get(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn polling_picks_up_external_writes() {
        let (store, dir) = test_store();
        let store = store.with_poll_interval(Duration::from_millis(10));
        let path = DocPath::parse("users/u1").unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _sub = store
            .subscribe(&path, move |doc| { let _ = tx.send(doc); }, |_| {})
            .await
            .unwrap();
        assert!(rx.recv().await.unwrap().is_none());

        // Another process writes the file directly.
        std::fs::create_dir_all(dir.path().join("users")).unwrap();
        std::fs::write(dir.path().join("users/u1.json"), r#"{"role":"HSE"}"#).unwrap();

        let doc = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(doc.str_field("role"), Some("HSE"));
    }
}
