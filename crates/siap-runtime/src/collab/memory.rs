//! In-process document store.

use super::document::{Document, DocumentStore, Fields, StoreError};
use parking_lot::RwLock;
use siap_types::{CollectionPath, DocPath};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

const CHANGE_CAPACITY: usize = 256;

/// Document store kept in process memory.
///
/// Clones share the same documents and change feed.
#[derive(Debug, Clone)]
pub struct MemoryDocumentStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    docs: RwLock<HashMap<DocPath, Fields>>,
    changes: broadcast::Sender<DocPath>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                docs: RwLock::new(HashMap::new()),
                changes,
            }),
        }
    }

    /// Number of documents across all collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn notify(&self, path: &DocPath) {
        // No receivers is fine.
        let _ = self.inner.changes.send(path.clone());
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError> {
        let docs = self.inner.docs.read();
        Ok(docs
            .get(path)
            .map(|fields| Document::new(path.id().clone(), fields.clone())))
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        let mut out: Vec<Document> = {
            let docs = self.inner.docs.read();
            docs.iter()
                .filter(|(path, _)| path.collection() == collection)
                .map(|(path, fields)| Document::new(path.id().clone(), fields.clone()))
                .collect()
        };
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }

    async fn put(&self, path: &DocPath, fields: Fields) -> Result<(), StoreError> {
        self.inner.docs.write().insert(path.clone(), fields);
        self.notify(path);
        Ok(())
    }

    async fn update(&self, path: &DocPath, partial: Fields) -> Result<(), StoreError> {
        {
            let mut docs = self.inner.docs.write();
            let existing = docs
                .get_mut(path)
                .ok_or_else(|| StoreError::NotFound(path.clone()))?;
            existing.extend(partial);
        }
        self.notify(path);
        Ok(())
    }

    async fn delete(&self, path: &DocPath) -> Result<(), StoreError> {
        let removed = self.inner.docs.write().remove(path).is_some();
        if removed {
            self.notify(path);
        }
        Ok(())
    }

    fn changes(&self) -> broadcast::Receiver<DocPath> {
        self.inner.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn assets() -> CollectionPath {
        CollectionPath::parse("artifacts/app/assets").unwrap()
    }

    #[tokio::test]
    async fn put_get_list_delete() {
        let store = MemoryDocumentStore::new();
        let id = store
            .add(&assets(), fields(json!({"Name": "Forklift"})))
            .await
            .unwrap();
        let path = assets().doc(id.clone());

        let doc = store.get(&path).await.unwrap().unwrap();
        assert_eq!(doc.id, id);
        assert_eq!(doc.str_field("Name"), Some("Forklift"));
        assert_eq!(store.list(&assets()).await.unwrap().len(), 1);

        store.delete(&path).await.unwrap();
        assert!(store.get(&path).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn delete_missing_is_ok() {
        let store = MemoryDocumentStore::new();
        let path = DocPath::parse("users/nobody").unwrap();
        store.delete(&path).await.unwrap();
    }

    #[tokio::test]
    async fn update_merges_and_requires_existing() {
        let store = MemoryDocumentStore::new();
        let path = DocPath::parse("users/u1").unwrap();

        let err = store
            .update(&path, fields(json!({"role": "Head"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        store
            .put(&path, fields(json!({"username": "ana", "role": "USER"})))
            .await
            .unwrap();
        store
            .update(&path, fields(json!({"role": "Head"})))
            .await
            .unwrap();

        let doc = store.get(&path).await.unwrap().unwrap();
        assert_eq!(doc.str_field("username"), Some("ana"));
        assert_eq!(doc.str_field("role"), Some("Head"));
    }

    #[tokio::test]
    async fn list_is_scoped_and_sorted() {
        let store = MemoryDocumentStore::new();
        for id in ["b", "a", "c"] {
            store
                .put(&assets().doc(id.to_string().try_into().unwrap()), Fields::new())
                .await
                .unwrap();
        }
        store
            .put(&DocPath::parse("users/a").unwrap(), Fields::new())
            .await
            .unwrap();

        let ids: Vec<String> = store
            .list(&assets())
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id.to_string())
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn subscribe_delivers_initial_and_changes() {
        let store = MemoryDocumentStore::new();
        let path = DocPath::parse("users/u1").unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let sub = store
            .subscribe(
                &path,
                move |doc: Option<Document>| {
                    let _ = tx.send(doc.and_then(|d| d.str_field("role").map(String::from)));
                },
                |_| {},
            )
            .await
            .unwrap();
        assert_eq!(rx.recv().await.unwrap(), None);

        store
            .put(&path, fields(json!({"role": "SPV"})))
            .await
            .unwrap();
        assert_eq!(rx.recv().await.unwrap().as_deref(), Some("SPV"));

        // Writes elsewhere are not delivered.
        store
            .put(&DocPath::parse("users/u2").unwrap(), Fields::new())
            .await
            .unwrap();
        store.delete(&path).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), None);

        assert!(sub.is_active());
        sub.cancel();
    }

    #[tokio::test]
    async fn dropped_subscription_stops_delivery() {
        let store = MemoryDocumentStore::new();
        let path = DocPath::parse("users/u1").unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let sub = store
            .subscribe(&path, move |doc| { let _ = tx.send(doc); }, |_| {})
            .await
            .unwrap();
        assert!(rx.recv().await.unwrap().is_none());
        drop(sub);
        tokio::task::yield_now().await;

        store.put(&path, Fields::new()).await.unwrap();
        let next = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
        // The sender was dropped with the task, or nothing arrived.
        assert!(matches!(next, Ok(None) | Err(_)));
    }
}
