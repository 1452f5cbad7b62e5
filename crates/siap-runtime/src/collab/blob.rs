//! Blob collaborator: upload bytes under a key, resolve a download URL.

use crate::config::expand_tilde;
use parking_lot::RwLock;
use siap_types::{validate_segment, ErrorCode, PathError};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

/// Errors from a [`BlobStore`].
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("invalid blob key '{key}': {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: PathError,
    },

    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("blob I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BlobError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl ErrorCode for BlobError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidKey { .. } => "BLOB_INVALID_KEY",
            Self::NotFound(_) => "BLOB_NOT_FOUND",
            Self::Io { .. } => "BLOB_IO",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

/// Reference to an uploaded blob.
///
/// Keys are `/`-separated, each segment a valid path segment
/// (`assets/1700000000000-photo.jpg`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobHandle {
    key: String,
}

impl BlobHandle {
    /// Validates a key.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError::InvalidKey`] for empty keys or bad segments.
    pub fn parse(key: &str) -> Result<Self, BlobError> {
        let invalid = |source| BlobError::InvalidKey {
            key: key.to_string(),
            source,
        };
        if key.is_empty() {
            return Err(invalid(PathError::Empty));
        }
        for segment in key.split('/') {
            validate_segment(segment).map_err(invalid)?;
        }
        Ok(Self {
            key: key.to_string(),
        })
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Blob collaborator.
pub trait BlobStore: Clone + Send + Sync + 'static {
    /// Stores `bytes` under `key`, replacing any previous blob.
    fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<BlobHandle, BlobError>> + Send;

    /// Resolves a URL the front end can fetch the blob from.
    fn url(&self, handle: &BlobHandle) -> impl Future<Output = Result<String, BlobError>> + Send;
}

/// Blob store on the local filesystem, serving `file://` URLs.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Opens a store at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError::Io`] if the directory cannot be created.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, BlobError> {
        let expanded = expand_tilde(root.as_ref());
        std::fs::create_dir_all(&expanded).map_err(|e| BlobError::io(&expanded, e))?;
        let root = std::fs::canonicalize(&expanded).map_err(|e| BlobError::io(&expanded, e))?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file(&self, handle: &BlobHandle) -> PathBuf {
        let mut file = self.root.clone();
        file.extend(handle.key().split('/'));
        file
    }
}

impl BlobStore for LocalBlobStore {
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> Result<BlobHandle, BlobError> {
        let handle = BlobHandle::parse(key)?;
        let file = self.file(&handle);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| BlobError::io(parent, e))?;
        }

        let name = handle.key().rsplit('/').next().unwrap_or(handle.key());
        let temp = file.with_file_name(format!(".{name}.part"));
        fs::write(&temp, &bytes)
            .await
            .map_err(|e| BlobError::io(&temp, e))?;
        fs::rename(&temp, &file)
            .await
            .map_err(|e| BlobError::io(&file, e))?;

        debug!(key = %handle, bytes = bytes.len(), "blob uploaded");
        Ok(handle)
    }

    async fn url(&self, handle: &BlobHandle) -> Result<String, BlobError> {
        let file = self.file(handle);
        match fs::metadata(&file).await {
            Ok(_) => Ok(format!("file://{}", file.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(handle.key().to_string()))
            }
            Err(e) => Err(BlobError::io(&file, e)),
        }
    }
}

/// Blob store in process memory, serving `memory://` URLs.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the stored bytes.
    #[must_use]
    pub fn bytes(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.read().get(key).cloned()
    }

    /// Stored keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.blobs.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl BlobStore for MemoryBlobStore {
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> Result<BlobHandle, BlobError> {
        let handle = BlobHandle::parse(key)?;
        self.blobs.write().insert(handle.key().to_string(), bytes);
        Ok(handle)
    }

    async fn url(&self, handle: &BlobHandle) -> Result<String, BlobError> {
        if self.blobs.read().contains_key(handle.key()) {
            Ok(format!("memory://{}", handle.key()))
        } else {
            Err(BlobError::NotFound(handle.key().to_string()))
        }
    }
}
