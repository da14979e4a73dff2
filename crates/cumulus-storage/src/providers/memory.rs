//! In-memory blob store with failure injection.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use uuid::Uuid;

use cumulus_core::error::AppError;
use cumulus_core::result::AppResult;
use cumulus_core::traits::BlobStore;
use cumulus_core::types::BlobRef;

#[derive(Debug, Default)]
struct Inner {
    blobs: HashMap<BlobRef, Bytes>,
    broken: HashSet<BlobRef>,
    fail_puts: bool,
    delete_calls: Vec<BlobRef>,
}

/// Blob store keeping bytes in a map.
///
/// Individual references can be marked broken: every operation on them
/// then fails with a storage error, which lets tests drive the partial
/// failure paths of copy, download and purge.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    inner: RwLock<Inner>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation on `blob` fail.
    pub async fn break_blob(&self, blob: &BlobRef) {
        self.inner.write().await.broken.insert(blob.clone());
    }

    /// Make `put` (and therefore `duplicate`) fail.
    pub async fn fail_puts(&self, fail: bool) {
        self.inner.write().await.fail_puts = fail;
    }

    /// Drop a blob without recording a delete, as if lost on disk.
    pub async fn lose(&self, blob: &BlobRef) {
        self.inner.write().await.blobs.remove(blob);
    }

    /// Every reference `delete` was called with, in call order.
    pub async fn delete_calls(&self) -> Vec<BlobRef> {
        self.inner.read().await.delete_calls.clone()
    }

    /// Number of stored blobs.
    pub async fn len(&self) -> usize {
        self.inner.read().await.blobs.len()
    }

    /// Whether no blobs are stored.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.blobs.is_empty()
    }
}

fn broken(blob: &BlobRef) -> AppError {
    AppError::storage(format!("Blob store unavailable for {blob}"))
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn put(&self, data: Bytes) -> AppResult<BlobRef> {
        let mut inner = self.inner.write().await;
        if inner.fail_puts {
            return Err(AppError::storage("Blob store rejected write"));
        }
        let blob = BlobRef::new(Uuid::new_v4().simple().to_string());
        inner.blobs.insert(blob.clone(), data);
        Ok(blob)
    }

    async fn get(&self, blob: &BlobRef) -> AppResult<Bytes> {
        let inner = self.inner.read().await;
        if inner.broken.contains(blob) {
            return Err(broken(blob));
        }
        inner
            .blobs
            .get(blob)
            .cloned()
            .ok_or_else(|| AppError::storage(format!("Blob missing: {blob}")))
    }

    async fn exists(&self, blob: &BlobRef) -> AppResult<bool> {
        let inner = self.inner.read().await;
        if inner.broken.contains(blob) {
            return Err(broken(blob));
        }
        Ok(inner.blobs.contains_key(blob))
    }

    async fn delete(&self, blob: &BlobRef) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.delete_calls.push(blob.clone());
        if inner.broken.contains(blob) {
            return Err(broken(blob));
        }
        inner.blobs.remove(blob);
        Ok(())
    }
}
