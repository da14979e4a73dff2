//! Blob store trait for pluggable file byte backends.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;
use crate::types::BlobRef;

/// Trait for raw file byte storage.
///
/// The record store keeps only the opaque [`BlobRef`]; everything about
/// where the bytes live belongs to the implementation. Implementations
/// exist for the local filesystem and for process memory in
/// `cumulus-storage`.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend type name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the backend is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Store bytes under a freshly allocated reference.
    async fn put(&self, data: Bytes) -> AppResult<BlobRef>;

    /// Read the bytes behind a reference. A missing blob is a storage error.
    async fn get(&self, blob: &BlobRef) -> AppResult<Bytes>;

    /// Check whether a blob exists.
    async fn exists(&self, blob: &BlobRef) -> AppResult<bool>;

    /// Delete a blob. Deleting a missing reference succeeds.
    async fn delete(&self, blob: &BlobRef) -> AppResult<()>;

    /// Copy a blob to a new, independent reference.
    async fn duplicate(&self, blob: &BlobRef) -> AppResult<BlobRef> {
        let data = self.get(blob).await?;
        self.put(data).await
    }
}
