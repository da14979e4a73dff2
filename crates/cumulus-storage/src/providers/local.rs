//! Local filesystem blob store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use cumulus_core::error::{AppError, ErrorKind};
use cumulus_core::result::AppResult;
use cumulus_core::traits::BlobStore;
use cumulus_core::types::BlobRef;

/// Blob store writing each blob to its own file under a root directory.
///
/// References look like `ab/cd/abcd...` (a fresh UUID in simple form,
/// sharded by its first two byte pairs) so no directory grows unbounded.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    /// Root directory for all stored blobs.
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a new local blob store rooted at the given path.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Allocate a fresh reference.
    fn allocate() -> BlobRef {
        let key = Uuid::new_v4().simple().to_string();
        BlobRef::new(format!("{}/{}/{}", &key[..2], &key[2..4], key))
    }

    /// Resolve a reference to an absolute path within the root.
    fn resolve(&self, blob: &BlobRef) -> AppResult<PathBuf> {
        let key = blob.as_str();
        let well_formed = !key.is_empty()
            && key
                .split('/')
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric()));
        if !well_formed {
            return Err(AppError::storage(format!("Malformed blob reference: {key}")));
        }
        Ok(self.root.join(key))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Move a finished `.part` file onto its final path, removing it if
    /// the rename fails.
    async fn commit(&self, staged: &Path, target: &Path, blob: &BlobRef) -> AppResult<()> {
        if let Err(e) = fs::rename(staged, target).await {
            let _ = fs::remove_file(staged).await;
            return Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to commit blob: {blob}"),
                e,
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.exists() && self.root.is_dir())
    }

    async fn put(&self, data: Bytes) -> AppResult<BlobRef> {
        let blob = Self::allocate();
        let full_path = self.resolve(&blob)?;
        self.ensure_parent(&full_path).await?;

        let staged = full_path.with_extension("part");
        if let Err(e) = fs::write(&staged, &data).await {
            let _ = fs::remove_file(&staged).await;
            return Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write blob: {blob}"),
                e,
            ));
        }
        self.commit(&staged, &full_path, &blob).await?;

        debug!(blob = %blob, bytes = data.len(), "Wrote blob");
        Ok(blob)
    }

    async fn get(&self, blob: &BlobRef) -> AppResult<Bytes> {
        let full_path = self.resolve(blob)?;
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::storage(format!("Blob missing from disk: {blob}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read blob: {blob}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn exists(&self, blob: &BlobRef) -> AppResult<bool> {
        let full_path = self.resolve(blob)?;
        fs::try_exists(&full_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to stat blob: {blob}"),
                e,
            )
        })
    }

    async fn delete(&self, blob: &BlobRef) -> AppResult<()> {
        let full_path = self.resolve(blob)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!(blob = %blob, "Deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete blob: {blob}"),
                e,
            )),
        }
    }

    async fn duplicate(&self, blob: &BlobRef) -> AppResult<BlobRef> {
        let from_path = self.resolve(blob)?;
        let copy = Self::allocate();
        let to_path = self.resolve(&copy)?;
        self.ensure_parent(&to_path).await?;

        let staged = to_path.with_extension("part");
        if let Err(e) = fs::copy(&from_path, &staged).await {
            let _ = fs::remove_file(&staged).await;
            return Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to copy {blob} -> {copy}"),
                e,
            ));
        }
        self.commit(&staged, &to_path, &copy).await?;
        Ok(copy)
    }
}
