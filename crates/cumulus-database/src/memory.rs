//! In-memory [`RecordStore`] for tests and single-process deployments.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use cumulus_core::error::AppError;
use cumulus_core::result::AppResult;
use cumulus_core::types::{FileId, FolderId, UserId};
use cumulus_entity::file::File;
use cumulus_entity::folder::Folder;

use crate::store::{FileQuery, FolderQuery, RecordStore, RecordWrite, WriteBatch};

#[derive(Debug, Clone, Default)]
struct Tables {
    folders: HashMap<FolderId, Folder>,
    files: HashMap<FileId, File>,
}

impl Tables {
    fn apply_write(
        &mut self,
        owner: UserId,
        now: DateTime<Utc>,
        write: &RecordWrite,
    ) -> AppResult<()> {
        match write {
            RecordWrite::InsertFolder(folder) => {
                if folder.owner_id != owner {
                    return Err(AppError::internal("Folder insert for a foreign owner"));
                }
                if self.folders.contains_key(&folder.id) {
                    return Err(AppError::conflict(format!(
                        "Folder {} already exists",
                        folder.id
                    )));
                }
                self.folders.insert(folder.id, folder.clone());
            }
            RecordWrite::InsertFile(file) => {
                if file.owner_id != owner {
                    return Err(AppError::internal("File insert for a foreign owner"));
                }
                if self.files.contains_key(&file.id) {
                    return Err(AppError::conflict(format!(
                        "File {} already exists",
                        file.id
                    )));
                }
                self.files.insert(file.id, file.clone());
            }
            RecordWrite::UpdateFolder {
                id,
                patch,
                expected_updated_at,
            } => {
                let folder = self
                    .folders
                    .get_mut(id)
                    .filter(|f| f.owner_id == owner)
                    .filter(|f| expected_updated_at.is_none_or(|at| f.updated_at == at))
                    .ok_or_else(stale)?;
                patch.apply_to(folder, now);
            }
            RecordWrite::UpdateFile {
                id,
                patch,
                expected_updated_at,
            } => {
                let file = self
                    .files
                    .get_mut(id)
                    .filter(|f| f.owner_id == owner)
                    .filter(|f| expected_updated_at.is_none_or(|at| f.updated_at == at))
                    .ok_or_else(stale)?;
                patch.apply_to(file, now);
            }
            RecordWrite::DeleteFolder(id) => {
                match self.folders.get(id) {
                    Some(folder) if folder.owner_id == owner => {}
                    _ => return Err(stale()),
                }
                self.folders.remove(id);
            }
            RecordWrite::DeleteFile(id) => {
                match self.files.get(id) {
                    Some(file) if file.owner_id == owner => {}
                    _ => return Err(stale()),
                }
                self.files.remove(id);
            }
        }
        Ok(())
    }

    /// Check the constraints the relational schema would enforce.
    fn validate(&self, owner: UserId) -> AppResult<()> {
        for folder in self.folders.values().filter(|f| f.owner_id == owner) {
            if let Some(parent) = folder.parent_id {
                if !self.folders.contains_key(&parent) {
                    return Err(missing_parent());
                }
            }
        }
        for file in self.files.values().filter(|f| f.owner_id == owner) {
            if let Some(folder) = file.folder_id {
                if !self.folders.contains_key(&folder) {
                    return Err(missing_parent());
                }
            }
        }

        let mut folder_names = HashSet::new();
        for folder in self.folders.values() {
            if folder.owner_id == owner
                && folder.is_active()
                && !folder_names.insert((folder.parent_id, folder.name.as_str()))
            {
                return Err(duplicate_name());
            }
        }
        let mut file_names = HashSet::new();
        for file in self.files.values() {
            if file.owner_id == owner
                && file.is_active()
                && !file_names.insert((file.folder_id, file.name.as_str()))
            {
                return Err(duplicate_name());
            }
        }
        Ok(())
    }
}

fn stale() -> AppError {
    AppError::stale_state("An item changed or disappeared while the operation was running")
}

fn missing_parent() -> AppError {
    AppError::stale_state("The referenced folder no longer exists")
}

fn duplicate_name() -> AppError {
    AppError::conflict("An item with this name already exists in the destination")
}

/// Record store holding both tables in process memory.
///
/// A batch is applied to a copy of the tables, validated, and swapped in
/// under the write lock, so readers never observe a half-applied batch.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    tables: RwLock<Tables>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of folder and file rows across all owners.
    pub async fn row_count(&self) -> (usize, usize) {
        let tables = self.tables.read().await;
        (tables.folders.len(), tables.files.len())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    fn backend(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn find_folder(&self, owner: UserId, id: FolderId) -> AppResult<Option<Folder>> {
        let tables = self.tables.read().await;
        Ok(tables
            .folders
            .get(&id)
            .filter(|f| f.owner_id == owner)
            .cloned())
    }

    async fn find_file(&self, owner: UserId, id: FileId) -> AppResult<Option<File>> {
        let tables = self.tables.read().await;
        Ok(tables
            .files
            .get(&id)
            .filter(|f| f.owner_id == owner)
            .cloned())
    }

    async fn list_folders(&self, owner: UserId, query: FolderQuery) -> AppResult<Vec<Folder>> {
        let tables = self.tables.read().await;
        let mut folders: Vec<Folder> = tables
            .folders
            .values()
            .filter(|f| f.owner_id == owner && query.matches(f))
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.0.cmp(&b.id.0)));
        Ok(folders)
    }

    async fn list_files(&self, owner: UserId, query: FileQuery) -> AppResult<Vec<File>> {
        let tables = self.tables.read().await;
        let mut files: Vec<File> = tables
            .files
            .values()
            .filter(|f| f.owner_id == owner && query.matches(f))
            .cloned()
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.0.cmp(&b.id.0)));
        Ok(files)
    }

    async fn apply(&self, batch: WriteBatch) -> AppResult<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let owner = batch.owner();
        let now = batch.now();
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();
        for write in batch.writes() {
            staged.apply_write(owner, now, write)?;
        }
        staged.validate(owner)?;
        *tables = staged;
        Ok(batch.len())
    }
}
