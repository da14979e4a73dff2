//! Copying files and folder subtrees.

use std::collections::HashMap;

use futures::FutureExt;
use futures::stream::{self, StreamExt};
use serde_json::json;
use tracing::{info, warn};

use cumulus_core::error::AppError;
use cumulus_core::result::AppResult;
use cumulus_core::types::{BlobRef, FileId, FolderId};
use cumulus_database::store::{FileQuery, WriteBatch};
use cumulus_entity::file::File;
use cumulus_entity::folder::Folder;
use cumulus_entity::item::{EntityState, Item, ItemRef};

use super::naming::free_name;
use super::{LifecycleService, require_state};
use crate::context::RequestContext;
use crate::folder::engine::{FolderIndex, MoveSubject, TargetRejection};

/// A file left out of a copy because its blob could not be duplicated.
#[derive(Debug)]
struct SkippedFile {
    file_id: FileId,
    name: String,
    message: String,
}

impl LifecycleService {
    /// Duplicate an ACTIVE item under `destination` (root when `None`).
    ///
    /// Folders are copied with their whole live subtree under fresh ids.
    /// Every blob is duplicated. A name taken at the destination gets a
    /// numeric suffix, so copying next to the original is allowed.
    ///
    /// When some blobs cannot be duplicated the rest of the tree is still
    /// committed and the call fails with `PartialFailure`; its details name
    /// the new root and the skipped files.
    pub async fn copy_item(
        &self,
        ctx: &RequestContext,
        item: ItemRef,
        destination: Option<FolderId>,
    ) -> AppResult<Item> {
        let current = self.load_item(ctx, item).await?;
        require_state(item.item_type(), current.state(), EntityState::Active)?;

        let folders = self.active_folders(ctx).await?;
        let index = FolderIndex::new(&folders);
        let subject = match &current {
            Item::Folder(folder) => MoveSubject::from(folder),
            Item::File(file) => MoveSubject::from(file),
        };
        match index.check_move_target(subject, destination) {
            Ok(()) | Err(TargetRejection::SameLocation) => {}
            Err(rejection) => return Err(rejection.into()),
        }

        let taken = self
            .sibling_names(ctx, item.item_type(), destination)
            .await?;
        let name = free_name(
            current.name(),
            item.item_type(),
            &taken,
            self.config.max_copy_suffix,
            self.config.max_name_length,
        )?;

        match current {
            Item::File(file) => {
                let blob_ref = self.blobs.duplicate(&file.blob_ref).await?;
                let copy = copy_file(ctx, &file, name, destination, blob_ref);
                let mut batch = WriteBatch::new(ctx.user_id, ctx.request_time);
                batch.insert_file(copy.clone());
                if let Err(e) = self.records.apply(batch).await {
                    self.discard_blobs(std::slice::from_ref(&copy.blob_ref))
                        .await;
                    return Err(e);
                }
                info!(
                    user_id = %ctx.user_id,
                    source_id = %file.id,
                    file_id = %copy.id,
                    "File copied"
                );
                Ok(Item::File(copy))
            }
            Item::Folder(folder) => {
                let copy = self
                    .copy_subtree(ctx, &index, &folder, name, destination)
                    .await?;
                Ok(Item::Folder(copy))
            }
        }
    }

    async fn copy_subtree(
        &self,
        ctx: &RequestContext,
        index: &FolderIndex<'_>,
        source: &Folder,
        name: String,
        destination: Option<FolderId>,
    ) -> AppResult<Folder> {
        let now = ctx.request_time;
        let root = Folder::new(ctx.user_id, name, destination, now);
        let mut id_map: HashMap<FolderId, FolderId> = HashMap::from([(source.id, root.id)]);
        let mut new_folders = vec![root.clone()];
        for original in index.descendants(source.id) {
            let parent = original.parent_id.and_then(|p| id_map.get(&p).copied());
            let copy = Folder::new(ctx.user_id, original.name.clone(), parent, now);
            id_map.insert(original.id, copy.id);
            new_folders.push(copy);
        }

        let files = self
            .records
            .list_files(
                ctx.user_id,
                FileQuery::in_folders(id_map.keys().copied().collect()),
            )
            .await?;

        let blobs = &self.blobs;
        let duplicated: Vec<(&File, AppResult<BlobRef>)> = stream::iter(&files)
            .map(|file| async move { (file, blobs.duplicate(&file.blob_ref).await) }.boxed())
            .buffer_unordered(self.concurrency())
            .boxed()
            .collect()
            .await;

        let mut new_files = Vec::with_capacity(duplicated.len());
        let mut skipped = Vec::new();
        for (file, result) in duplicated {
            match result {
                Ok(blob_ref) => {
                    let folder = file.folder_id.and_then(|f| id_map.get(&f).copied());
                    new_files.push(copy_file(ctx, file, file.name.clone(), folder, blob_ref));
                }
                Err(e) => {
                    warn!(
                        file_id = %file.id,
                        blob = %file.blob_ref,
                        error = %e,
                        "Skipping file whose blob could not be duplicated"
                    );
                    skipped.push(SkippedFile {
                        file_id: file.id,
                        name: file.name.clone(),
                        message: e.message,
                    });
                }
            }
        }

        let mut batch = WriteBatch::new(ctx.user_id, now);
        for folder in &new_folders {
            batch.insert_folder(folder.clone());
        }
        for file in &new_files {
            batch.insert_file(file.clone());
        }
        if let Err(e) = self.records.apply(batch).await {
            let refs: Vec<BlobRef> = new_files.iter().map(|f| f.blob_ref.clone()).collect();
            self.discard_blobs(&refs).await;
            return Err(e);
        }

        info!(
            user_id = %ctx.user_id,
            source_id = %source.id,
            folder_id = %root.id,
            folders = new_folders.len(),
            files = new_files.len(),
            skipped = skipped.len(),
            "Folder copied"
        );

        if skipped.is_empty() {
            return Ok(root);
        }
        skipped.sort_by_key(|s| s.file_id.0);
        let failed_files: Vec<_> = skipped
            .iter()
            .map(|s| json!({ "file_id": s.file_id, "name": s.name, "message": s.message }))
            .collect();
        Err(AppError::partial_failure(format!(
            "Copied folder '{}' but {} file(s) could not be copied",
            root.name,
            skipped.len()
        ))
        .with_details(json!({
            "item_id": root.id,
            "item_type": "folder",
            "failed_files": failed_files,
        })))
    }

    /// Best-effort removal of blobs whose rows were never written.
    async fn discard_blobs(&self, refs: &[BlobRef]) {
        for blob in refs {
            if let Err(e) = self.blobs.delete(blob).await {
                warn!(blob = %blob, error = %e, "Failed to remove blob of rejected copy");
            }
        }
    }
}

fn copy_file(
    ctx: &RequestContext,
    source: &File,
    name: String,
    folder_id: Option<FolderId>,
    blob_ref: BlobRef,
) -> File {
    File {
        id: FileId::new(),
        name,
        mime_type: source.mime_type.clone(),
        size_bytes: source.size_bytes,
        blob_ref,
        owner_id: ctx.user_id,
        folder_id,
        deleted_at: None,
        original_folder_id: None,
        created_at: ctx.request_time,
        updated_at: ctx.request_time,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use cumulus_core::error::ErrorKind;
    use cumulus_core::traits::BlobStore;
    use cumulus_core::types::FolderId;
    use cumulus_database::RecordStore;
    use cumulus_database::store::{FileQuery, FolderQuery};
    use cumulus_entity::file::File;
    use cumulus_entity::folder::Folder;
    use cumulus_entity::item::{Item, ItemRef};

    use crate::folder::engine::FolderIndex;
    use crate::lifecycle::testing::Harness;

    async fn subtree(h: &Harness, root: FolderId) -> (Vec<Folder>, Vec<File>) {
        let all = h
            .records
            .list_folders(h.user, FolderQuery::active())
            .await
            .unwrap();
        let index = FolderIndex::new(&all);
        let mut folders = vec![index.get(root).unwrap().clone()];
        folders.extend(index.descendants(root).into_iter().cloned());
        let ids = folders.iter().map(|f| f.id).collect();
        let files = h
            .records
            .list_files(h.user, FileQuery::in_folders(ids))
            .await
            .unwrap();
        (folders, files)
    }

    #[tokio::test]
    async fn test_copy_file_next_to_original() {
        let h = Harness::new();
        let file = h.file("notes.txt", None).await;
        let copy = h
            .service
            .copy_item(&h.ctx(), ItemRef::File(file.id), None)
            .await
            .unwrap();
        let Item::File(copy) = copy else {
            panic!("expected a file");
        };
        assert_eq!(copy.name, "notes (1).txt");
        assert_ne!(copy.id, file.id);
        assert_ne!(copy.blob_ref, file.blob_ref);
        assert_eq!(
            h.blobs.get(&copy.blob_ref).await.unwrap(),
            h.blobs.get(&file.blob_ref).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_copy_of_longest_name_is_shortened() {
        let h = Harness::new();
        let max = h.service.config().max_name_length;
        let folder = h.folder(&"w".repeat(max), None).await;
        let file = h.file(&format!("{}.csv", "r".repeat(max - 4)), None).await;

        let folder_copy = h
            .service
            .copy_item(&h.ctx(), ItemRef::Folder(folder.id), None)
            .await
            .unwrap();
        assert_eq!(folder_copy.name().chars().count(), max);
        assert!(folder_copy.name().ends_with("w (1)"));

        let file_copy = h
            .service
            .copy_item(&h.ctx(), ItemRef::File(file.id), None)
            .await
            .unwrap();
        assert_eq!(file_copy.name().chars().count(), max);
        assert!(file_copy.name().ends_with("r (1).csv"));
    }

    #[tokio::test]
    async fn test_copy_depth_three_tree_into_colliding_destination() {
        let h = Harness::new();
        let project = h.folder("Project", None).await;
        let src = h.folder("src", Some(&project)).await;
        let deep = h.folder("deep", Some(&src)).await;
        let mut originals = Vec::new();
        originals.push(h.file("README.md", Some(&project)).await);
        originals.push(h.file("main.rs", Some(&src)).await);
        originals.push(h.file("lib.rs", Some(&src)).await);
        originals.push(h.file("a.rs", Some(&deep)).await);
        originals.push(h.file("b.rs", Some(&deep)).await);

        let dest = h.folder("Dest", None).await;
        h.folder("Project", Some(&dest)).await;

        let copy = h
            .service
            .copy_item(&h.ctx(), ItemRef::Folder(project.id), Some(dest.id))
            .await
            .unwrap();
        assert_eq!(copy.name(), "Project (1)");
        let Item::Folder(copy) = copy else {
            panic!("expected a folder");
        };
        assert_eq!(copy.parent_id, Some(dest.id));

        let (folders, files) = subtree(&h, copy.id).await;
        assert_eq!(folders.len(), 3);
        assert_eq!(files.len(), 5);
        let original_ids: HashSet<_> = originals.iter().map(|f| f.id).collect();
        assert!(files.iter().all(|f| !original_ids.contains(&f.id)));
        let names: HashSet<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            HashSet::from(["README.md", "main.rs", "lib.rs", "a.rs", "b.rs"])
        );

        let (source_folders, source_files) = subtree(&h, project.id).await;
        assert_eq!((source_folders.len(), source_files.len()), (3, 5));
    }

    #[tokio::test]
    async fn test_copy_skips_broken_blobs_and_reports() {
        let h = Harness::new();
        let root = h.folder("Root", None).await;
        let good = h.file("good.txt", Some(&root)).await;
        let bad = h.file("bad.txt", Some(&root)).await;
        h.blobs.break_blob(&bad.blob_ref).await;
        let dest = h.folder("Dest", None).await;

        let err = h
            .service
            .copy_item(&h.ctx(), ItemRef::Folder(root.id), Some(dest.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PartialFailure);
        let details = err.details.unwrap();
        assert_eq!(details["item_type"], "folder");
        assert_eq!(details["failed_files"][0]["name"], "bad.txt");

        let copies = h
            .service
            .list_folders(&h.ctx(), Some(dest.id))
            .await
            .unwrap();
        assert_eq!(copies.len(), 1);
        let files = h
            .service
            .list_files(&h.ctx(), Some(copies[0].id))
            .await
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, good.name);
    }

    #[tokio::test]
    async fn test_copy_into_self_or_descendant_rejected() {
        let h = Harness::new();
        let a = h.folder("A", None).await;
        let b = h.folder("B", Some(&a)).await;
        for target in [a.id, b.id] {
            let err = h
                .service
                .copy_item(&h.ctx(), ItemRef::Folder(a.id), Some(target))
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidTarget);
        }
        let err = h
            .service
            .copy_item(&h.ctx(), ItemRef::Folder(b.id), Some(FolderId::new()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidTarget);
    }

    #[tokio::test]
    async fn test_copy_trashed_is_stale() {
        let h = Harness::new();
        let file = h.file("x.txt", None).await;
        h.service
            .soft_delete(&h.ctx(), ItemRef::File(file.id))
            .await
            .unwrap();
        let err = h
            .service
            .copy_item(&h.ctx(), ItemRef::File(file.id), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::StaleState);
    }
}
