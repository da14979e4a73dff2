//! Soft delete and restore.

use tracing::{debug, info};

use cumulus_core::result::AppResult;
use cumulus_core::types::{FolderId, LifecycleFilter};
use cumulus_database::store::{FileQuery, FolderQuery, WriteBatch};
use cumulus_entity::file::FilePatch;
use cumulus_entity::folder::{Folder, FolderPatch};
use cumulus_entity::item::{EntityState, Item, ItemRef};

use super::naming::free_name;
use super::{LifecycleService, RestoreMode, require_state};
use crate::context::RequestContext;
use crate::folder::engine::FolderIndex;

impl LifecycleService {
    /// Move an ACTIVE item to the recycle bin.
    ///
    /// A folder takes its whole live subtree with it. Every row of the
    /// cascade gets the same `deleted_at`, remembers its live parent in
    /// `original_*_id` and loses the live link, all in one batch.
    pub async fn soft_delete(&self, ctx: &RequestContext, item: ItemRef) -> AppResult<Item> {
        let current = self.load_item(ctx, item).await?;
        require_state(item.item_type(), current.state(), EntityState::Active)?;

        let now = ctx.request_time;
        let mut batch = WriteBatch::new(ctx.user_id, now);
        let trashed = match current {
            Item::File(mut file) => {
                let patch = FilePatch::trash(now, file.folder_id);
                batch.update_file_checked(&file, patch.clone());
                patch.apply_to(&mut file, now);
                Item::File(file)
            }
            Item::Folder(mut folder) => {
                let folders = self.active_folders(ctx).await?;
                let index = FolderIndex::new(&folders);
                let descendants = index.descendants(folder.id);

                let mut subtree: Vec<FolderId> = Vec::with_capacity(descendants.len() + 1);
                subtree.push(folder.id);
                subtree.extend(descendants.iter().map(|f| f.id));
                let files = self
                    .records
                    .list_files(ctx.user_id, FileQuery::in_folders(subtree))
                    .await?;

                let patch = FolderPatch::trash(now, folder.parent_id);
                batch.update_folder_checked(&folder, patch.clone());
                for child in &descendants {
                    batch.update_folder_checked(child, FolderPatch::trash(now, child.parent_id));
                }
                for file in &files {
                    batch.update_file_checked(file, FilePatch::trash(now, file.folder_id));
                }
                debug!(
                    folder_id = %folder.id,
                    folders = descendants.len() + 1,
                    files = files.len(),
                    "Soft-delete cascade collected"
                );
                patch.apply_to(&mut folder, now);
                Item::Folder(folder)
            }
        };
        let rows = self.records.apply(batch).await?;

        info!(user_id = %ctx.user_id, item = %item, rows, "Item moved to recycle bin");
        Ok(trashed)
    }

    /// Bring a TRASHED item back.
    ///
    /// The item returns to its original location, or to root when that
    /// folder is gone or itself in the recycle bin. A name taken at the
    /// target is resolved with a numeric suffix. With
    /// [`RestoreMode::Subtree`] the rest of the cascade that trashed a folder
    /// comes back too, re-attached to the restored folders.
    pub async fn restore(
        &self,
        ctx: &RequestContext,
        item: ItemRef,
        mode: RestoreMode,
    ) -> AppResult<Item> {
        let current = self.load_item(ctx, item).await?;
        require_state(item.item_type(), current.state(), EntityState::Trashed)?;

        let original = match &current {
            Item::File(file) => file.original_folder_id,
            Item::Folder(folder) => folder.original_parent_id,
        };
        let target = self.restore_target(ctx, original).await?;
        let taken = self.sibling_names(ctx, item.item_type(), target).await?;
        let name = free_name(
            current.name(),
            item.item_type(),
            &taken,
            self.config.max_copy_suffix,
            self.config.max_name_length,
        )?;

        let now = ctx.request_time;
        let mut batch = WriteBatch::new(ctx.user_id, now);
        let restored = match current {
            Item::File(mut file) => {
                let mut patch = FilePatch::restore(target);
                if name != file.name {
                    patch = patch.with_name(name);
                }
                batch.update_file_checked(&file, patch.clone());
                patch.apply_to(&mut file, now);
                Item::File(file)
            }
            Item::Folder(mut folder) => {
                if mode == RestoreMode::Subtree {
                    self.queue_subtree_restore(ctx, &folder, &mut batch).await?;
                }
                let mut patch = FolderPatch::restore(target);
                if name != folder.name {
                    patch = patch.with_name(name);
                }
                batch.update_folder_checked(&folder, patch.clone());
                patch.apply_to(&mut folder, now);
                Item::Folder(folder)
            }
        };
        let rows = self.records.apply(batch).await?;

        info!(
            user_id = %ctx.user_id,
            item = %item,
            target = ?target,
            fallback = original.is_some() && target.is_none(),
            rows,
            "Item restored"
        );
        Ok(restored)
    }

    /// `original` if it is still an ACTIVE folder, root otherwise.
    async fn restore_target(
        &self,
        ctx: &RequestContext,
        original: Option<FolderId>,
    ) -> AppResult<Option<FolderId>> {
        let Some(id) = original else {
            return Ok(None);
        };
        Ok(self
            .records
            .find_folder(ctx.user_id, id)
            .await?
            .filter(Folder::is_active)
            .map(|folder| folder.id))
    }

    /// Queue restores for everything trashed together with `root` below it.
    async fn queue_subtree_restore(
        &self,
        ctx: &RequestContext,
        root: &Folder,
        batch: &mut WriteBatch,
    ) -> AppResult<()> {
        let Some(deleted_at) = root.deleted_at else {
            return Ok(());
        };
        let group = self
            .records
            .list_folders(
                ctx.user_id,
                FolderQuery {
                    lifecycle: LifecycleFilter::Trashed,
                    deleted_at: Some(deleted_at),
                    ..FolderQuery::default()
                },
            )
            .await?;
        let index = FolderIndex::by_original_parent(&group);
        let descendants = index.descendants(root.id);

        let mut subtree: Vec<FolderId> = Vec::with_capacity(descendants.len() + 1);
        subtree.push(root.id);
        subtree.extend(descendants.iter().map(|f| f.id));
        let files = self
            .records
            .list_files(ctx.user_id, FileQuery::trashed_from(subtree, deleted_at))
            .await?;

        for child in &descendants {
            batch.update_folder_checked(child, FolderPatch::restore(child.original_parent_id));
        }
        for file in &files {
            batch.update_file_checked(file, FilePatch::restore(file.original_folder_id));
        }
        debug!(
            folder_id = %root.id,
            folders = descendants.len(),
            files = files.len(),
            "Subtree restore collected"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use cumulus_core::error::ErrorKind;
    use cumulus_entity::item::{EntityState, ItemRef, ItemType};

    use crate::lifecycle::testing::Harness;
    use crate::lifecycle::{PurgeMode, RestoreMode};

    #[tokio::test]
    async fn test_cascade_stamps_whole_subtree_once() {
        let h = Harness::new();
        let parent = h.folder("Parent", None).await;
        let f = h.folder("F", Some(&parent)).await;
        let f1 = h.folder("F1", Some(&f)).await;
        let a = h.file("A.txt", Some(&f1)).await;
        let sibling = h.folder("Sibling", Some(&parent)).await;
        let loose = h.file("loose.txt", Some(&parent)).await;

        let item = h
            .service
            .soft_delete(&h.ctx(), ItemRef::Folder(f.id))
            .await
            .unwrap();
        assert_eq!(item.item_ref().item_type(), ItemType::Folder);
        assert_eq!(item.state(), EntityState::Trashed);

        let f = h.reload_folder(f.id).await.unwrap();
        let f1 = h.reload_folder(f1.id).await.unwrap();
        let a = h.reload_file(a.id).await.unwrap();
        assert!(f.deleted_at.is_some());
        assert_eq!(f.deleted_at, f1.deleted_at);
        assert_eq!(f.deleted_at, a.deleted_at);

        assert!(h.reload_folder(parent.id).await.unwrap().is_active());
        assert!(h.reload_folder(sibling.id).await.unwrap().is_active());
        assert!(h.reload_file(loose.id).await.unwrap().is_active());
    }

    #[tokio::test]
    async fn test_work_reports_scenario() {
        let h = Harness::new();
        let work = h.folder("Work", None).await;
        let reports = h.folder("Reports", Some(&work)).await;
        let q1 = h.file("q1.csv", Some(&reports)).await;

        h.service
            .soft_delete(&h.ctx(), ItemRef::Folder(work.id))
            .await
            .unwrap();

        let work_row = h.reload_folder(work.id).await.unwrap();
        let reports_row = h.reload_folder(reports.id).await.unwrap();
        let q1_row = h.reload_file(q1.id).await.unwrap();
        assert_eq!(work_row.state(), EntityState::Trashed);
        assert_eq!(reports_row.state(), EntityState::Trashed);
        assert_eq!(work_row.original_parent_id, None);
        assert_eq!(reports_row.original_parent_id, Some(work.id));
        assert_eq!(q1_row.state(), EntityState::Trashed);
        assert_eq!(q1_row.original_folder_id, Some(reports.id));
        assert_eq!(q1_row.folder_id, None);

        let restored = h
            .service
            .restore(&h.ctx(), ItemRef::Folder(reports.id), RestoreMode::Single)
            .await
            .unwrap();
        assert_eq!(restored.state(), EntityState::Active);
        let reports_row = h.reload_folder(reports.id).await.unwrap();
        assert_eq!(reports_row.parent_id, None);
        assert_eq!(reports_row.original_parent_id, None);
        assert!(!h.reload_folder(work.id).await.unwrap().is_active());
        assert!(!h.reload_file(q1.id).await.unwrap().is_active());
    }

    #[tokio::test]
    async fn test_restore_file_to_original_folder() {
        let h = Harness::new();
        let docs = h.folder("Docs", None).await;
        let file = h.file("a.txt", Some(&docs)).await;
        h.service
            .soft_delete(&h.ctx(), ItemRef::File(file.id))
            .await
            .unwrap();
        h.service
            .restore(&h.ctx(), ItemRef::File(file.id), RestoreMode::Single)
            .await
            .unwrap();
        let row = h.reload_file(file.id).await.unwrap();
        assert_eq!(row.folder_id, Some(docs.id));
        assert_eq!(row.original_folder_id, None);
        assert_eq!(row.deleted_at, None);
    }

    #[tokio::test]
    async fn test_restore_falls_back_to_root_after_purge() {
        let h = Harness::new();
        let docs = h.folder("Docs", None).await;
        let a = h.file("A.txt", Some(&docs)).await;
        h.service
            .soft_delete(&h.ctx(), ItemRef::File(a.id))
            .await
            .unwrap();
        h.service
            .purge(&h.ctx(), ItemRef::Folder(docs.id), PurgeMode::Force)
            .await
            .unwrap();
        assert!(h.reload_folder(docs.id).await.is_none());

        h.service
            .restore(&h.ctx(), ItemRef::File(a.id), RestoreMode::Single)
            .await
            .unwrap();
        let row = h.reload_file(a.id).await.unwrap();
        assert!(row.is_active());
        assert_eq!(row.folder_id, None);
    }

    #[tokio::test]
    async fn test_restore_renames_on_collision() {
        let h = Harness::new();
        let old = h.file("report.pdf", None).await;
        h.service
            .soft_delete(&h.ctx(), ItemRef::File(old.id))
            .await
            .unwrap();
        h.file("report.pdf", None).await;

        let restored = h
            .service
            .restore(&h.ctx(), ItemRef::File(old.id), RestoreMode::Single)
            .await
            .unwrap();
        assert_eq!(restored.name(), "report (1).pdf");
    }

    #[tokio::test]
    async fn test_subtree_restore_brings_back_cascade_only() {
        let h = Harness::new();
        let work = h.folder("Work", None).await;
        let reports = h.folder("Reports", Some(&work)).await;
        let early = h.file("early.txt", Some(&work)).await;
        let q1 = h.file("q1.csv", Some(&reports)).await;

        h.service
            .soft_delete(&h.ctx(), ItemRef::File(early.id))
            .await
            .unwrap();
        h.service
            .soft_delete(&h.ctx(), ItemRef::Folder(work.id))
            .await
            .unwrap();
        h.service
            .restore(&h.ctx(), ItemRef::Folder(work.id), RestoreMode::Subtree)
            .await
            .unwrap();

        let reports_row = h.reload_folder(reports.id).await.unwrap();
        assert!(reports_row.is_active());
        assert_eq!(reports_row.parent_id, Some(work.id));
        let q1_row = h.reload_file(q1.id).await.unwrap();
        assert!(q1_row.is_active());
        assert_eq!(q1_row.folder_id, Some(reports.id));
        assert!(!h.reload_file(early.id).await.unwrap().is_active());
    }

    #[tokio::test]
    async fn test_state_mismatches_are_stale() {
        let h = Harness::new();
        let file = h.file("a.txt", None).await;
        let err = h
            .service
            .restore(&h.ctx(), ItemRef::File(file.id), RestoreMode::Single)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::StaleState);

        h.service
            .soft_delete(&h.ctx(), ItemRef::File(file.id))
            .await
            .unwrap();
        let err = h
            .service
            .soft_delete(&h.ctx(), ItemRef::File(file.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::StaleState);
    }
}
