//! Folder creation and listing.

use tracing::info;

use cumulus_core::result::AppResult;
use cumulus_core::types::FolderId;
use cumulus_database::store::{FolderQuery, WriteBatch};
use cumulus_entity::folder::Folder;
use cumulus_entity::item::ItemType;

use super::LifecycleService;
use super::naming::validate_name;
use crate::context::RequestContext;

impl LifecycleService {
    /// Create an ACTIVE folder under `parent_id` (root when `None`).
    ///
    /// Fails with `NotFound` if the parent is missing or trashed, `Conflict`
    /// if an ACTIVE sibling folder has the same name, and
    /// `InvalidArgument` for a malformed name.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        name: &str,
        parent_id: Option<FolderId>,
    ) -> AppResult<Folder> {
        let name = validate_name(name, self.config.max_name_length)?;
        self.require_container(ctx, parent_id).await?;
        self.ensure_name_free(ctx, ItemType::Folder, parent_id, &name)
            .await?;

        let folder = Folder::new(ctx.user_id, name, parent_id, ctx.request_time);
        let mut batch = WriteBatch::new(ctx.user_id, ctx.request_time);
        batch.insert_folder(folder.clone());
        self.records.apply(batch).await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder.id,
            parent_id = ?folder.parent_id,
            "Folder created"
        );
        Ok(folder)
    }

    /// Fetch one folder in any state.
    pub async fn get_folder(&self, ctx: &RequestContext, id: FolderId) -> AppResult<Folder> {
        self.load_folder(ctx, id).await
    }

    /// ACTIVE folders directly under `parent` (root when `None`).
    pub async fn list_folders(
        &self,
        ctx: &RequestContext,
        parent: Option<FolderId>,
    ) -> AppResult<Vec<Folder>> {
        self.require_container(ctx, parent).await?;
        self.records
            .list_folders(ctx.user_id, FolderQuery::children_of(parent))
            .await
    }

    /// Every ACTIVE folder of the caller, as a flat list.
    pub async fn list_all_folders(&self, ctx: &RequestContext) -> AppResult<Vec<Folder>> {
        self.active_folders(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use cumulus_core::error::ErrorKind;

    use crate::lifecycle::testing::Harness;
    use cumulus_entity::item::ItemRef;

    #[tokio::test]
    async fn test_create_under_root_and_parent() {
        let h = Harness::new();
        let work = h.folder("Work", None).await;
        let reports = h.folder("Reports", Some(&work)).await;
        assert_eq!(work.parent_id, None);
        assert_eq!(reports.parent_id, Some(work.id));
        assert_eq!(reports.owner_id, h.user);

        let roots = h.service.list_folders(&h.ctx(), None).await.unwrap();
        assert_eq!(roots.len(), 1);
        let children = h.service.list_folders(&h.ctx(), Some(work.id)).await.unwrap();
        assert_eq!(children[0].id, reports.id);
        assert_eq!(h.service.list_all_folders(&h.ctx()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_active_name_conflicts() {
        let h = Harness::new();
        h.folder("Docs", None).await;
        let err = h
            .service
            .create_folder(&h.ctx(), "Docs", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_trashed_name_does_not_conflict() {
        let h = Harness::new();
        let old = h.folder("Docs", None).await;
        h.service
            .soft_delete(&h.ctx(), ItemRef::Folder(old.id))
            .await
            .unwrap();
        let fresh = h.folder("Docs", None).await;
        assert_ne!(fresh.id, old.id);
    }

    #[tokio::test]
    async fn test_same_name_under_different_parents() {
        let h = Harness::new();
        let a = h.folder("A", None).await;
        let b = h.folder("B", None).await;
        h.folder("Docs", Some(&a)).await;
        h.folder("Docs", Some(&b)).await;
    }

    #[tokio::test]
    async fn test_missing_or_trashed_parent_is_not_found() {
        let h = Harness::new();
        let err = h
            .service
            .create_folder(&h.ctx(), "X", Some(cumulus_core::types::FolderId::new()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let parent = h.folder("Parent", None).await;
        h.service
            .soft_delete(&h.ctx(), ItemRef::Folder(parent.id))
            .await
            .unwrap();
        let err = h
            .service
            .create_folder(&h.ctx(), "X", Some(parent.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_invalid_names_rejected() {
        let h = Harness::new();
        for bad in ["", "a/b", "a\\b"] {
            let err = h
                .service
                .create_folder(&h.ctx(), bad, None)
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidArgument);
        }
    }

    #[tokio::test]
    async fn test_foreign_folder_is_invisible() {
        let h = Harness::new();
        let mine = h.folder("Mine", None).await;
        let stranger = crate::context::RequestContext::new(cumulus_core::types::UserId::new());
        let err = h.service.get_folder(&stranger, mine.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
