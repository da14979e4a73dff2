//! Rename and move.

use tracing::info;

use cumulus_core::result::AppResult;
use cumulus_core::types::FolderId;
use cumulus_database::store::WriteBatch;
use cumulus_entity::file::FilePatch;
use cumulus_entity::folder::FolderPatch;
use cumulus_entity::item::{EntityState, Item, ItemRef, ItemType};

use super::naming::validate_name;
use super::{LifecycleService, require_state};
use crate::context::RequestContext;
use crate::folder::engine::{FolderIndex, MoveSubject, TargetRejection};

impl LifecycleService {
    /// Rename an ACTIVE item among its current siblings.
    ///
    /// Renaming to the current name succeeds without writing.
    pub async fn rename(
        &self,
        ctx: &RequestContext,
        item: ItemRef,
        new_name: &str,
    ) -> AppResult<Item> {
        let name = validate_name(new_name, self.config.max_name_length)?;
        let current = self.load_item(ctx, item).await?;
        require_state(item.item_type(), current.state(), EntityState::Active)?;
        if current.name() == name {
            return Ok(current);
        }

        let now = ctx.request_time;
        let mut batch = WriteBatch::new(ctx.user_id, now);
        let renamed = match current {
            Item::Folder(mut folder) => {
                self.ensure_name_free(ctx, ItemType::Folder, folder.parent_id, &name)
                    .await?;
                let patch = FolderPatch::rename(name);
                batch.update_folder_checked(&folder, patch.clone());
                patch.apply_to(&mut folder, now);
                Item::Folder(folder)
            }
            Item::File(mut file) => {
                self.ensure_name_free(ctx, ItemType::File, file.folder_id, &name)
                    .await?;
                let patch = FilePatch::rename(name);
                batch.update_file_checked(&file, patch.clone());
                patch.apply_to(&mut file, now);
                Item::File(file)
            }
        };
        self.records.apply(batch).await?;

        info!(user_id = %ctx.user_id, item = %item, name = renamed.name(), "Item renamed");
        Ok(renamed)
    }

    /// Move an ACTIVE item under `destination` (root when `None`).
    ///
    /// Only the moved row changes; a folder's descendants follow through
    /// their own parent links. Moving to the current location succeeds
    /// without writing.
    pub async fn move_item(
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
            Ok(()) => {}
            Err(TargetRejection::SameLocation) => return Ok(current),
            Err(rejection) => return Err(rejection.into()),
        }
        self.ensure_name_free(ctx, item.item_type(), destination, current.name())
            .await?;

        let now = ctx.request_time;
        let mut batch = WriteBatch::new(ctx.user_id, now);
        let moved = match current {
            Item::Folder(mut folder) => {
                let patch = FolderPatch::reparent(destination);
                batch.update_folder_checked(&folder, patch.clone());
                patch.apply_to(&mut folder, now);
                Item::Folder(folder)
            }
            Item::File(mut file) => {
                let patch = FilePatch::relocate(destination);
                batch.update_file_checked(&file, patch.clone());
                patch.apply_to(&mut file, now);
                Item::File(file)
            }
        };
        self.records.apply(batch).await?;

        info!(
            user_id = %ctx.user_id,
            item = %item,
            destination = ?destination,
            "Item moved"
        );
        Ok(moved)
    }
}
