//! Folder tree engine: hierarchy queries over an in-memory folder snapshot.
//!
//! Nothing here touches a store and nothing here fails. Dangling parent
//! references and cycles are tolerated: a cycle is something to detect and
//! report, never something that hangs or panics the process.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use cumulus_core::error::AppError;
use cumulus_core::types::FolderId;
use cumulus_entity::file::File;
use cumulus_entity::folder::{Breadcrumb, Folder, FolderNode};

/// Which reference links a folder to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
    /// The live `parent_id` (a snapshot of ACTIVE folders).
    Live,
    /// The `original_parent_id` (a group of folders trashed together).
    Original,
}

/// The item being moved or copied, reduced to what the target check needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSubject {
    /// A folder and its current parent.
    Folder {
        /// The folder being moved.
        id: FolderId,
        /// Where it currently lives.
        parent_id: Option<FolderId>,
    },
    /// A file and its current folder.
    File {
        /// Where it currently lives.
        folder_id: Option<FolderId>,
    },
}

impl MoveSubject {
    /// Current location of the subject.
    pub fn location(&self) -> Option<FolderId> {
        match self {
            Self::Folder { parent_id, .. } => *parent_id,
            Self::File { folder_id } => *folder_id,
        }
    }
}

impl From<&Folder> for MoveSubject {
    fn from(folder: &Folder) -> Self {
        Self::Folder {
            id: folder.id,
            parent_id: folder.parent_id,
        }
    }
}

impl From<&File> for MoveSubject {
    fn from(file: &File) -> Self {
        Self::File {
            folder_id: file.folder_id,
        }
    }
}

/// Why a destination was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRejection {
    /// The destination is where the item already is.
    SameLocation,
    /// A folder cannot contain itself.
    IntoItself,
    /// A folder cannot move under one of its own subfolders.
    IntoDescendant,
    /// The destination is not an ACTIVE folder of the caller.
    DestinationMissing,
}

impl fmt::Display for TargetRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SameLocation => "The item is already in this location",
            Self::IntoItself | Self::IntoDescendant => {
                "Cannot move a folder into itself or one of its subfolders"
            }
            Self::DestinationMissing => "Destination folder does not exist",
        })
    }
}

impl From<TargetRejection> for AppError {
    fn from(rejection: TargetRejection) -> Self {
        AppError::invalid_target(rejection.to_string())
    }
}

/// Index over a flat folder list.
#[derive(Debug)]
pub struct FolderIndex<'a> {
    by_id: HashMap<FolderId, &'a Folder>,
    children: HashMap<Option<FolderId>, Vec<&'a Folder>>,
    linkage: Linkage,
}

impl<'a> FolderIndex<'a> {
    /// Index folders by their live `parent_id`.
    pub fn new(folders: &'a [Folder]) -> Self {
        Self::with_linkage(folders, Linkage::Live)
    }

    /// Index folders by `original_parent_id`.
    pub fn by_original_parent(folders: &'a [Folder]) -> Self {
        Self::with_linkage(folders, Linkage::Original)
    }

    fn with_linkage(folders: &'a [Folder], linkage: Linkage) -> Self {
        let mut by_id = HashMap::with_capacity(folders.len());
        let mut children: HashMap<Option<FolderId>, Vec<&'a Folder>> = HashMap::new();
        for folder in folders {
            by_id.insert(folder.id, folder);
            let parent = match linkage {
                Linkage::Live => folder.parent_id,
                Linkage::Original => folder.original_parent_id,
            };
            children.entry(parent).or_default().push(folder);
        }
        Self {
            by_id,
            children,
            linkage,
        }
    }

    fn parent_of(&self, folder: &Folder) -> Option<FolderId> {
        match self.linkage {
            Linkage::Live => folder.parent_id,
            Linkage::Original => folder.original_parent_id,
        }
    }

    /// Number of indexed folders.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Look up a folder.
    pub fn get(&self, id: FolderId) -> Option<&'a Folder> {
        self.by_id.get(&id).copied()
    }

    /// Whether a folder is in the snapshot.
    pub fn contains(&self, id: FolderId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Direct children of `parent`, in input order.
    pub fn children(&self, parent: Option<FolderId>) -> &[&'a Folder] {
        self.children.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Build the forest under `root_parent` (the root level when `None`).
    ///
    /// Children keep input order. Folders whose parent is absent from the
    /// snapshot are unreachable and therefore omitted.
    pub fn build_tree(&self, root_parent: Option<FolderId>) -> Vec<FolderNode> {
        let mut visited = HashSet::new();
        if let Some(id) = root_parent {
            visited.insert(id);
        }
        self.build_level(root_parent, &mut visited)
    }

    fn build_level(
        &self,
        parent: Option<FolderId>,
        visited: &mut HashSet<FolderId>,
    ) -> Vec<FolderNode> {
        let mut nodes = Vec::new();
        for folder in self.children(parent) {
            if !visited.insert(folder.id) {
                continue;
            }
            let children = self.build_level(Some(folder.id), visited);
            nodes.push(FolderNode {
                folder: (*folder).clone(),
                children,
            });
        }
        nodes
    }

    /// Whether `ancestor` lies on the parent chain above `candidate`.
    ///
    /// The walk starts at the candidate's parent, so
    /// `is_descendant(f, f)` holds only when `f` sits on a cycle.
    pub fn is_descendant(&self, candidate: FolderId, ancestor: FolderId) -> bool {
        let Some(start) = self.get(candidate) else {
            return false;
        };
        let mut visited = HashSet::new();
        let mut current = self.parent_of(start);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            if !visited.insert(id) {
                return false;
            }
            match self.get(id) {
                Some(folder) => current = self.parent_of(folder),
                None => return false,
            }
        }
        false
    }

    /// Folders that are their own ancestor, in id order.
    pub fn find_cycles(&self) -> Vec<FolderId> {
        let mut cyclic: Vec<FolderId> = self
            .by_id
            .keys()
            .copied()
            .filter(|id| self.is_descendant(*id, *id))
            .collect();
        cyclic.sort_by_key(|id| id.0);
        cyclic
    }

    /// Decide whether `subject` may be placed under `destination`.
    ///
    /// The root (`None`) always exists. Files are only refused a missing
    /// destination or their current location.
    pub fn check_move_target(
        &self,
        subject: MoveSubject,
        destination: Option<FolderId>,
    ) -> Result<(), TargetRejection> {
        if let MoveSubject::Folder { id, .. } = subject {
            if destination == Some(id) {
                return Err(TargetRejection::IntoItself);
            }
        }
        if destination == subject.location() {
            return Err(TargetRejection::SameLocation);
        }
        let Some(target) = destination else {
            return Ok(());
        };
        if !self.contains(target) {
            return Err(TargetRejection::DestinationMissing);
        }
        if let MoveSubject::Folder { id, .. } = subject {
            if self.is_descendant(target, id) {
                return Err(TargetRejection::IntoDescendant);
            }
        }
        Ok(())
    }

    /// Boolean form of [`FolderIndex::check_move_target`].
    pub fn is_move_target_valid(
        &self,
        subject: MoveSubject,
        destination: Option<FolderId>,
    ) -> bool {
        self.check_move_target(subject, destination).is_ok()
    }

    /// Root-first path ending at `folder_id`.
    ///
    /// Returns the reachable suffix when the chain is broken, and nothing
    /// when the folder itself is absent.
    pub fn breadcrumbs(&self, folder_id: FolderId) -> Vec<Breadcrumb> {
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(folder_id);
        while let Some(id) = current {
            if !visited.insert(id) {
                break;
            }
            let Some(folder) = self.get(id) else {
                break;
            };
            path.push(Breadcrumb {
                id: folder.id,
                name: folder.name.clone(),
            });
            current = self.parent_of(folder);
        }
        path.reverse();
        path
    }

    /// Every folder below `root`, parents before children.
    ///
    /// `root` itself is excluded. Reversing the result gives a
    /// deepest-first order.
    pub fn descendants(&self, root: FolderId) -> Vec<&'a Folder> {
        let mut out = Vec::new();
        let mut visited = HashSet::from([root]);
        let mut queue = VecDeque::from([root]);
        while let Some(parent) = queue.pop_front() {
            for child in self.children(Some(parent)) {
                if visited.insert(child.id) {
                    out.push(*child);
                    queue.push_back(child.id);
                }
            }
        }
        out
    }
}

/// Build the forest of `folders` under `root_parent`.
pub fn build_tree(folders: &[Folder], root_parent: Option<FolderId>) -> Vec<FolderNode> {
    FolderIndex::new(folders).build_tree(root_parent)
}

/// Whether `ancestor` is above `candidate` in `folders`.
pub fn is_descendant(candidate: FolderId, ancestor: FolderId, folders: &[Folder]) -> bool {
    FolderIndex::new(folders).is_descendant(candidate, ancestor)
}

/// Folders that sit on a parent cycle.
pub fn find_cycles(folders: &[Folder]) -> Vec<FolderId> {
    FolderIndex::new(folders).find_cycles()
}

/// Validate a move destination against `folders`.
pub fn check_move_target(
    subject: MoveSubject,
    destination: Option<FolderId>,
    folders: &[Folder],
) -> Result<(), TargetRejection> {
    FolderIndex::new(folders).check_move_target(subject, destination)
}

/// Whether a move destination is acceptable.
pub fn is_move_target_valid(
    subject: MoveSubject,
    destination: Option<FolderId>,
    folders: &[Folder],
) -> bool {
    FolderIndex::new(folders).is_move_target_valid(subject, destination)
}

/// Root-first breadcrumb path to `folder_id`.
pub fn build_breadcrumb_path(folder_id: FolderId, folders: &[Folder]) -> Vec<Breadcrumb> {
    FolderIndex::new(folders).breadcrumbs(folder_id)
}
