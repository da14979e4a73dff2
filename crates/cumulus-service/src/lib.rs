//! # cumulus-service
//!
//! Business logic for the file store: the folder tree engine, the
//! lifecycle manager that owns every state transition of files and
//! folders, and the recycle bin view.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod folder;
pub mod lifecycle;
pub mod recycle_bin;

pub use context::RequestContext;
pub use folder::{FolderIndex, MoveSubject, TargetRejection, TreeService};
pub use lifecycle::purge::DeleteOutcome;
pub use lifecycle::{BlobFailure, LifecycleService, PurgeMode, PurgeReport, RestoreMode};
pub use recycle_bin::RecycleBinService;
