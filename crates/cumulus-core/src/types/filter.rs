//! Filter types for record store queries.

use serde::{Deserialize, Serialize};

/// Filter on the live parent reference of a folder or file.
///
/// `Root` is an `IS NULL` check and is deliberately distinct from
/// equality on an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentFilter<Id> {
    /// No constraint on the parent.
    Any,
    /// Parent reference `IS NULL`.
    Root,
    /// Parent reference equal to the id.
    Id(Id),
    /// Parent reference in the id list.
    In(Vec<Id>),
}

impl<Id> Default for ParentFilter<Id> {
    fn default() -> Self {
        Self::Any
    }
}

impl<Id: Copy> ParentFilter<Id> {
    /// `Root` for `None`, `Id` otherwise.
    pub fn from_option(parent: Option<Id>) -> Self {
        match parent {
            Some(id) => Self::Id(id),
            None => Self::Root,
        }
    }
}

impl<Id: PartialEq> ParentFilter<Id> {
    /// Evaluate the filter against a parent reference.
    pub fn matches(&self, parent: Option<&Id>) -> bool {
        match (self, parent) {
            (Self::Any, _) => true,
            (Self::Root, p) => p.is_none(),
            (Self::Id(id), Some(p)) => id == p,
            (Self::In(ids), Some(p)) => ids.contains(p),
            (_, None) => false,
        }
    }
}

/// Filter on the soft-delete marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleFilter {
    /// `deleted_at IS NULL`.
    #[default]
    Active,
    /// `deleted_at IS NOT NULL`.
    Trashed,
    /// No constraint.
    Any,
}

impl LifecycleFilter {
    /// Evaluate the filter against a row's `deleted_at` presence.
    pub fn matches(&self, is_deleted: bool) -> bool {
        match self {
            Self::Active => !is_deleted,
            Self::Trashed => is_deleted,
            Self::Any => true,
        }
    }
}
