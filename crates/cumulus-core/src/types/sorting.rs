//! Sorting types for list endpoints.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Return the SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Caller-selectable ordering of the recycle bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrashSortKey {
    /// Name, case-insensitive.
    Name,
    /// Most recently deleted first.
    #[default]
    DeletedAt,
    /// Largest first; folders last.
    Size,
    /// Original location path.
    Location,
}

impl TrashSortKey {
    /// The direction this key sorts in.
    pub fn direction(&self) -> SortDirection {
        match self {
            Self::Name | Self::Location => SortDirection::Asc,
            Self::DeletedAt | Self::Size => SortDirection::Desc,
        }
    }
}

impl FromStr for TrashSortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "deleted_at" | "deletedAt" => Ok(Self::DeletedAt),
            "size" => Ok(Self::Size),
            "location" | "original_location_path" => Ok(Self::Location),
            other => Err(AppError::invalid_argument(format!(
                "Unknown sort key '{other}'"
            ))),
        }
    }
}
