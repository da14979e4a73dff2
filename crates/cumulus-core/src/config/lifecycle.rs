//! Folder and file lifecycle tuning.

use serde::{Deserialize, Serialize};

/// Limits and labels used by the lifecycle manager and recycle bin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Maximum number of blob operations in flight during copy and purge.
    #[serde(default = "default_blob_concurrency")]
    pub blob_concurrency: usize,
    /// Label used for the root location in recycle bin paths.
    #[serde(default = "default_root_label")]
    pub root_label: String,
    /// Maximum length of a folder or file name, in characters.
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
    /// Highest `(n)` suffix tried before a collision is reported.
    #[serde(default = "default_max_copy_suffix")]
    pub max_copy_suffix: u32,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            blob_concurrency: default_blob_concurrency(),
            root_label: default_root_label(),
            max_name_length: default_max_name_length(),
            max_copy_suffix: default_max_copy_suffix(),
        }
    }
}

fn default_blob_concurrency() -> usize {
    8
}

fn default_root_label() -> String {
    "My Files".to_string()
}

fn default_max_name_length() -> usize {
    255
}

fn default_max_copy_suffix() -> u32 {
    1000
}
