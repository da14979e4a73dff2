//! Route handlers organized by domain.

pub mod file;
pub mod folder;
pub mod health;
pub mod recycle_bin;
