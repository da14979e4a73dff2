//! Item references shared by files and folders.

pub mod model;

pub use model::{EntityState, Item, ItemRef, ItemType};
