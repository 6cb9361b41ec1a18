//! 影片清單元件
//!
//! 有序的影片集合與單一選取游標，所有結構變更都經過這裡

mod clip;
mod collection;

pub use clip::ClipRecord;
pub use collection::{ChangeListener, ClipCollection, CollectionState};
