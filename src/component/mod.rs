//! 功能元件模組
//!
//! 每個子模組實現一個獨立的功能，包含主要邏輯和專用工具

pub mod clip_collection;
pub mod clip_importer;
pub mod project_store;
pub mod video_exporter;

pub use clip_collection::{ClipCollection, ClipRecord};
pub use clip_importer::ClipImporter;
pub use video_exporter::{Exporter, VideoExporter};
