//! 加入影片：單一檔案或遞迴掃描資料夾

mod importer;
mod main;

pub use importer::{ImportSummary, import_folder, import_paths};
pub use main::{ClipImporter, clean_input_path};
