use crate::config::FileTypeTable;
use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 遞迴掃描資料夾中的影片檔案，依路徑字典序回傳
pub fn scan_video_files(directory: &Path, file_type_table: &FileTypeTable) -> Result<Vec<PathBuf>> {
    let video_files = WalkDir::new(directory)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| file_type_table.is_video_file(entry.path()))
        .map(walkdir::DirEntry::into_path)
        .collect();

    Ok(video_files)
}
