use crate::component::clip_collection::{ClipCollection, ClipRecord};
use crate::error::{ClipError, ProjectError};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 專案檔內容，只保存影片路徑與順序
#[derive(Debug, Default, Serialize, Deserialize)]
struct ProjectFile {
    videos: Vec<PathBuf>,
}

/// `load_into` 的結果：成功加入的數量與被略過的路徑
#[derive(Debug, Default)]
pub struct LoadReport {
    pub added: usize,
    pub skipped: Vec<(PathBuf, ClipError)>,
}

impl LoadReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

pub fn save(path: &Path, clips: &[Arc<ClipRecord>]) -> Result<(), ProjectError> {
    let project = ProjectFile {
        videos: clips.iter().map(|c| c.path().to_path_buf()).collect(),
    };

    let content = serde_json::to_string_pretty(&project).map_err(|source| ProjectError::Format {
        path: path.to_path_buf(),
        source,
    })?;

    fs::write(path, content).map_err(|source| ProjectError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!("已儲存專案 ({} 支影片): {}", clips.len(), path.display());
    Ok(())
}

pub fn load(path: &Path) -> Result<Vec<PathBuf>, ProjectError> {
    let content = fs::read_to_string(path).map_err(|source| ProjectError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let project: ProjectFile =
        serde_json::from_str(&content).map_err(|source| ProjectError::Format {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(project.videos)
}

/// 讀取專案檔後以其內容取代清單
///
/// 檔案讀取或解析失敗時清單保持原狀；個別影片失敗只記錄在報告中
pub fn load_into(collection: &ClipCollection, path: &Path) -> Result<LoadReport, ProjectError> {
    let videos = load(path)?;

    collection.clear();

    let mut report = LoadReport::default();
    for video in videos {
        match collection.add(&video) {
            Ok(()) => report.added += 1,
            Err(e) => {
                warn!("略過無法載入的影片 {}: {e}", video.display());
                report.skipped.push((video, e));
            }
        }
    }

    info!(
        "已載入專案 {}: {} 支影片，略過 {} 支",
        path.display(),
        report.added,
        report.skipped.len()
    );
    Ok(report)
}
