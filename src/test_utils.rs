//! 單元測試共用工具

use crate::error::ProbeError;
use crate::tools::{MediaProbe, Resolution, Thumbnail};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 回傳固定值的探測器，`None` 代表該查詢失敗
pub struct FixedProbe {
    pub duration: Option<Duration>,
    pub resolution: Option<Resolution>,
    pub audio: Option<bool>,
}

impl FixedProbe {
    pub const fn failing() -> Self {
        Self {
            duration: None,
            resolution: None,
            audio: None,
        }
    }

    pub const fn with_duration(seconds: u64) -> Self {
        Self {
            duration: Some(Duration::from_secs(seconds)),
            resolution: None,
            audio: Some(true),
        }
    }
}

impl MediaProbe for FixedProbe {
    fn duration(&self, _path: &Path) -> Result<Duration, ProbeError> {
        self.duration.ok_or(ProbeError::Disabled("duration"))
    }

    fn resolution(&self, _path: &Path) -> Result<Resolution, ProbeError> {
        self.resolution.ok_or(ProbeError::Disabled("resolution"))
    }

    fn has_audio(&self, _path: &Path) -> Result<bool, ProbeError> {
        self.audio.ok_or(ProbeError::Disabled("audio"))
    }

    fn thumbnail(&self, _path: &Path) -> Result<Thumbnail, ProbeError> {
        Err(ProbeError::Disabled("thumbnail"))
    }
}

/// 在資料夾中建立內容為檔名的假影片檔
pub fn make_files(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            fs::write(&path, name.as_bytes()).unwrap();
            path
        })
        .collect()
}
