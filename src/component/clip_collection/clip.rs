use crate::error::ClipError;
use crate::tools::{MediaProbe, Resolution, Thumbnail, format_duration, format_size};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 專案中的一支影片
///
/// 建立後不可變；在集合中只有位置會改變。
#[derive(Debug, Clone)]
pub struct ClipRecord {
    path: PathBuf,
    display_name: String,
    size_bytes: u64,
    duration: Option<Duration>,
    resolution: Option<Resolution>,
    has_audio: Option<bool>,
    thumbnail: Option<Thumbnail>,
}

impl ClipRecord {
    /// 讀取檔案資訊並探測媒體屬性
    ///
    /// 只有 stat 失敗或不是一般檔案才會回傳錯誤，個別探測失敗只會讓該欄位留空。
    pub fn new(path: impl AsRef<Path>, probe: &dyn MediaProbe) -> Result<Self, ClipError> {
        let mut record = Self::from_metadata(path.as_ref())?;

        match probe.duration(&record.path) {
            Ok(duration) => record.duration = Some(duration),
            Err(e) => debug!("無法取得影片長度 {}: {e}", record.path.display()),
        }
        match probe.resolution(&record.path) {
            Ok(resolution) => record.resolution = Some(resolution),
            Err(e) => debug!("無法取得影片解析度 {}: {e}", record.path.display()),
        }
        match probe.has_audio(&record.path) {
            Ok(has_audio) => record.has_audio = Some(has_audio),
            Err(e) => debug!("無法判斷是否有音訊 {}: {e}", record.path.display()),
        }
        match probe.thumbnail(&record.path) {
            Ok(thumbnail) => record.thumbnail = Some(thumbnail),
            Err(e) => debug!("無法擷取縮圖 {}: {e}", record.path.display()),
        }

        Ok(record)
    }

    /// 只讀取檔案系統資訊，不做媒體探測
    pub fn from_metadata(path: &Path) -> Result<Self, ClipError> {
        let inaccessible = |source| ClipError::Inaccessible {
            path: path.to_path_buf(),
            source,
        };

        let path = std::path::absolute(path).map_err(inaccessible)?;
        let metadata = fs::metadata(&path).map_err(inaccessible)?;
        if !metadata.is_file() {
            return Err(ClipError::NotAFile(path));
        }

        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            path,
            display_name,
            size_bytes: metadata.len(),
            duration: None,
            resolution: None,
            has_audio: None,
            thumbnail: None,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    #[must_use]
    pub const fn duration(&self) -> Option<Duration> {
        self.duration
    }

    #[must_use]
    pub const fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    /// `None` 代表探測失敗
    #[must_use]
    pub const fn has_audio(&self) -> Option<bool> {
        self.has_audio
    }

    #[must_use]
    pub const fn thumbnail(&self) -> Option<&Thumbnail> {
        self.thumbnail.as_ref()
    }

    #[must_use]
    pub fn folder(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    #[must_use]
    pub fn size_string(&self) -> String {
        format_size(self.size_bytes)
    }

    #[must_use]
    pub fn duration_string(&self) -> String {
        self.duration.map(format_duration).unwrap_or_default()
    }

    #[must_use]
    pub fn resolution_string(&self) -> String {
        match self.resolution {
            Some(r) if r.width > 0 && r.height > 0 => r.to_string(),
            _ => String::new(),
        }
    }
}
