use crate::component::video_exporter::{DEFAULT_TRANSITION_SECONDS, Transition};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// 最近開啟的專案保留數量
pub const MAX_RECENT_PATHS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTypeTable {
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
    #[serde(rename = "PROJECT_FILE")]
    pub project_file: Vec<String>,
}

impl FileTypeTable {
    #[must_use]
    pub fn video_extensions_set(&self) -> HashSet<String> {
        self.video_file
            .iter()
            .map(|ext| ext.to_lowercase())
            .collect()
    }

    #[must_use]
    pub fn is_video_file(&self, path: &Path) -> bool {
        Self::matches(&self.video_file, path)
    }

    #[must_use]
    pub fn is_project_file(&self, path: &Path) -> bool {
        Self::matches(&self.project_file, path)
    }

    fn matches(extensions: &[String], path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let dotted = format!(".{}", ext.to_lowercase());
                extensions.iter().any(|e| e.eq_ignore_ascii_case(&dotted))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl Language {
    pub const ALL: [Self; 2] = [Self::EnUs, Self::ZhTw];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::ZhTw => "zh-TW",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnUs => write!(f, "English"),
            Self::ZhTw => write!(f, "繁體中文"),
        }
    }
}

/// 匯出對話框的預設值
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportSettings {
    pub transition: Transition,
    pub transition_duration_seconds: f64,
    pub default_file_name: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            transition: Transition::None,
            transition_duration_seconds: DEFAULT_TRANSITION_SECONDS,
            default_file_name: "combined.mp4".to_string(),
        }
    }
}

/// 外部工具設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolSettings {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub generate_thumbnails: bool,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            generate_thumbnails: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    pub recent_paths: Vec<String>,
    pub export: ExportSettings,
    pub tools: ToolSettings,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub file_type_table: FileTypeTable,
    pub settings: UserSettings,
}
