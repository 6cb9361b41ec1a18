use crate::config::types::{Config, FileTypeTable, UserSettings};
use anyhow::{Context, Result};
use log::warn;
use std::fs;
use std::path::Path;

/// 編譯時嵌入的檔案類型設定（不需要外部檔案）
const FILE_TYPE_TABLE_JSON: &str = include_str!("../../data/file_type_table.json");

/// 使用者設定檔（位於目前工作目錄）
pub const SETTINGS_FILE: &str = "settings.json";

impl Config {
    pub fn new() -> Result<Self> {
        let file_type_table = Self::load_embedded_file_type_table()?;
        let settings = Self::load_settings(Path::new(SETTINGS_FILE)).unwrap_or_else(|e| {
            warn!("設定檔讀取失敗，改用預設值: {e:#}");
            UserSettings::default()
        });

        Ok(Self {
            file_type_table,
            settings,
        })
    }

    pub fn load_settings(path: &Path) -> Result<UserSettings> {
        if !path.exists() {
            return Ok(UserSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }

    /// 從編譯時嵌入的 JSON 載入檔案類型表
    fn load_embedded_file_type_table() -> Result<FileTypeTable> {
        serde_json::from_str(FILE_TYPE_TABLE_JSON).context("無法解析嵌入的檔案類型設定")
    }
}
