//! ffmpeg concat demuxer 清單檔
//!
//! 每行 `file '<路徑>'`，路徑中的 `'` 寫成 `'\''`。

use crate::component::clip_collection::ClipRecord;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// 以單引號包住路徑，內含的單引號寫成 `'\''`
#[must_use]
pub fn quote_path(path: &Path) -> String {
    let raw = path.to_string_lossy();
    format!("'{}'", raw.replace('\'', r"'\''"))
}

#[must_use]
pub fn manifest_line(path: &Path) -> String {
    format!("file {}\n", quote_path(path))
}

/// 建立暫存清單檔；回傳的 `NamedTempFile` 被 drop 時檔案即刪除
pub fn write_manifest(clips: &[Arc<ClipRecord>]) -> io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("video-list-")
        .suffix(".txt")
        .tempfile()?;

    for clip in clips {
        file.write_all(manifest_line(clip.path()).as_bytes())?;
    }
    file.flush()?;

    Ok(file)
}

/// 依 concat 格式的引號規則解析一行 `file` 指令
///
/// 單引號內為字面值，引號外可用反斜線跳脫單一字元。
#[must_use]
pub fn parse_manifest_line(line: &str) -> Option<PathBuf> {
    let rest = line.trim_end_matches(['\n', '\r']).strip_prefix("file")?;
    let rest = rest.trim_start();

    let mut path = String::new();
    let mut chars = rest.chars();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        match c {
            '\'' => in_quotes = !in_quotes,
            '\\' if !in_quotes => path.push(chars.next()?),
            c if c.is_whitespace() && !in_quotes => break,
            c => path.push(c),
        }
    }

    (!in_quotes && !path.is_empty()).then(|| PathBuf::from(path))
}
