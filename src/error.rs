//! 核心模組的錯誤型別
//!
//! 應用層（選單、設定）一律使用 `anyhow`，這裡只放需要被呼叫端區分的錯誤。

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 建立 `ClipRecord` 失敗（路徑無法存取或不是一般檔案）
#[derive(Debug, Error)]
pub enum ClipError {
    #[error("cannot access {}: {source}", path.display())]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("not a regular file: {}", .0.display())]
    NotAFile(PathBuf),
}

/// 單一媒體屬性探測失敗，只會讓該欄位留空
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("unexpected {what} output: {output:?}")]
    Parse { what: &'static str, output: String },

    #[error("{0} probing is disabled")]
    Disabled(&'static str),
}

/// 匯出流程的終止錯誤，只會以 `ExportEvent::Failed` 的形式送出
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no clips to export")]
    NoClips,

    #[error("failed to prepare export manifest: {0}")]
    Setup(#[source] io::Error),

    #[error("failed to start ffmpeg: {0}")]
    Spawn(#[source] io::Error),

    /// ffmpeg 以非零狀態結束；`output` 是 stdout 接著 stderr，不是實際交錯的順序
    #[error("ffmpeg error: {status}\n{output}")]
    Process { status: String, output: String },

    #[error("cancelled")]
    Cancelled,
}

/// 專案檔讀寫失敗
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("cannot access project file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid project file {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
