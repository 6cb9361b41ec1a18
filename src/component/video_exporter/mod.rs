//! 影片匯出元件
//!
//! 把清單寫成 concat 清單檔後呼叫 ffmpeg 串接，進度以事件序列回報

mod ffmpeg_command;
mod main;
pub mod manifest;
mod options;
mod pipeline;

pub use ffmpeg_command::{FfmpegCommand, needs_fast_start};
pub use main::{VideoExporter, transition_label};
pub use options::{DEFAULT_TRANSITION_SECONDS, ExportOptions, Transition};
pub use pipeline::{ExportEvent, ExportProgress, Exporter};
