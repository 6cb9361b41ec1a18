//! 顯示用的大小 / 時長格式化

use std::time::Duration;

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// 檔案大小，整數值不顯示小數（例如 "2 KB"、"1.5 MB"）
#[must_use]
pub fn format_size(bytes: u64) -> String {
    let (value, unit) = match bytes {
        b if b >= GB => (b as f64 / GB as f64, "GB"),
        b if b >= MB => (b as f64 / MB as f64, "MB"),
        b if b >= KB => (b as f64 / KB as f64, "KB"),
        b => (b as f64, "B"),
    };

    if value.fract() == 0.0 {
        format!("{value:.0} {unit}")
    } else {
        format!("{value:.1} {unit}")
    }
}

/// 影片時長，未滿一小時為 "m:ss"，否則 "h:mm:ss"；零值回傳空字串
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    if total == 0 {
        return String::new();
    }

    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;

    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}
