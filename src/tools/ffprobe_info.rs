use crate::error::ProbeError;
use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::Duration;

/// 預覽縮圖寬度（高度依比例縮放）
pub const THUMBNAIL_WIDTH: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// 單張預覽畫面（PNG 編碼）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    png: Vec<u8>,
}

impl Thumbnail {
    #[must_use]
    pub const fn from_png(png: Vec<u8>) -> Self {
        Self { png }
    }

    #[must_use]
    pub fn as_png(&self) -> &[u8] {
        &self.png
    }
}

/// 媒體探測介面
///
/// 各查詢彼此獨立，任何一個失敗都不影響其他查詢。
pub trait MediaProbe: Send + Sync {
    fn duration(&self, path: &Path) -> Result<Duration, ProbeError>;
    fn resolution(&self, path: &Path) -> Result<Resolution, ProbeError>;
    /// 是否至少有一條音訊串流
    fn has_audio(&self, path: &Path) -> Result<bool, ProbeError>;
    fn thumbnail(&self, path: &Path) -> Result<Thumbnail, ProbeError>;
}

/// 透過 ffprobe / ffmpeg 子行程實作的探測器
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    ffprobe: PathBuf,
    ffmpeg: PathBuf,
    thumbnails: bool,
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self::new("ffprobe", "ffmpeg", true)
    }
}

impl FfprobeProbe {
    pub fn new(ffprobe: impl Into<PathBuf>, ffmpeg: impl Into<PathBuf>, thumbnails: bool) -> Self {
        Self {
            ffprobe: ffprobe.into(),
            ffmpeg: ffmpeg.into(),
            thumbnails,
        }
    }

    fn run(program: &Path, command: &mut Command) -> Result<Output, ProbeError> {
        let tool = program.display().to_string();
        let output = command.output().map_err(|source| ProbeError::Spawn {
            tool: tool.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                tool,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output)
    }
}

impl MediaProbe for FfprobeProbe {
    fn duration(&self, path: &Path) -> Result<Duration, ProbeError> {
        let output = Self::run(
            &self.ffprobe,
            Command::new(&self.ffprobe)
                .args([
                    "-v",
                    "error",
                    "-show_entries",
                    "format=duration",
                    "-of",
                    "default=noprint_wrappers=1:nokey=1",
                ])
                .arg(path),
        )?;

        parse_duration(&String::from_utf8_lossy(&output.stdout))
    }

    fn resolution(&self, path: &Path) -> Result<Resolution, ProbeError> {
        let output = Self::run(
            &self.ffprobe,
            Command::new(&self.ffprobe)
                .args([
                    "-v",
                    "error",
                    "-select_streams",
                    "v:0",
                    "-show_entries",
                    "stream=width,height",
                    "-of",
                    "csv=s=x:p=0",
                ])
                .arg(path),
        )?;

        parse_resolution(&String::from_utf8_lossy(&output.stdout))
    }

    fn has_audio(&self, path: &Path) -> Result<bool, ProbeError> {
        let output = Self::run(
            &self.ffprobe,
            Command::new(&self.ffprobe)
                .args([
                    "-v",
                    "error",
                    "-select_streams",
                    "a:0",
                    "-show_entries",
                    "stream=index",
                    "-of",
                    "csv=p=0",
                ])
                .arg(path),
        )?;

        Ok(parse_has_audio(&String::from_utf8_lossy(&output.stdout)))
    }

    fn thumbnail(&self, path: &Path) -> Result<Thumbnail, ProbeError> {
        if !self.thumbnails {
            return Err(ProbeError::Disabled("thumbnail"));
        }

        let filter = format!("scale={THUMBNAIL_WIDTH}:-1");
        let output = Self::run(
            &self.ffmpeg,
            Command::new(&self.ffmpeg)
                .args(["-hide_banner", "-nostdin", "-loglevel", "error", "-i"])
                .arg(path)
                .args([
                    "-vframes",
                    "1",
                    "-f",
                    "image2pipe",
                    "-vcodec",
                    "png",
                    "-vf",
                    filter.as_str(),
                    "-",
                ]),
        )?;

        if output.stdout.is_empty() {
            return Err(ProbeError::Parse {
                what: "thumbnail",
                output: String::new(),
            });
        }

        debug!("擷取縮圖 {} ({} bytes)", path.display(), output.stdout.len());
        Ok(Thumbnail::from_png(output.stdout))
    }
}

/// 解析 ffprobe 輸出的單行秒數（例如 "12.345000"）
pub fn parse_duration(raw: &str) -> Result<Duration, ProbeError> {
    let trimmed = raw.trim();
    let seconds: f64 = trimmed.parse().map_err(|_| ProbeError::Parse {
        what: "duration",
        output: trimmed.to_string(),
    })?;

    Duration::try_from_secs_f64(seconds).map_err(|_| ProbeError::Parse {
        what: "duration",
        output: trimmed.to_string(),
    })
}

/// 解析 `WIDTHxHEIGHT` 格式的解析度
pub fn parse_resolution(raw: &str) -> Result<Resolution, ProbeError> {
    let trimmed = raw.trim();
    let parse_error = || ProbeError::Parse {
        what: "resolution",
        output: trimmed.to_string(),
    };

    let (width, height) = trimmed.split_once('x').ok_or_else(parse_error)?;
    let width = width.parse().map_err(|_| parse_error())?;
    let height = height.parse().map_err(|_| parse_error())?;

    Ok(Resolution { width, height })
}

/// 音訊串流查詢沒有輸出代表檔案沒有音訊
#[must_use]
pub fn parse_has_audio(raw: &str) -> bool {
    !raw.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        let duration = parse_duration("12.500000\n").unwrap();
        assert_eq!(duration, Duration::from_millis(12_500));
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert!(parse_duration("N/A").is_err());
        assert!(parse_duration("").is_err());
        assert!(parse_duration("-3.0").is_err());
    }

    #[test]
    fn test_parse_resolution() {
        let resolution = parse_resolution("1920x1080\n").unwrap();
        assert_eq!(
            resolution,
            Resolution {
                width: 1920,
                height: 1080
            }
        );
        assert_eq!(resolution.to_string(), "1920x1080");
    }

    #[test]
    fn test_parse_resolution_invalid() {
        assert!(parse_resolution("1920").is_err());
        assert!(parse_resolution("axb").is_err());
        assert!(parse_resolution("1920x1080x3").is_err());
    }

    #[test]
    fn test_parse_has_audio() {
        assert!(parse_has_audio("1\n"));
        assert!(!parse_has_audio(""));
        assert!(!parse_has_audio("  \n"));
    }

    #[test]
    fn test_missing_binary_fails_each_query_independently() {
        let probe = FfprobeProbe::new("/nonexistent/ffprobe", "/nonexistent/ffmpeg", true);
        let path = Path::new("/tmp/whatever.mp4");

        assert!(matches!(probe.duration(path), Err(ProbeError::Spawn { .. })));
        assert!(matches!(probe.resolution(path), Err(ProbeError::Spawn { .. })));
        assert!(matches!(probe.has_audio(path), Err(ProbeError::Spawn { .. })));
        assert!(matches!(probe.thumbnail(path), Err(ProbeError::Spawn { .. })));
    }

    #[test]
    fn test_thumbnail_disabled() {
        let probe = FfprobeProbe::new("ffprobe", "ffmpeg", false);
        assert!(matches!(
            probe.thumbnail(Path::new("/tmp/a.mp4")),
            Err(ProbeError::Disabled(_))
        ));
    }
}
