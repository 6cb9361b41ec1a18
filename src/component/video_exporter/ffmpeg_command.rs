use super::options::ExportOptions;
use crate::component::clip_collection::ClipRecord;
use crate::tools::Resolution;
use log::warn;
use std::ffi::OsString;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

/// 需要把 moov atom 移到檔頭的容器
const FAST_START_EXTENSIONS: [&str; 3] = ["mp4", "mov", "m4v"];

/// 無法取得第一支影片解析度時的轉場輸出尺寸
const FALLBACK_RESOLUTION: Resolution = Resolution {
    width: 1280,
    height: 720,
};

const TRANSITION_FPS: u32 = 30;

#[must_use]
pub fn needs_fast_start(output: &Path) -> bool {
    output
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            FAST_START_EXTENSIONS
                .iter()
                .any(|e| e.eq_ignore_ascii_case(ext))
        })
}

fn is_webm(output: &Path) -> bool {
    output
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("webm"))
}

/// 一次 ffmpeg 呼叫的內容
#[derive(Debug, Clone, PartialEq)]
pub enum FfmpegCommand {
    /// concat demuxer + stream copy，不重新編碼
    StreamCopy {
        manifest: PathBuf,
        destination: PathBuf,
    },
    /// 以 xfade / acrossfade 串接並重新編碼
    ///
    /// `audio` 為 false 時 filter graph 只有影像，輸出不含音軌。
    Transition {
        inputs: Vec<PathBuf>,
        filter_graph: String,
        audio: bool,
        destination: PathBuf,
    },
}

impl FfmpegCommand {
    /// 選擇串接方式：可套用轉場時使用 filter graph，否則 stream copy
    #[must_use]
    pub fn plan(
        clips: &[Arc<ClipRecord>],
        manifest: &Path,
        destination: &Path,
        options: ExportOptions,
    ) -> Self {
        if let Some(name) = options.transition().xfade_name() {
            let audio = clips.iter().any(|c| c.has_audio() == Some(true));
            match Self::transition_graph(clips, name, options.transition_duration(), audio) {
                Some(filter_graph) => {
                    return Self::Transition {
                        inputs: clips.iter().map(|c| c.path().to_path_buf()).collect(),
                        filter_graph,
                        audio,
                        destination: destination.to_path_buf(),
                    };
                }
                None => warn!(
                    "無法套用轉場 {}（需要兩支以上且長度已知、長於轉場時間的影片），改用直接串接",
                    options.transition()
                ),
            }
        }

        Self::StreamCopy {
            manifest: manifest.to_path_buf(),
            destination: destination.to_path_buf(),
        }
    }

    /// 建立 xfade 串接的 filter graph；條件不足時回傳 `None`
    ///
    /// 有音訊時，沒有音軌（或無法判斷）的影片以等長的靜音補上。
    fn transition_graph(
        clips: &[Arc<ClipRecord>],
        name: &str,
        duration: f64,
        audio: bool,
    ) -> Option<String> {
        if clips.len() < 2 {
            return None;
        }

        let lengths: Vec<f64> = clips
            .iter()
            .map(|c| c.duration().map(|d| d.as_secs_f64()))
            .collect::<Option<_>>()?;
        if lengths.iter().any(|&len| len <= duration) {
            return None;
        }

        let size = clips[0]
            .resolution()
            .filter(|r| r.width > 0 && r.height > 0)
            .unwrap_or(FALLBACK_RESOLUTION);
        let (w, h) = (size.width, size.height);

        let mut graph = String::new();
        for (i, clip) in clips.iter().enumerate() {
            let _ = write!(
                graph,
                "[{i}:v]scale={w}:{h}:force_original_aspect_ratio=decrease,\
                 pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1,fps={TRANSITION_FPS},format=yuv420p[v{i}];"
            );
            if !audio {
                continue;
            }
            if clip.has_audio() == Some(true) {
                let _ = write!(
                    graph,
                    "[{i}:a]aformat=sample_rates=48000:channel_layouts=stereo[a{i}];"
                );
            } else {
                let _ = write!(
                    graph,
                    "anullsrc=r=48000:cl=stereo,atrim=duration={:.3}[a{i}];",
                    lengths[i]
                );
            }
        }

        let mut video = "v0".to_string();
        let mut mixed = "a0".to_string();
        let mut length = lengths[0];
        for (i, clip_length) in lengths.iter().enumerate().skip(1) {
            let offset = length - duration;
            let _ = write!(
                graph,
                "[{video}][v{i}]xfade=transition={name}:duration={duration:.3}:offset={offset:.3}[xv{i}];"
            );
            if audio {
                let _ = write!(graph, "[{mixed}][a{i}]acrossfade=d={duration:.3}[xa{i}];");
                mixed = format!("xa{i}");
            }
            video = format!("xv{i}");
            length += clip_length - duration;
        }
        graph.pop();

        Some(graph)
    }

    #[must_use]
    pub fn destination(&self) -> &Path {
        match self {
            Self::StreamCopy { destination, .. } | Self::Transition { destination, .. } => {
                destination
            }
        }
    }

    #[must_use]
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-loglevel", "error"]
            .into_iter()
            .map(OsString::from)
            .collect();

        match self {
            Self::StreamCopy { manifest, .. } => {
                args.extend(["-f", "concat", "-safe", "0", "-i"].map(OsString::from));
                args.push(manifest.into());
                args.extend(["-c", "copy"].map(OsString::from));
            }
            Self::Transition {
                inputs,
                filter_graph,
                audio,
                ..
            } => {
                let last = inputs.len().saturating_sub(1);
                for input in inputs {
                    args.push("-i".into());
                    args.push(input.into());
                }
                args.push("-filter_complex".into());
                args.push(filter_graph.into());
                args.push("-map".into());
                args.push(format!("[xv{last}]").into());

                let webm = is_webm(self.destination());
                let video_codec: &[&str] = if webm {
                    &["-c:v", "libvpx-vp9", "-crf", "32", "-b:v", "0"]
                } else {
                    &["-c:v", "libx264", "-crf", "18", "-preset", "medium"]
                };
                args.extend(video_codec.iter().map(OsString::from));

                if *audio {
                    args.push("-map".into());
                    args.push(format!("[xa{last}]").into());
                    let audio_codec: &[&str] = if webm {
                        &["-c:a", "libopus"]
                    } else {
                        &["-c:a", "aac", "-b:a", "192k"]
                    };
                    args.extend(audio_codec.iter().map(OsString::from));
                } else {
                    args.push("-an".into());
                }
            }
        }

        if needs_fast_start(self.destination()) {
            args.extend(["-movflags", "+faststart"].map(OsString::from));
        }

        args.push("-y".into());
        args.push(self.destination().into());
        args
    }

    #[must_use]
    pub fn build_command(&self, ffmpeg: &Path) -> Command {
        let mut cmd = Command::new(ffmpeg);
        cmd.args(self.args());
        cmd
    }
}
