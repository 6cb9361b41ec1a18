use super::ffmpeg_command::FfmpegCommand;
use super::manifest::write_manifest;
use super::options::ExportOptions;
use crate::component::clip_collection::ClipRecord;
use crate::error::ExportError;
use crossbeam_channel::{Receiver, Sender};
use log::{error, info, warn};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 匯出過程中送出的事件，最後一定是 `Done` 或 `Failed` 其中之一
#[derive(Debug)]
pub enum ExportEvent {
    Status(String),
    Done,
    Failed(ExportError),
}

impl ExportEvent {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Status(text) => text.clone(),
            Self::Done => "Export complete!".to_string(),
            Self::Failed(e) => e.to_string(),
        }
    }
}

/// 依序取得匯出事件；終止事件之後回傳 `None`
pub struct ExportProgress {
    events: Receiver<ExportEvent>,
    worker: Option<JoinHandle<()>>,
    finished: bool,
}

impl ExportProgress {
    /// 消耗所有事件，回傳最終結果
    pub fn wait(self) -> Result<(), ExportError> {
        self.wait_with(|_| {})
    }

    /// 同 `wait`，但每個狀態事件都會交給 `on_status`
    pub fn wait_with(mut self, mut on_status: impl FnMut(&str)) -> Result<(), ExportError> {
        while let Some(event) = self.next() {
            match event {
                ExportEvent::Status(text) => on_status(&text),
                ExportEvent::Done => return Ok(()),
                ExportEvent::Failed(e) => return Err(e),
            }
        }
        Err(ExportError::Cancelled)
    }

    fn finish(&mut self) {
        self.finished = true;
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            error!("匯出執行緒異常結束");
        }
    }
}

impl Iterator for ExportProgress {
    type Item = ExportEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if let Ok(event) = self.events.recv() {
            if event.is_terminal() {
                self.finish();
            }
            Some(event)
        } else {
            self.finish();
            None
        }
    }
}

/// 以 ffmpeg 把影片清單串接成單一檔案
#[derive(Debug, Clone)]
pub struct Exporter {
    ffmpeg: PathBuf,
    cancel: Option<Arc<AtomicBool>>,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            cancel: None,
        }
    }

    #[must_use]
    pub fn with_ffmpeg(mut self, ffmpeg: impl Into<PathBuf>) -> Self {
        self.ffmpeg = ffmpeg.into();
        self
    }

    /// 旗標被設為 `true` 時終止 ffmpeg 並刪除未完成的輸出
    #[must_use]
    pub fn with_cancel_signal(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// 在背景執行緒開始匯出，立即回傳事件序列
    pub fn export(
        &self,
        clips: Vec<Arc<ClipRecord>>,
        output: impl Into<PathBuf>,
        options: ExportOptions,
    ) -> ExportProgress {
        let (sender, receiver) = crossbeam_channel::bounded(0);
        let job = ExportJob {
            ffmpeg: self.ffmpeg.clone(),
            cancel: self.cancel.clone(),
            events: sender,
        };
        let output = output.into();

        let worker = thread::spawn(move || job.run(&clips, &output, options));

        ExportProgress {
            events: receiver,
            worker: Some(worker),
            finished: false,
        }
    }
}

struct ExportJob {
    ffmpeg: PathBuf,
    cancel: Option<Arc<AtomicBool>>,
    events: Sender<ExportEvent>,
}

impl ExportJob {
    fn run(self, clips: &[Arc<ClipRecord>], output: &Path, options: ExportOptions) {
        let event = match self.combine(clips, output, options) {
            Ok(()) => {
                info!("匯出完成: {}", output.display());
                ExportEvent::Done
            }
            Err(e) => {
                warn!("匯出失敗 ({}): {e}", output.display());
                ExportEvent::Failed(e)
            }
        };
        // 接收端已放棄時不需處理
        let _ = self.events.send(event);
    }

    fn status(&self, text: &str) {
        let _ = self.events.send(ExportEvent::Status(text.to_string()));
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// 清單檔的生命週期限定在此函式內，回傳前即刪除
    fn combine(
        &self,
        clips: &[Arc<ClipRecord>],
        output: &Path,
        options: ExportOptions,
    ) -> Result<(), ExportError> {
        if clips.is_empty() {
            return Err(ExportError::NoClips);
        }

        self.status("Preparing export...");
        let manifest = write_manifest(clips).map_err(ExportError::Setup)?;

        self.status("Combining videos...");
        if self.cancelled() {
            return Err(ExportError::Cancelled);
        }

        let command = FfmpegCommand::plan(clips, manifest.path(), output, options);
        let mut child = command
            .build_command(&self.ffmpeg)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(ExportError::Spawn)?;

        info!(
            "啟動 ffmpeg [{}]: {} 支影片 -> {}",
            child.id(),
            clips.len(),
            output.display()
        );

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    stop(&mut child);
                    return Err(wait_failed(&e, stdout, stderr));
                }
            }

            if self.cancelled() {
                stop(&mut child);
                remove_partial(output);
                info!("匯出已取消: {}", output.display());
                return Err(ExportError::Cancelled);
            }

            thread::sleep(POLL_INTERVAL);
        };

        let text = combined_output(stdout, stderr);

        if status.success() {
            Ok(())
        } else {
            Err(ExportError::Process {
                status: status.to_string(),
                output: text,
            })
        }
    }
}

/// 在獨立執行緒讀完子程序的輸出，避免管線塞滿
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    let mut pipe = pipe?;
    Some(thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = pipe.read_to_end(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }))
}

fn collect(reader: Option<JoinHandle<String>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

/// stdout 在前、stderr 在後，不保留交錯順序
fn combined_output(
    stdout: Option<JoinHandle<String>>,
    stderr: Option<JoinHandle<String>>,
) -> String {
    let mut text = collect(stdout);
    text.push_str(&collect(stderr));
    text
}

/// 無法取得子程序狀態時仍附上已讀到的輸出
fn wait_failed(
    error: &io::Error,
    stdout: Option<JoinHandle<String>>,
    stderr: Option<JoinHandle<String>>,
) -> ExportError {
    ExportError::Process {
        status: "unknown".to_string(),
        output: format!("{error}\n{}", combined_output(stdout, stderr)),
    }
}

fn stop(child: &mut Child) {
    if let Err(e) = child.kill() {
        warn!("無法終止 ffmpeg [{}]: {e}", child.id());
    }
    let _ = child.wait();
}

fn remove_partial(output: &Path) {
    if output.exists()
        && let Err(e) = fs::remove_file(output)
    {
        warn!("無法刪除未完成的輸出 {}: {e}", output.display());
    }
}
