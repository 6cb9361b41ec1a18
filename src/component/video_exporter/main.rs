use super::options::{ExportOptions, Transition};
use super::pipeline::{ExportEvent, Exporter};
use crate::component::clip_collection::ClipCollection;
use crate::config::Config;
use crate::tools::{format_duration, validate_output_parent};
use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub fn transition_label(transition: Transition) -> String {
    match transition {
        Transition::None => t!("export.transition_none").to_string(),
        Transition::Fade => t!("export.transition_fade").to_string(),
        Transition::Crossfade => t!("export.transition_crossfade").to_string(),
    }
}

/// 互動式匯出流程
pub struct VideoExporter<'a> {
    collection: &'a ClipCollection,
    config: &'a Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl<'a> VideoExporter<'a> {
    pub const fn new(
        collection: &'a ClipCollection,
        config: &'a Config,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            collection,
            config,
            shutdown_signal,
        }
    }

    /// 回傳是否成功輸出檔案
    pub fn run(&self) -> Result<bool> {
        println!("{}", style(t!("export.title")).cyan().bold());

        let clips = self.collection.snapshot();
        if clips.is_empty() {
            println!("{}", style(t!("export.empty")).yellow());
            return Ok(false);
        }

        let total = self
            .collection
            .total_duration()
            .map(format_duration)
            .unwrap_or_default();
        println!(
            "{}",
            style(t!("export.summary", count = clips.len(), total = total)).dim()
        );

        let Some(options) = self.prompt_options()? else {
            return Ok(false);
        };
        let output = self.prompt_output_path()?;
        validate_output_parent(&output)?;

        if output.exists()
            && !Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(t!("export.overwrite", path = output.display()))
                .default(false)
                .interact()?
        {
            return Ok(false);
        }

        info!(
            "開始匯出 {} 支影片 -> {} (轉場: {})",
            clips.len(),
            output.display(),
            options.transition()
        );

        self.shutdown_signal.store(false, Ordering::SeqCst);
        let progress = Exporter::new()
            .with_ffmpeg(&self.config.settings.tools.ffmpeg_path)
            .with_cancel_signal(Arc::clone(&self.shutdown_signal))
            .export(clips, &output, options);

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(120));

        let mut succeeded = false;
        for event in progress {
            match &event {
                ExportEvent::Status(_) => spinner.set_message(event.message()),
                ExportEvent::Done => {
                    spinner.finish_with_message(event.message());
                    println!(
                        "{}",
                        style(t!("export.saved", path = output.display())).green()
                    );
                    succeeded = true;
                }
                ExportEvent::Failed(_) => {
                    spinner.abandon_with_message(t!("export.failed").to_string());
                    eprintln!("{} {}", style(t!("common.error_prefix")).red().bold(), event.message());
                }
            }
        }

        // Ctrl-C 只用來中斷這一次匯出
        self.shutdown_signal.store(false, Ordering::SeqCst);
        Ok(succeeded)
    }

    /// ESC 時回傳 `None`
    fn prompt_options(&self) -> Result<Option<ExportOptions>> {
        let defaults = &self.config.settings.export;
        let labels: Vec<String> = Transition::ALL.iter().map(|&t| transition_label(t)).collect();
        let default_index = Transition::ALL
            .iter()
            .position(|&t| t == defaults.transition)
            .unwrap_or(0);

        let Some(index) = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("export.transition_prompt"))
            .items(&labels)
            .default(default_index)
            .interact_opt()?
        else {
            return Ok(None);
        };
        let transition = Transition::ALL[index];

        if transition == Transition::None {
            return Ok(Some(ExportOptions::new(transition, None)));
        }

        let seconds: f64 = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("export.duration_prompt"))
            .default(defaults.transition_duration_seconds)
            .validate_with(|value: &f64| -> Result<(), String> {
                if value.is_finite() && *value > 0.0 {
                    Ok(())
                } else {
                    Err(t!("export.duration_invalid").to_string())
                }
            })
            .interact_text()?;

        Ok(Some(ExportOptions::new(transition, Some(seconds))))
    }

    fn prompt_output_path(&self) -> Result<PathBuf> {
        let path: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("export.output_prompt"))
            .default(self.config.settings.export.default_file_name.clone())
            .interact_text()?;
        Ok(PathBuf::from(path.trim()))
    }
}
