use super::importer::{ImportSummary, import_folder};
use crate::component::clip_collection::ClipCollection;
use crate::config::Config;
use crate::tools::{scan_video_files, validate_directory_exists};
use anyhow::{Result, bail};
use console::style;
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 互動式加入影片（單一檔案或整個資料夾）
pub struct ClipImporter<'a> {
    collection: &'a ClipCollection,
    config: &'a Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl<'a> ClipImporter<'a> {
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

    pub fn add_file(&self) -> Result<()> {
        let path = prompt_path(&t!("import.file_prompt"))?;

        if !self.config.file_type_table.is_video_file(&path) {
            bail!(t!("import.not_video", path = path.display()).to_string());
        }

        self.collection.add(&path)?;
        println!(
            "{}",
            style(t!("import.file_added", path = path.display())).green()
        );
        Ok(())
    }

    pub fn add_folder(&self) -> Result<()> {
        let directory = prompt_path(&t!("import.folder_prompt"))?;
        validate_directory_exists(&directory)?;

        println!("{}", style(t!("import.scanning")).dim());
        let videos = scan_video_files(&directory, &self.config.file_type_table)?;

        if videos.is_empty() {
            println!("{}", style(t!("import.none_found")).yellow());
            return Ok(());
        }

        println!(
            "{}",
            style(t!("import.found", count = videos.len())).green()
        );

        let progress_bar = ProgressBar::new(videos.len() as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        progress_bar.set_message(t!("import.probing").to_string());

        let summary = import_folder(
            self.collection,
            &videos,
            &progress_bar,
            &self.shutdown_signal,
        );

        if summary.interrupted {
            progress_bar.abandon_with_message(t!("common.interrupted").to_string());
        } else {
            progress_bar.finish_with_message(t!("common.done").to_string());
        }

        print_summary(&summary);
        Ok(())
    }
}

fn prompt_path(prompt: &str) -> Result<PathBuf> {
    let raw: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact_text()?;
    Ok(clean_input_path(&raw))
}

/// 去除前後空白與拖放檔案時終端機加上的引號
pub fn clean_input_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| {
            trimmed
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
        })
        .unwrap_or(trimmed);
    Path::new(unquoted).to_path_buf()
}

fn print_summary(summary: &ImportSummary) {
    println!();
    println!(
        "  {} {}",
        t!("import.added"),
        style(summary.added).green()
    );
    if !summary.failed.is_empty() {
        println!(
            "  {} {}",
            t!("import.failed"),
            style(summary.failed.len()).red()
        );
        for (path, error) in &summary.failed {
            println!("    {} {}", style(path.display()).dim(), error);
        }
    }
}
