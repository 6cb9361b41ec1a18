use crate::component::clip_importer::clean_input_path;
use crate::component::project_store;
use crate::component::{ClipImporter, VideoExporter};
use crate::config::save::{add_recent_path, save_settings};
use crate::menu::print_error;
use crate::menu::session::Session;
use crate::pause;
use anyhow::{Context, Result, bail};
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

/// 專案檔的預設副檔名
const PROJECT_EXTENSION: &str = "json";

/// 執行互動操作，錯誤只顯示不往上傳
fn run_step(term: &Term, step: impl FnOnce() -> Result<()>) -> Result<()> {
    if let Err(e) = step() {
        print_error(&e);
    }
    pause(term)
}

fn notice(text: impl std::fmt::Display) {
    println!("{}", style(text).yellow());
}

pub fn run_add_file(term: &Term, session: &mut Session) -> Result<()> {
    let importer = ClipImporter::new(
        session.collection(),
        &session.config,
        session.shutdown_signal(),
    );
    run_step(term, || importer.add_file())
}

pub fn run_add_folder(term: &Term, session: &mut Session) -> Result<()> {
    let importer = ClipImporter::new(
        session.collection(),
        &session.config,
        session.shutdown_signal(),
    );
    run_step(term, || importer.add_folder())
}

pub fn run_select_clip(term: &Term, session: &mut Session) -> Result<()> {
    let collection = session.collection();
    let clips = collection.snapshot();
    if clips.is_empty() {
        notice(t!("main_menu.empty_list"));
        return pause(term);
    }

    let items: Vec<String> = clips
        .iter()
        .enumerate()
        .map(|(i, clip)| format!("{:>3}. {}", i + 1, clip.display_name()))
        .collect();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("select.prompt"))
        .items(&items)
        .default(collection.selected_index().unwrap_or(0))
        .max_length(15)
        .interact_on_opt(term)?;

    if let Some(index) = selection {
        collection.set_selected(Some(index));
    }
    Ok(())
}

/// 需要選取項目的操作，沒有選取時顯示提示
fn with_selection(term: &Term, session: &Session, action: impl FnOnce(usize) -> bool) -> Result<()> {
    let Some(index) = session.collection().selected_index() else {
        notice(t!("select.none"));
        return pause(term);
    };

    if !action(index) {
        notice(t!("select.cannot_move"));
        return pause(term);
    }
    Ok(())
}

pub fn run_move_up(term: &Term, session: &mut Session) -> Result<()> {
    let collection = session.collection();
    with_selection(term, session, |_| collection.move_up())
}

pub fn run_move_down(term: &Term, session: &mut Session) -> Result<()> {
    let collection = session.collection();
    with_selection(term, session, |_| collection.move_down())
}

pub fn run_move_to_position(term: &Term, session: &mut Session) -> Result<()> {
    let collection = session.collection();
    let Some(from) = collection.selected_index() else {
        notice(t!("select.none"));
        return pause(term);
    };
    let count = collection.count();

    let position = Input::<usize>::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("select.position_prompt", max = count))
        .default(from + 1)
        .validate_with(|value: &usize| -> Result<(), String> {
            if (1..=count).contains(value) {
                Ok(())
            } else {
                Err(t!("select.position_invalid", max = count).to_string())
            }
        })
        .interact_text()?;

    if position - 1 != from {
        collection.move_item(from, position - 1);
    }
    Ok(())
}

pub fn run_remove_selected(term: &Term, session: &mut Session) -> Result<()> {
    match session.collection().remove_selected() {
        Some(clip) => {
            println!(
                "{}",
                style(t!("select.removed", name = clip.display_name())).green()
            );
            Ok(())
        }
        None => {
            notice(t!("select.none"));
            pause(term)
        }
    }
}

pub fn run_clear(term: &Term, session: &mut Session) -> Result<()> {
    if session.collection().is_empty() {
        return Ok(());
    }

    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.confirm_clear"))
        .default(false)
        .interact_on(term)?;

    if confirmed {
        session.collection().clear();
    }
    Ok(())
}

pub fn run_export(term: &Term, session: &mut Session) -> Result<()> {
    let exporter = VideoExporter::new(
        session.collection(),
        &session.config,
        session.shutdown_signal(),
    );
    run_step(term, || exporter.run().map(|_| ()))
}

/// 補上 `.json` 副檔名
fn with_project_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(PROJECT_EXTENSION)
    }
}

fn remember_project(session: &mut Session, path: &Path) {
    session.mark_saved(path);
    add_recent_path(&mut session.config.settings, &path.to_string_lossy());
    if let Err(e) = save_settings(&session.config.settings) {
        warn!("無法更新最近開啟的專案: {e:#}");
    }
}

pub fn run_save_project(term: &Term, session: &mut Session) -> Result<()> {
    let default = session.project_path().map_or_else(
        || format!("project.{PROJECT_EXTENSION}"),
        |path| path.display().to_string(),
    );

    let raw: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("project.save_prompt"))
        .default(default)
        .interact_text()?;
    let path = with_project_extension(clean_input_path(&raw));

    let result = project_store::save(&path, &session.collection().snapshot())
        .with_context(|| t!("project.save_failed").to_string());

    match result {
        Ok(()) => {
            remember_project(session, &path);
            println!(
                "{}",
                style(t!("project.saved", path = path.display())).green()
            );
        }
        Err(e) => print_error(&e),
    }
    pause(term)
}

/// 先讓使用者確認放棄未儲存的變更
fn confirm_discard(term: &Term, session: &Session) -> Result<bool> {
    if !session.is_modified() {
        return Ok(true);
    }

    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("project.confirm_discard"))
        .default(false)
        .interact_on(term)?)
}

fn prompt_project_path(term: &Term, session: &Session) -> Result<Option<PathBuf>> {
    let recent = &session.config.settings.recent_paths;
    if recent.is_empty() {
        return prompt_typed_path().map(Some);
    }

    let mut items: Vec<String> = recent.clone();
    items.push(t!("project.other_path").to_string());

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("project.load_prompt"))
        .items(&items)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(i) if i < recent.len() => Ok(Some(PathBuf::from(&recent[i]))),
        Some(_) => prompt_typed_path().map(Some),
        None => Ok(None),
    }
}

fn prompt_typed_path() -> Result<PathBuf> {
    let raw: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("project.path_prompt"))
        .interact_text()?;
    Ok(clean_input_path(&raw))
}

pub fn run_load_project(term: &Term, session: &mut Session) -> Result<()> {
    if !confirm_discard(term, session)? {
        return Ok(());
    }
    let Some(path) = prompt_project_path(term, session)? else {
        return Ok(());
    };

    println!("{}", style(t!("project.loading")).dim());
    match project_store::load_into(session.collection(), &path) {
        Ok(report) => {
            remember_project(session, &path);
            println!(
                "{}",
                style(t!("project.loaded", count = report.added)).green()
            );
            if !report.is_complete() {
                notice(t!("project.skipped", count = report.skipped.len()));
                for (video, error) in &report.skipped {
                    println!("    {} {}", style(video.display()).dim(), error);
                }
            }
        }
        Err(e) => print_error(&anyhow::Error::new(e)),
    }
    pause(term)
}

pub fn run_new_project(term: &Term, session: &mut Session) -> Result<()> {
    if confirm_discard(term, session)? {
        session.reset();
    }
    Ok(())
}

pub fn run_save_preview_frame(term: &Term, session: &mut Session) -> Result<()> {
    run_step(term, || {
        let Some(clip) = session.collection().selected() else {
            bail!(t!("select.none").to_string());
        };
        let Some(thumbnail) = clip.thumbnail() else {
            bail!(t!("preview.unavailable", name = clip.display_name()).to_string());
        };

        let stem = clip
            .path()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "preview".to_string());
        let raw: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("preview.path_prompt"))
            .default(format!("{stem}_preview.png"))
            .interact_text()?;
        let path = clean_input_path(&raw);

        fs::write(&path, thumbnail.as_png())
            .with_context(|| format!("{}: {}", t!("preview.write_failed"), path.display()))?;
        println!(
            "{}",
            style(t!("preview.saved", path = path.display())).green()
        );
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_extension_added_only_when_missing() {
        assert_eq!(
            with_project_extension(PathBuf::from("/p/demo")),
            PathBuf::from("/p/demo.json")
        );
        assert_eq!(
            with_project_extension(PathBuf::from("/p/demo.json")),
            PathBuf::from("/p/demo.json")
        );
        assert_eq!(
            with_project_extension(PathBuf::from("/p/demo.list")),
            PathBuf::from("/p/demo.list")
        );
    }
}
