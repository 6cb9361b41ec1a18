use crate::menu::handlers::{
    run_add_file, run_add_folder, run_clear, run_export, run_load_project, run_move_down,
    run_move_to_position, run_move_up, run_new_project, run_remove_selected,
    run_save_preview_frame, run_save_project, run_select_clip,
};
use crate::menu::session::Session;
use crate::menu::settings_menu::show_settings_menu;
use crate::tools::format_duration;
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Select};

/// 主選單，回傳 `false` 代表結束程式
pub fn show_main_menu(term: &Term, session: &mut Session) -> Result<bool> {
    term.clear_screen()?;

    print_header(session);
    print_clip_list(session);
    println!("{}", style(t!("common.esc_hint")).dim());

    let options = vec![
        t!("main_menu.opt_add_file"),
        t!("main_menu.opt_add_folder"),
        t!("main_menu.opt_select"),
        t!("main_menu.opt_move_up"),
        t!("main_menu.opt_move_down"),
        t!("main_menu.opt_move_to"),
        t!("main_menu.opt_remove"),
        t!("main_menu.opt_clear"),
        t!("main_menu.opt_export"),
        t!("main_menu.opt_save"),
        t!("main_menu.opt_load"),
        t!("main_menu.opt_new"),
        t!("main_menu.opt_preview"),
        t!("main_menu.opt_settings"),
        t!("main_menu.exit"),
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.prompt"))
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => run_add_file(term, session)?,
        Some(1) => run_add_folder(term, session)?,
        Some(2) => run_select_clip(term, session)?,
        Some(3) => run_move_up(term, session)?,
        Some(4) => run_move_down(term, session)?,
        Some(5) => run_move_to_position(term, session)?,
        Some(6) => run_remove_selected(term, session)?,
        Some(7) => run_clear(term, session)?,
        Some(8) => run_export(term, session)?,
        Some(9) => run_save_project(term, session)?,
        Some(10) => run_load_project(term, session)?,
        Some(11) => run_new_project(term, session)?,
        Some(12) => run_save_preview_frame(term, session)?,
        Some(13) => show_settings_menu(term, &mut session.config)?,
        // ESC 與「離開」相同
        Some(14) | None => return confirm_exit(session).map(|exit| !exit),
        _ => unreachable!(),
    }

    Ok(true)
}

fn confirm_exit(session: &Session) -> Result<bool> {
    if !session.is_modified() {
        return Ok(true);
    }

    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.confirm_exit_unsaved"))
        .default(false)
        .interact()?)
}

fn print_header(session: &Session) {
    let project = session.project_path().map_or_else(
        || t!("main_menu.untitled").to_string(),
        |path| path.display().to_string(),
    );
    let marker = if session.is_modified() { " *" } else { "" };

    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!("{}", style(format!("{project}{marker}")).dim());
    println!();
}

fn print_clip_list(session: &Session) {
    let collection = session.collection();
    let clips = collection.snapshot();
    let selected = collection.selected_index();

    if clips.is_empty() {
        println!("  {}", style(t!("main_menu.empty_list")).dim());
    }

    for (index, clip) in clips.iter().enumerate() {
        let marker = if Some(index) == selected { ">" } else { " " };
        let line = format!(
            "{marker} {:>3}. {:<32} {:>8} {:>10} {:>9}  {}",
            index + 1,
            clip.display_name(),
            clip.duration_string(),
            clip.resolution_string(),
            clip.size_string(),
            clip.folder().display()
        );
        if Some(index) == selected {
            println!("{}", style(line).yellow().bold());
        } else {
            println!("{line}");
        }
    }

    let total = collection
        .total_duration()
        .map(format_duration)
        .unwrap_or_default();
    println!();
    println!(
        "{}",
        style(t!("main_menu.status", count = clips.len(), total = total)).green()
    );
    println!();
}
