use crate::component::video_exporter::{Transition, transition_label};
use crate::config::save::save_settings;
use crate::config::types::{Config, Language};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use std::thread;
use std::time::Duration;

fn saved_notice(value: impl std::fmt::Display) {
    println!("\n{} {}", style(t!("settings.saved")).green(), value);
    thread::sleep(Duration::from_secs(1));
}

/// 設定選單
pub fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let options = vec![
            t!("settings.opt_export"),
            t!("settings.opt_tools"),
            t!("settings.opt_language"),
            t!("settings.back"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => show_export_settings_menu(term, config)?,
            Some(1) => show_tool_settings_menu(term, config)?,
            Some(2) => show_language_menu(term, config)?,
            Some(3) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}

/// 匯出預設值
fn show_export_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.export.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let current = &config.settings.export;
    println!(
        "\n{} {} / {:.1}s / {}\n",
        style(t!("settings.export.current")).dim(),
        transition_label(current.transition),
        current.transition_duration_seconds,
        current.default_file_name
    );

    let labels: Vec<String> = Transition::ALL.iter().map(|&t| transition_label(t)).collect();
    let default_index = Transition::ALL
        .iter()
        .position(|&t| t == current.transition)
        .unwrap_or(0);

    let Some(selection) = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("export.transition_prompt"))
        .items(&labels)
        .default(default_index)
        .interact_on_opt(term)?
    else {
        return Ok(());
    };

    let seconds: f64 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("export.duration_prompt"))
        .default(current.transition_duration_seconds)
        .validate_with(|value: &f64| -> Result<(), String> {
            if value.is_finite() && *value > 0.0 {
                Ok(())
            } else {
                Err(t!("export.duration_invalid").to_string())
            }
        })
        .interact_text()?;

    let file_name: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.export.file_name_prompt"))
        .default(current.default_file_name.clone())
        .interact_text()?;

    let export = &mut config.settings.export;
    export.transition = Transition::ALL[selection];
    export.transition_duration_seconds = seconds;
    export.default_file_name = file_name.trim().to_string();
    let summary = format!(
        "{} / {:.1}s / {}",
        transition_label(export.transition),
        export.transition_duration_seconds,
        export.default_file_name
    );

    save_settings(&config.settings)?;
    saved_notice(summary);
    Ok(())
}

/// 外部工具路徑與縮圖開關，重新啟動後生效
fn show_tool_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.tools.title")).cyan().bold());

    let current = config.settings.tools.clone();
    let ffmpeg_path: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.tools.ffmpeg_prompt"))
        .default(current.ffmpeg_path.clone())
        .interact_text()?;
    let ffprobe_path: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.tools.ffprobe_prompt"))
        .default(current.ffprobe_path.clone())
        .interact_text()?;
    let generate_thumbnails = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.tools.thumbnails_prompt"))
        .default(current.generate_thumbnails)
        .interact_on(term)?;

    let tools = &mut config.settings.tools;
    tools.ffmpeg_path = ffmpeg_path.trim().to_string();
    tools.ffprobe_path = ffprobe_path.trim().to_string();
    tools.generate_thumbnails = generate_thumbnails;

    if *tools != current {
        save_settings(&config.settings)?;
        println!("{}", style(t!("settings.tools.restart_hint")).yellow());
        saved_notice("");
    }
    Ok(())
}

/// 語言設定選單
fn show_language_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.language.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let items: Vec<String> = Language::ALL.iter().map(ToString::to_string).collect();
    let default_index = Language::ALL
        .iter()
        .position(|&l| l == config.settings.language)
        .unwrap_or(0);

    let Some(selection) = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.language.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?
    else {
        return Ok(());
    };

    let selected_lang = Language::ALL[selection];
    if selected_lang != config.settings.language {
        config.settings.language = selected_lang;
        rust_i18n::set_locale(selected_lang.as_str());
        save_settings(&config.settings)?;
        saved_notice(selected_lang);
    }

    Ok(())
}
