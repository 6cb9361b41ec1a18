use anyhow::Result;
use console::Term;
use log::{info, warn};
use video_arranger::config::types::Config;
use video_arranger::init;
use video_arranger::menu::{Session, print_error, print_goodbye, show_main_menu};
use video_arranger::signal::setup_shutdown_signal;

fn main() -> Result<()> {
    init::init();
    let term = Term::stdout();
    let shutdown_signal = setup_shutdown_signal();

    let config = Config::new()?;
    rust_i18n::set_locale(config.settings.language.as_str());

    let mut session = Session::new(config, shutdown_signal);

    loop {
        match show_main_menu(&term, &mut session) {
            Ok(true) => {}
            Ok(false) => {
                term.clear_screen()?;
                print_goodbye();
                info!("程式正常結束");
                break;
            }
            Err(e) => {
                warn!("程式錯誤: {e}");
                print_error(&e);
                break;
            }
        }
    }

    Ok(())
}
