mod handlers;
mod main_menu;
mod session;
mod settings_menu;

pub use main_menu::show_main_menu;
pub use session::Session;

use console::style;

pub fn print_goodbye() {
    println!("\n{}", style(t!("main_menu.goodbye")).green().bold());
}

pub fn print_error(e: &anyhow::Error) {
    eprintln!("{} {e:#}", style(t!("common.error_prefix")).red().bold());
}
