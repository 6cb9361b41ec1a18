pub mod load;
pub mod save;
pub mod types;

pub use load::SETTINGS_FILE;
pub use types::{
    Config, ExportSettings, FileTypeTable, Language, MAX_RECENT_PATHS, ToolSettings, UserSettings,
};
