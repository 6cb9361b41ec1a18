//! 專案檔（JSON）讀寫

mod store;

pub use store::{LoadReport, load, load_into, save};
