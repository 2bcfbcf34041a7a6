pub mod aggregate;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod database;
pub mod demo;
pub mod document;
pub mod gateway;
pub mod interchange;
pub mod logging;
pub mod models;
pub mod state;
pub mod utils;
pub mod tui;

pub use calendar::YearMonth;
pub use config::Config;
pub use database::Database;
pub use gateway::{Gateway, SyncStatus};
pub use models::{Employee, Settings, ShiftRecord, ShiftType, Snapshot, TaskKey, TaskRecord};
pub use state::AppState;
pub use utils::Profile;
