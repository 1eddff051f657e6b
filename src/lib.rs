pub mod api;
pub mod app;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod reminders;
pub mod stats;
pub mod storage;
pub mod ui;
pub mod state;

pub use api::ApiClient;
pub use app::router;
pub use config::Config;
pub use dashboard::Dashboard;
pub use state::AppState;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
