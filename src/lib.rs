pub mod api;
pub mod app;
pub mod chat;
pub mod code_run;
pub mod config;
pub mod db;
pub mod grouping;
pub mod illustration;
pub mod input;
pub mod layout;
pub mod menu;
pub mod models;
pub mod search;
pub mod telemetry;
pub mod ui;
pub mod utils;
pub mod worker;

// Re-exports for convenience
pub use api::{ApiError, HttpBackend, WorkspaceBackend};
pub use app::App;
pub use config::WorkspaceConfig;
pub use db::prefs::PrefsStore;
pub use grouping::{group_questions, GroupedQuestions};
pub use layout::LayoutState;
pub use models::{AppState, PanelId, Question};
pub use worker::spawn_backend_worker;
