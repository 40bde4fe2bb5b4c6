//! Health-companion backend: daily wellness task resolution, symptom
//! journaling, reminders, and weekly reflection over a local SQLite store.
//!
//! The centerpiece is [`daily_task::DailyTaskEngine`], which resolves
//! "today's tasks" for a user: reuse, regenerate through the remote AI
//! service, or degrade to canned fallbacks — never an empty screen.

use tracing_subscriber::EnvFilter;

pub mod activity;
pub mod analytics;
pub mod config;
pub mod daily_task;
pub mod db;
pub mod generator;
pub mod history;
pub mod identity;
pub mod medicines;
pub mod models;
pub mod notify;
pub mod reflection;
pub mod symptoms;

/// Initializes the global tracing subscriber. `RUST_LOG` overrides the
/// built-in default filter. Call once at startup.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
