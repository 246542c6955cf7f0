//! Core domain logic for LazyTodo.
//! This crate is the single source of truth for task list invariants.

pub mod adapter;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use adapter::classifier::{NoopClassifier, TaskClassifier};
pub use adapter::clock::{Clock, FixedClock, SystemClock};
pub use adapter::notifier::{InMemoryNotifier, LogNotifier, ReminderRequest, TaskNotifier};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::settings::{ReminderSettings, SettingsError};
pub use model::task::{Category, Task, TaskId, TaskValidationError};
pub use repo::task_repo::{
    RepoError, RepoResult, SettingsRepository, SqliteTaskRepository, TaskRepository,
};
pub use service::task_store::{Recommendation, TaskStore};
pub use service::task_view::{category_display_order, TaskGroup, TaskStats};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
