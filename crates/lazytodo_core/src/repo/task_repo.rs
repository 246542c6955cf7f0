//! Task collection and settings persistence.
//!
//! # Responsibility
//! - Store the whole task collection as one named record.
//! - Store the reminder delay setting under its own key.
//! - Keep SQL and JSON encoding details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate every task before the collection is serialized.
//! - Read paths reject undecodable or invalid records instead of masking them;
//!   callers decide whether to degrade to an empty collection.
//! - A missing key means "no prior data", never an error.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::settings::{validate_delay_minutes, SettingsError};
use crate::model::task::{Task, TaskValidationError};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key for the serialized task collection.
pub const TASK_LIST_KEY: &str = "TodoList";
/// Storage key for the reminder delay setting.
pub const REMINDER_DELAY_KEY: &str = "reminderTime";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task and settings persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Settings(SettingsError),
    Db(DbError),
    Encode(serde_json::Error),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Settings(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode task data: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Settings(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<SettingsError> for RepoError {
    fn from(value: SettingsError) -> Self {
        Self::Settings(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable storage for the task collection.
pub trait TaskRepository {
    /// Returns the stored collection, or an empty one when nothing was saved.
    fn load_tasks(&self) -> RepoResult<Vec<Task>>;
    /// Replaces the stored collection.
    fn save_tasks(&self, tasks: &[Task]) -> RepoResult<()>;
}

/// Durable storage for the reminder delay setting.
pub trait SettingsRepository {
    /// Returns the stored delay in minutes, if one was saved.
    fn load_reminder_delay(&self) -> RepoResult<Option<u32>>;
    fn save_reminder_delay(&self, minutes: u32) -> RepoResult<()>;
}

impl<T: TaskRepository + ?Sized> TaskRepository for &T {
    fn load_tasks(&self) -> RepoResult<Vec<Task>> {
        (**self).load_tasks()
    }

    fn save_tasks(&self, tasks: &[Task]) -> RepoResult<()> {
        (**self).save_tasks(tasks)
    }
}

impl<T: SettingsRepository + ?Sized> SettingsRepository for &T {
    fn load_reminder_delay(&self) -> RepoResult<Option<u32>> {
        (**self).load_reminder_delay()
    }

    fn save_reminder_delay(&self, minutes: u32) -> RepoResult<()> {
        (**self).save_reminder_delay(minutes)
    }
}

/// SQLite-backed key-value repository for tasks and settings.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Wraps a connection produced by `db::open_db*`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` when `kv_store` does not exist.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let has_table: bool = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'kv_store'
            );",
            [],
            |row| row.get(0),
        )?;
        if !has_table {
            return Err(RepoError::MissingRequiredTable("kv_store"));
        }

        Ok(Self { conn })
    }

    fn read_value(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_value(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn load_tasks(&self) -> RepoResult<Vec<Task>> {
        match self.read_value(TASK_LIST_KEY)? {
            Some(raw) => decode_tasks(raw.as_str()),
            None => Ok(Vec::new()),
        }
    }

    fn save_tasks(&self, tasks: &[Task]) -> RepoResult<()> {
        let encoded = encode_tasks(tasks)?;
        self.write_value(TASK_LIST_KEY, encoded.as_str())
    }
}

impl SettingsRepository for SqliteTaskRepository<'_> {
    fn load_reminder_delay(&self) -> RepoResult<Option<u32>> {
        let Some(raw) = self.read_value(REMINDER_DELAY_KEY)? else {
            return Ok(None);
        };
        let minutes = raw.trim().parse::<u32>().map_err(|_| {
            RepoError::InvalidData(format!("invalid reminder delay `{raw}` in kv_store"))
        })?;
        Ok(Some(minutes))
    }

    fn save_reminder_delay(&self, minutes: u32) -> RepoResult<()> {
        let minutes = validate_delay_minutes(minutes)?;
        self.write_value(REMINDER_DELAY_KEY, minutes.to_string().as_str())
    }
}

/// Serializes the collection to the persisted JSON layout.
pub fn encode_tasks(tasks: &[Task]) -> RepoResult<String> {
    for task in tasks {
        task.validate()?;
    }
    serde_json::to_string(tasks).map_err(RepoError::Encode)
}

/// Decodes the persisted JSON layout.
///
/// Missing optional fields take their defaults; unknown fields are ignored.
/// Any undecodable record, invalid record, or duplicate id fails the whole
/// collection.
pub fn decode_tasks(raw: &str) -> RepoResult<Vec<Task>> {
    let tasks: Vec<Task> = serde_json::from_str(raw)
        .map_err(|err| RepoError::InvalidData(format!("undecodable task list: {err}")))?;

    let mut seen = HashSet::with_capacity(tasks.len());
    for task in &tasks {
        task.validate()
            .map_err(|err| RepoError::InvalidData(format!("task {}: {err}", task.id)))?;
        if !seen.insert(task.id) {
            return Err(RepoError::InvalidData(format!(
                "duplicate task id {} in task list",
                task.id
            )));
        }
    }
    Ok(tasks)
}
