//! Task domain model.
//!
//! # Responsibility
//! - Define the single to-do record owned by `TaskStore`.
//! - Define the closed category label set and label normalization.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `category` is always one of the four known labels.
//! - `is_done` is the only field that changes after creation.
//!
//! # See also
//! - docs/architecture/data-model.md

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every task.
pub type TaskId = Uuid;

/// Closed category set assigned once at task creation.
///
/// Persisted as the canonical lowercase label. Unknown labels decode as
/// `Others`, so a stored record never carries arbitrary classifier text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Category {
    Shopping,
    Meeting,
    Workout,
    Others,
}

impl Category {
    /// Reference display order.
    pub const ALL: [Category; 4] = [
        Category::Shopping,
        Category::Meeting,
        Category::Workout,
        Category::Others,
    ];

    /// Canonical persisted label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Shopping => "shopping",
            Self::Meeting => "meeting",
            Self::Workout => "workout",
            Self::Others => "others",
        }
    }

    /// Label emitted by the Korean on-device classifier model.
    pub fn korean_label(self) -> &'static str {
        match self {
            Self::Shopping => "쇼핑",
            Self::Meeting => "회의",
            Self::Workout => "운동",
            Self::Others => "기타",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Shopping => "🛒",
            Self::Meeting => "📅",
            Self::Workout => "🏋️",
            Self::Others => "",
        }
    }

    /// Maps a raw classifier label to a known category.
    ///
    /// Accepts canonical labels (ASCII case-insensitive) and the Korean
    /// model labels. Returns `None` for anything else.
    pub fn from_label(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ALL.into_iter().find(|category| {
            category.label().eq_ignore_ascii_case(trimmed) || category.korean_label() == trimmed
        })
    }

    /// Same as [`Category::from_label`] but falls back to `Others`.
    pub fn from_label_or_others(value: &str) -> Self {
        Self::from_label(value).unwrap_or(Self::Others)
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self::from_label_or_others(value.as_str())
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Validation error for task invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyText,
    InvalidTimestamp { field: &'static str, value: i64 },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text must not be blank"),
            Self::InvalidTimestamp { field, value } => {
                write!(f, "{field} must be a non-negative epoch millis value, got {value}")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// One to-do entry.
///
/// Serialized field names follow the persisted record layout
/// `{id, text, category, isDone, dateAdded, targetDate}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default = "default_category")]
    pub category: Category,
    #[serde(default)]
    pub is_done: bool,
    /// Unix epoch milliseconds captured at creation.
    pub date_added: i64,
    /// Unix epoch milliseconds chosen by the user, if any.
    #[serde(default)]
    pub target_date: Option<i64>,
}

impl Task {
    /// Creates a pending task with a generated stable ID.
    ///
    /// # Errors
    /// - Returns `EmptyText` when `text` is blank after trim.
    pub fn new(
        text: impl Into<String>,
        category: Category,
        date_added: i64,
        target_date: Option<i64>,
    ) -> Result<Self, TaskValidationError> {
        Self::with_id(Uuid::new_v4(), text, category, date_added, target_date)
    }

    /// Creates a pending task with a caller-provided ID.
    pub fn with_id(
        id: TaskId,
        text: impl Into<String>,
        category: Category,
        date_added: i64,
        target_date: Option<i64>,
    ) -> Result<Self, TaskValidationError> {
        let task = Self {
            id,
            text: text.into(),
            category,
            is_done: false,
            date_added,
            target_date,
        };
        task.validate()?;
        Ok(task)
    }

    /// Checks task invariants.
    ///
    /// `target_date` is a free user choice and may precede the epoch.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.text.trim().is_empty() {
            return Err(TaskValidationError::EmptyText);
        }
        if self.date_added < 0 {
            return Err(TaskValidationError::InvalidTimestamp {
                field: "date_added",
                value: self.date_added,
            });
        }
        Ok(())
    }

    pub fn toggle_done(&mut self) {
        self.is_done = !self.is_done;
    }
}

fn default_category() -> Category {
    Category::Others
}
