//! Derived task list views.
//!
//! # Responsibility
//! - Filter, sort, group and summarize a task slice for display.
//!
//! # Invariants
//! - Views are pure and recomputed on demand; nothing here is stored.
//! - Sorting is stable: not-done before done, then `date_added` ascending,
//!   then insertion order.
//! - Groups are emitted in category display order and are never empty.

use crate::model::task::{Category, Task};
use chrono::{Local, NaiveDate, TimeZone};
use std::cmp::Ordering;

/// Tasks of one category, in `sorted()` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskGroup<'a> {
    pub category: Category,
    pub tasks: Vec<&'a Task>,
}

/// Completion summary over a task collection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskStats {
    pub total: usize,
    pub completed_count: usize,
    /// Percentage in `[0, 100]`; `0.0` for an empty collection.
    pub completion_rate: f64,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed_count = tasks.iter().filter(|task| task.is_done).count();
        let completion_rate = if total == 0 {
            0.0
        } else {
            completed_count as f64 / total as f64 * 100.0
        };
        Self {
            total,
            completed_count,
            completion_rate,
        }
    }
}

/// Converts epoch millis to the local calendar day.
pub fn local_day(epoch_ms: i64) -> Option<NaiveDate> {
    Local
        .timestamp_millis_opt(epoch_ms)
        .single()
        .map(|dt| dt.date_naive())
}

/// Formats epoch millis as `yyyy-MM-dd` in local time.
pub fn format_day(epoch_ms: i64) -> Option<String> {
    local_day(epoch_ms).map(|day| day.format("%Y-%m-%d").to_string())
}

/// Whether the task's target date falls on `today`. No target date never matches.
pub fn is_due_on(task: &Task, today: NaiveDate) -> bool {
    task.target_date.and_then(local_day) == Some(today)
}

/// Applies the today-only filter.
pub fn filter_tasks(tasks: &[Task], today_only: bool, today: NaiveDate) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| !today_only || is_due_on(task, today))
        .collect()
}

/// Stable sort: not-done first, then oldest first.
pub fn sort_tasks(mut tasks: Vec<&Task>) -> Vec<&Task> {
    tasks.sort_by_key(|task| (task.is_done, task.date_added));
    tasks
}

/// Partitions already-sorted tasks by category in display order.
pub fn group_tasks<'a>(sorted: &[&'a Task]) -> Vec<TaskGroup<'a>> {
    Category::ALL
        .into_iter()
        .filter_map(|category| {
            let tasks: Vec<&Task> = sorted
                .iter()
                .copied()
                .filter(|task| task.category == category)
                .collect();
            (!tasks.is_empty()).then_some(TaskGroup { category, tasks })
        })
        .collect()
}

/// Position of a category label in the reference display order.
///
/// Unrecognized labels rank at `Category::ALL.len()`, after `others`.
pub fn category_display_rank(label: &str) -> usize {
    Category::ALL
        .iter()
        .position(|category| category.label() == label || category.korean_label() == label)
        .unwrap_or(Category::ALL.len())
}

/// Total order over category labels for section headers.
pub fn category_display_order(lhs: &str, rhs: &str) -> Ordering {
    category_display_rank(lhs).cmp(&category_display_rank(rhs))
}

/// Stable-sorts labels by display order; unknown labels keep their relative order.
pub fn sort_category_labels<S: AsRef<str>>(labels: &mut [S]) {
    labels.sort_by(|lhs, rhs| category_display_order(lhs.as_ref(), rhs.as_ref()));
}
