//! Reminder and badge notification contract.
//!
//! # Responsibility
//! - Describe the one-shot local reminder a new task requests.
//! - Expose permission, schedule, cancel and badge calls as explicit methods
//!   instead of ambient platform state.
//!
//! # Invariants
//! - Scheduling is keyed by task id: a second request for the same id
//!   replaces the pending one.
//! - Calls are fire-and-forget; `TaskStore` never observes delivery.

use crate::model::task::{Task, TaskId};
use log::info;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

pub const REMINDER_TITLE: &str = "Task reminder";

/// One-shot reminder request for a single task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    pub task_id: TaskId,
    pub delay_minutes: u32,
    pub title: String,
    pub body: String,
}

impl ReminderRequest {
    /// Builds the reminder carrying the task text.
    pub fn for_task(task: &Task, delay_minutes: u32) -> Self {
        Self {
            task_id: task.id,
            delay_minutes,
            title: REMINDER_TITLE.to_string(),
            body: format!("Don't forget: {}", task.text),
        }
    }

    pub fn delay_seconds(&self) -> u64 {
        u64::from(self.delay_minutes) * 60
    }
}

/// Local notification sink used by `TaskStore`.
pub trait TaskNotifier {
    fn request_permission(&self);
    fn schedule_reminder(&self, request: &ReminderRequest);
    fn cancel_reminder(&self, task_id: TaskId);
    fn set_badge_count(&self, count: usize);
}

impl<T: TaskNotifier + ?Sized> TaskNotifier for &T {
    fn request_permission(&self) {
        (**self).request_permission();
    }

    fn schedule_reminder(&self, request: &ReminderRequest) {
        (**self).schedule_reminder(request);
    }

    fn cancel_reminder(&self, task_id: TaskId) {
        (**self).cancel_reminder(task_id);
    }

    fn set_badge_count(&self, count: usize) {
        (**self).set_badge_count(count);
    }
}

/// Notifier that only writes metadata-only log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl TaskNotifier for LogNotifier {
    fn request_permission(&self) {
        info!("event=notify_permission module=notifier status=requested");
    }

    fn schedule_reminder(&self, request: &ReminderRequest) {
        // Why: reminder body carries user text; log ids and timing only.
        info!(
            "event=reminder_schedule module=notifier status=ok task_id={} delay_minutes={}",
            request.task_id, request.delay_minutes
        );
    }

    fn cancel_reminder(&self, task_id: TaskId) {
        info!("event=reminder_cancel module=notifier status=ok task_id={task_id}");
    }

    fn set_badge_count(&self, count: usize) {
        info!("event=badge_update module=notifier status=ok count={count}");
    }
}

/// In-process notifier that keeps pending reminders in memory.
///
/// Single-threaded by construction; state sits behind `RefCell`/`Cell`.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    pending: RefCell<BTreeMap<TaskId, ReminderRequest>>,
    scheduled_total: Cell<usize>,
    badge_count: Cell<usize>,
    permission_requests: Cell<usize>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending reminder for one task, if any.
    pub fn pending(&self, task_id: TaskId) -> Option<ReminderRequest> {
        self.pending.borrow().get(&task_id).cloned()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Number of schedule calls received, including replacements.
    pub fn scheduled_total(&self) -> usize {
        self.scheduled_total.get()
    }

    pub fn badge_count(&self) -> usize {
        self.badge_count.get()
    }

    pub fn permission_requests(&self) -> usize {
        self.permission_requests.get()
    }
}

impl TaskNotifier for InMemoryNotifier {
    fn request_permission(&self) {
        self.permission_requests
            .set(self.permission_requests.get() + 1);
    }

    fn schedule_reminder(&self, request: &ReminderRequest) {
        self.pending
            .borrow_mut()
            .insert(request.task_id, request.clone());
        self.scheduled_total.set(self.scheduled_total.get() + 1);
    }

    fn cancel_reminder(&self, task_id: TaskId) {
        self.pending.borrow_mut().remove(&task_id);
    }

    fn set_badge_count(&self, count: usize) {
        self.badge_count.set(count);
    }
}
