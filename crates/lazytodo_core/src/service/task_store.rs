//! Task list use-case service.
//!
//! # Responsibility
//! - Own the in-memory task collection; the only component that mutates it.
//! - Run explicit post-mutation hooks: save, badge recompute and reminder
//!   scheduling.
//! - Expose derived views (filter/sort/group/stats) and the recommendation pick.
//!
//! # Invariants
//! - Every mutation is followed by a full-collection save; failures are logged
//!   and never surfaced.
//! - Blank text and unknown ids are silent no-ops.
//! - Completed tasks are purged once per `open`, never on later mutations.
//! - A failed storage read never triggers a save of the fallback collection
//!   during `open`.
//! - Deleting a task or toggling the today-only filter does not cancel an
//!   already scheduled reminder.
//!
//! # See also
//! - docs/architecture/task-store.md

use crate::adapter::classifier::TaskClassifier;
use crate::adapter::clock::{Clock, SystemClock};
use crate::adapter::notifier::{ReminderRequest, TaskNotifier};
use crate::model::settings::{validate_delay_minutes, ReminderSettings, SettingsError};
use crate::model::task::{Category, Task, TaskId};
use crate::repo::task_repo::{RepoError, SettingsRepository, TaskRepository};
use crate::service::task_view::{filter_tasks, group_tasks, sort_tasks, TaskGroup, TaskStats};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

pub const MOTIVATION_MESSAGES: [&str; 4] = [
    "Nice! One more step forward 💪",
    "Plans matter once you act on them 🚀",
    "Start now and tomorrow looks different ✨",
    "Don't give up, keep going 🛤️",
];

pub const NOTHING_TO_DO_MESSAGE: &str = "Nothing to do today 🎉";

/// Result of a recommendation pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recommendation {
    Task { id: TaskId, text: String },
    NothingToDo,
}

impl Recommendation {
    /// Text shown to the user: the task text or the sentinel message.
    pub fn message(&self) -> &str {
        match self {
            Self::Task { text, .. } => text.as_str(),
            Self::NothingToDo => NOTHING_TO_DO_MESSAGE,
        }
    }
}

/// Authoritative holder of the task collection.
pub struct TaskStore<R, C, N>
where
    R: TaskRepository + SettingsRepository,
    C: TaskClassifier,
    N: TaskNotifier,
{
    repo: R,
    classifier: C,
    notifier: N,
    clock: Box<dyn Clock>,
    rng: StdRng,
    tasks: Vec<Task>,
    today_only: bool,
    motivation_message: Option<String>,
    today_recommendation: Option<String>,
}

impl<R, C, N> TaskStore<R, C, N>
where
    R: TaskRepository + SettingsRepository,
    C: TaskClassifier,
    N: TaskNotifier,
{
    /// Loads the stored collection and runs the startup cleanup.
    ///
    /// # Side effects
    /// - Undecodable stored data is logged and treated as an empty collection.
    /// - Completed tasks are purged (and the purge is saved).
    /// - A storage failure during load also starts empty, but skips the
    ///   startup save so the stored record is left untouched.
    /// - Requests notification permission and publishes the badge count.
    pub fn open(repo: R, classifier: C, notifier: N) -> Self {
        let (tasks, startup_save) = match repo.load_tasks() {
            Ok(tasks) => {
                info!(
                    "event=task_load module=task_store status=ok count={}",
                    tasks.len()
                );
                (tasks, true)
            }
            Err(RepoError::InvalidData(message)) => {
                warn!(
                    "event=task_load module=task_store status=degraded fallback=empty error={}",
                    message
                );
                (Vec::new(), true)
            }
            Err(err) => {
                error!(
                    "event=task_load module=task_store status=error fallback=empty startup_save=skipped error={}",
                    err
                );
                (Vec::new(), false)
            }
        };

        let mut store = Self {
            repo,
            classifier,
            notifier,
            clock: Box::new(SystemClock),
            rng: StdRng::from_entropy(),
            tasks,
            today_only: false,
            motivation_message: None,
            today_recommendation: None,
        };
        if startup_save {
            store.purge_completed();
        }
        store.notifier.request_permission();
        store.refresh_badge();
        store
    }

    /// Replaces the time source used for `date_added` and today filtering.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Seeds the random source used for motivation and recommendation picks.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Creates a task from user text.
    ///
    /// Returns `None` without side effects when `text` is blank after trim.
    /// The classifier label is normalized to a known category, falling back to
    /// `Category::Others`.
    pub fn add(&mut self, text: &str, target_date: Option<i64>) -> Option<Task> {
        let text = text.trim();
        if text.is_empty() {
            debug!("event=task_add module=task_store status=skipped reason=blank_text");
            return None;
        }

        let label = self.classifier.classify(text);
        let category = match label.as_deref() {
            Some(raw) => Category::from_label_or_others(raw),
            None => {
                debug!("event=task_classify module=task_store status=fallback category=others");
                Category::Others
            }
        };

        let date_added = self.clock.now().timestamp_millis();
        let task = match Task::new(text, category, date_added, target_date) {
            Ok(task) => task,
            Err(err) => {
                warn!("event=task_add module=task_store status=rejected error={err}");
                return None;
            }
        };
        self.tasks.push(task.clone());
        info!(
            "event=task_add module=task_store status=ok task_id={} category={}",
            task.id, task.category
        );

        self.after_mutation();
        self.motivation_message = MOTIVATION_MESSAGES
            .choose(&mut self.rng)
            .map(|message| (*message).to_string());
        self.schedule_reminder(&task);

        Some(task)
    }

    /// Flips `is_done` on one task. Unknown ids are ignored.
    pub fn toggle_done(&mut self, id: TaskId) {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!("event=task_toggle module=task_store status=skipped reason=not_found task_id={id}");
            return;
        };
        task.toggle_done();
        info!(
            "event=task_toggle module=task_store status=ok task_id={id} is_done={}",
            task.is_done
        );
        self.after_mutation();
    }

    /// Removes one task. Unknown ids are ignored.
    pub fn delete(&mut self, id: TaskId) {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            debug!("event=task_delete module=task_store status=skipped reason=not_found task_id={id}");
            return;
        };
        self.tasks.remove(index);
        info!("event=task_delete module=task_store status=ok task_id={id}");
        self.after_mutation();
    }

    /// Removes every completed task.
    pub fn purge_completed(&mut self) {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.is_done);
        info!(
            "event=task_purge module=task_store status=ok removed={}",
            before - self.tasks.len()
        );
        self.after_mutation();
    }

    /// Toggles the today-only view flag. The collection is untouched.
    pub fn set_today_only_filter(&mut self, enabled: bool) {
        self.today_only = enabled;
    }

    pub fn today_only(&self) -> bool {
        self.today_only
    }

    /// Picks a random visible, not-done task.
    ///
    /// Recomputed on every call; previous picks stay in the pool.
    pub fn pick_recommendation(&mut self) -> Recommendation {
        let today = self.clock.now().date_naive();
        let candidates: Vec<&Task> = filter_tasks(&self.tasks, self.today_only, today)
            .into_iter()
            .filter(|task| !task.is_done)
            .collect();
        let recommendation = match candidates.choose(&mut self.rng) {
            Some(task) => Recommendation::Task {
                id: task.id,
                text: task.text.clone(),
            },
            None => Recommendation::NothingToDo,
        };
        self.today_recommendation = Some(recommendation.message().to_string());
        recommendation
    }

    /// Tasks visible under the current filter, in collection order.
    pub fn filtered(&self) -> Vec<&Task> {
        let today = self.clock.now().date_naive();
        filter_tasks(&self.tasks, self.today_only, today)
    }

    /// Visible tasks: not-done first, then oldest first.
    pub fn sorted(&self) -> Vec<&Task> {
        sort_tasks(self.filtered())
    }

    /// Visible tasks grouped by category in display order.
    pub fn grouped(&self) -> Vec<TaskGroup<'_>> {
        group_tasks(&self.sorted())
    }

    /// Completion summary over the whole collection.
    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.tasks)
    }

    /// Number of not-done tasks; mirrored to the badge.
    pub fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|task| !task.is_done).count()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn motivation_message(&self) -> Option<&str> {
        self.motivation_message.as_deref()
    }

    pub fn today_recommendation(&self) -> Option<&str> {
        self.today_recommendation.as_deref()
    }

    /// Current reminder delay, read from storage on every call.
    ///
    /// Missing or unreadable values fall back to the default; stored values
    /// outside the supported range are clamped.
    pub fn reminder_delay(&self) -> u32 {
        match self.repo.load_reminder_delay() {
            Ok(Some(minutes)) => ReminderSettings::new(minutes).delay_minutes,
            Ok(None) => ReminderSettings::default().delay_minutes,
            Err(err) => {
                warn!(
                    "event=settings_load module=task_store status=degraded fallback=default error={}",
                    err
                );
                ReminderSettings::default().delay_minutes
            }
        }
    }

    /// Persists a new reminder delay.
    ///
    /// # Errors
    /// - `SettingsError::DelayOutOfRange` when `minutes` is outside `1..=1440`.
    ///   Storage failures are logged, matching task saves.
    pub fn set_reminder_delay(&mut self, minutes: u32) -> Result<(), SettingsError> {
        let minutes = validate_delay_minutes(minutes)?;
        if let Err(err) = self.repo.save_reminder_delay(minutes) {
            error!("event=settings_save module=task_store status=error error={err}");
        }
        Ok(())
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    fn after_mutation(&mut self) {
        self.persist();
        self.refresh_badge();
    }

    fn persist(&self) {
        match self.repo.save_tasks(&self.tasks) {
            Ok(()) => debug!(
                "event=task_save module=task_store status=ok count={}",
                self.tasks.len()
            ),
            Err(err) => error!("event=task_save module=task_store status=error error={err}"),
        }
    }

    fn refresh_badge(&self) {
        self.notifier.set_badge_count(self.pending_count());
    }

    fn schedule_reminder(&self, task: &Task) {
        let request = ReminderRequest::for_task(task, self.reminder_delay());
        self.notifier.schedule_reminder(&request);
    }
}
