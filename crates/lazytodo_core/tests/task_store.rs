use chrono::{DateTime, Duration, Local, TimeZone};
use lazytodo_core::db::{open_db_in_memory, DbError};
use lazytodo_core::service::task_store::{MOTIVATION_MESSAGES, NOTHING_TO_DO_MESSAGE};
use lazytodo_core::{
    Category, Clock, FixedClock, InMemoryNotifier, NoopClassifier, Recommendation, RepoError,
    RepoResult, SettingsError, SettingsRepository, SqliteTaskRepository, Task, TaskRepository,
    TaskStore,
};
use rusqlite::{ffi, Connection};
use std::cell::Cell;
use std::collections::HashSet;

type KeywordFn = fn(&str) -> Option<String>;
type Store<'conn> = TaskStore<SqliteTaskRepository<'conn>, KeywordFn, InMemoryNotifier>;

/// Starts at noon on a fixed local day and advances one second per read.
struct StepClock {
    start: DateTime<Local>,
    ticks: Cell<i64>,
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Local> {
        let tick = self.ticks.get();
        self.ticks.set(tick + 1);
        self.start + Duration::seconds(tick)
    }
}

fn noon() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2026, 3, 14, 12, 0, 0)
        .single()
        .expect("unambiguous local noon")
}

fn keyword_classifier(text: &str) -> Option<String> {
    if text.contains("milk") {
        Some("쇼핑".to_string())
    } else if text.contains("standup") {
        Some("meeting".to_string())
    } else if text.contains("gym") {
        Some("운동".to_string())
    } else if text.contains("trip") {
        Some("travel".to_string())
    } else {
        None
    }
}

fn open_store(conn: &Connection) -> Store<'_> {
    let repo = SqliteTaskRepository::try_new(conn).unwrap();
    TaskStore::open(repo, keyword_classifier as KeywordFn, InMemoryNotifier::new())
        .with_clock(StepClock {
            start: noon(),
            ticks: Cell::new(0),
        })
        .with_rng_seed(7)
}

/// Task storage whose reads fail with a locked database; saves are counted.
#[derive(Default)]
struct LockedStorage {
    saves: Cell<usize>,
}

impl TaskRepository for LockedStorage {
    fn load_tasks(&self) -> RepoResult<Vec<Task>> {
        Err(RepoError::Db(DbError::Sqlite(rusqlite::Error::SqliteFailure(
            ffi::Error::new(ffi::SQLITE_BUSY),
            Some("database is locked".to_string()),
        ))))
    }

    fn save_tasks(&self, _tasks: &[Task]) -> RepoResult<()> {
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

impl SettingsRepository for LockedStorage {
    fn load_reminder_delay(&self) -> RepoResult<Option<u32>> {
        Ok(None)
    }

    fn save_reminder_delay(&self, _minutes: u32) -> RepoResult<()> {
        Ok(())
    }
}

fn seed_tasks(conn: &Connection, tasks: &[Task]) {
    SqliteTaskRepository::try_new(conn)
        .unwrap()
        .save_tasks(tasks)
        .unwrap();
}

#[test]
fn add_counts_only_non_blank_text() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn);

    let inputs = ["buy milk", "", "   ", "standup notes", "\t\n", "gym"];
    let created = inputs
        .iter()
        .filter_map(|text| store.add(text, None))
        .count();

    assert_eq!(created, 3);
    assert_eq!(store.tasks().len(), 3);
    assert_eq!(store.notifier().scheduled_total(), 3);
}

#[test]
fn add_classifies_and_normalizes_labels() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn);

    let milk = store.add("buy milk", None).unwrap();
    let standup = store.add("standup", None).unwrap();
    let gym = store.add("gym", None).unwrap();
    let trip = store.add("plan trip", None).unwrap();
    let unknown = store.add("call mom", None).unwrap();

    assert_eq!(milk.category, Category::Shopping);
    assert_eq!(standup.category, Category::Meeting);
    assert_eq!(gym.category, Category::Workout);
    assert_eq!(trip.category, Category::Others);
    assert_eq!(unknown.category, Category::Others);
    assert!(!milk.is_done);
    assert_eq!(milk.text, "buy milk");
}

#[test]
fn add_runs_save_badge_motivation_and_reminder_hooks() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn);
    assert!(store.motivation_message().is_none());

    let task = store.add("  buy milk  ", None).unwrap();

    assert_eq!(task.text, "buy milk");
    let stored = store.repository().load_tasks().unwrap();
    assert_eq!(stored, vec![task.clone()]);
    assert_eq!(store.notifier().badge_count(), 1);
    let message = store.motivation_message().expect("motivation message set");
    assert!(MOTIVATION_MESSAGES.contains(&message));

    let reminder = store.notifier().pending(task.id).expect("reminder scheduled");
    assert_eq!(reminder.delay_minutes, 5);
    assert!(reminder.body.contains("buy milk"));
}

#[test]
fn reminder_delay_is_read_on_every_schedule() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn);

    let first = store.add("first", None).unwrap();
    store.set_reminder_delay(30).unwrap();
    let second = store.add("second", None).unwrap();

    assert_eq!(store.notifier().pending(first.id).unwrap().delay_minutes, 5);
    assert_eq!(store.notifier().pending(second.id).unwrap().delay_minutes, 30);
    assert_eq!(store.reminder_delay(), 30);
}

#[test]
fn set_reminder_delay_rejects_out_of_range_values() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn);

    assert_eq!(
        store.set_reminder_delay(0),
        Err(SettingsError::DelayOutOfRange(0))
    );
    assert_eq!(
        store.set_reminder_delay(1441),
        Err(SettingsError::DelayOutOfRange(1441))
    );
    assert_eq!(store.reminder_delay(), 5);
    store.set_reminder_delay(1440).unwrap();
    assert_eq!(store.reminder_delay(), 1440);
}

#[test]
fn toggle_done_twice_restores_state() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn);
    let task = store.add("gym", None).unwrap();

    store.toggle_done(task.id);
    assert!(store.get(task.id).unwrap().is_done);
    assert_eq!(store.notifier().badge_count(), 0);
    assert!(store.repository().load_tasks().unwrap()[0].is_done);

    store.toggle_done(task.id);
    assert!(!store.get(task.id).unwrap().is_done);
    assert_eq!(store.notifier().badge_count(), 1);
}

#[test]
fn delete_is_idempotent_and_keeps_scheduled_reminder() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn);
    let keep = store.add("keep", None).unwrap();
    let gone = store.add("gone", None).unwrap();

    store.delete(gone.id);
    store.delete(gone.id);
    store.toggle_done(gone.id);

    assert_eq!(store.tasks(), &[keep.clone()]);
    assert_eq!(store.repository().load_tasks().unwrap(), vec![keep]);
    assert_eq!(store.notifier().badge_count(), 1);
    assert!(store.notifier().pending(gone.id).is_some());
}

#[test]
fn stats_on_empty_store_are_zero() {
    let conn = open_db_in_memory().unwrap();
    let store = open_store(&conn);

    let stats = store.stats();
    assert_eq!(stats.total, 0);
    assert_eq!(stats.completed_count, 0);
    assert_eq!(stats.completion_rate, 0.0);
    assert!(!stats.completion_rate.is_nan());
}

#[test]
fn stats_with_one_of_three_done() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn);
    let first = store.add("a", None).unwrap();
    store.add("b", None).unwrap();
    store.add("c", None).unwrap();
    store.toggle_done(first.id);

    let stats = store.stats();
    assert_eq!(stats.completed_count, 1);
    assert!((stats.completion_rate - 33.333).abs() < 0.01);
}

#[test]
fn open_purges_completed_tasks() {
    let conn = open_db_in_memory().unwrap();
    let mut done_a = Task::new("done a", Category::Others, 1, None).unwrap();
    let mut done_b = Task::new("done b", Category::Workout, 2, None).unwrap();
    done_a.toggle_done();
    done_b.toggle_done();
    let pending = Task::new("pending", Category::Meeting, 3, None).unwrap();
    seed_tasks(&conn, &[done_a, pending.clone(), done_b]);

    let store = open_store(&conn);

    assert_eq!(store.tasks(), &[pending.clone()]);
    assert_eq!(store.repository().load_tasks().unwrap(), vec![pending]);
    assert_eq!(store.notifier().badge_count(), 1);
    assert_eq!(store.notifier().permission_requests(), 1);
}

#[test]
fn open_treats_corrupt_storage_as_empty() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_store (key, value) VALUES ('TodoList', 'garbage');",
        [],
    )
    .unwrap();

    let mut store = open_store(&conn);
    assert!(store.tasks().is_empty());

    store.add("fresh start", None).unwrap();
    assert_eq!(store.repository().load_tasks().unwrap().len(), 1);
}

#[test]
fn open_with_locked_storage_starts_empty_without_overwriting() {
    let storage = LockedStorage::default();

    let store = TaskStore::open(&storage, NoopClassifier, InMemoryNotifier::new());

    assert!(store.tasks().is_empty());
    assert_eq!(storage.saves.get(), 0);
    assert_eq!(store.notifier().badge_count(), 0);
    assert_eq!(store.notifier().permission_requests(), 1);
}

#[test]
fn open_with_corrupt_storage_saves_the_empty_collection() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_store (key, value) VALUES ('TodoList', 'garbage');",
        [],
    )
    .unwrap();

    let _store = open_store(&conn);

    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    assert!(repo.load_tasks().unwrap().is_empty());
}

#[test]
fn add_accepts_target_date_before_epoch() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let mut store = TaskStore::open(repo, NoopClassifier, InMemoryNotifier::new())
        .with_clock(FixedClock(noon()));
    let day_before_epoch = -86_400_000;

    let task = store
        .add("anniversary", Some(day_before_epoch))
        .expect("non-blank text always creates a task");

    assert_eq!(task.target_date, Some(day_before_epoch));
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.repository().load_tasks().unwrap(), vec![task]);
}

#[test]
fn today_only_filter_keeps_tasks_due_today() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn);
    let today = (noon() - Duration::hours(3)).timestamp_millis();
    let tomorrow = (noon() + Duration::days(1)).timestamp_millis();

    let due_today = store.add("buy milk", Some(today)).unwrap();
    store.add("standup", Some(tomorrow)).unwrap();
    store.add("no date", None).unwrap();

    assert_eq!(store.filtered().len(), 3);
    store.set_today_only_filter(true);
    assert!(store.today_only());
    let visible: Vec<_> = store.filtered().iter().map(|task| task.id).collect();
    assert_eq!(visible, vec![due_today.id]);
    assert_eq!(store.tasks().len(), 3);
}

#[test]
fn recommendation_with_today_filter_picks_todays_task_or_sentinel() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn);
    let today = noon().timestamp_millis();
    let milk = store.add("buy milk", Some(today)).unwrap();
    let later = (noon() + Duration::days(2)).timestamp_millis();
    store.add("later", Some(later)).unwrap();
    store.set_today_only_filter(true);

    let pick = store.pick_recommendation();
    assert_eq!(
        pick,
        Recommendation::Task {
            id: milk.id,
            text: "buy milk".to_string()
        }
    );
    assert_eq!(store.today_recommendation(), Some("buy milk"));

    store.toggle_done(milk.id);
    assert_eq!(store.pick_recommendation(), Recommendation::NothingToDo);
    assert_eq!(store.today_recommendation(), Some(NOTHING_TO_DO_MESSAGE));
}

#[test]
fn recommendation_never_picks_done_tasks_and_keeps_pool() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn);
    let done = store.add("done", None).unwrap();
    let open_a = store.add("open a", None).unwrap();
    let open_b = store.add("open b", None).unwrap();
    store.toggle_done(done.id);

    let mut seen = HashSet::new();
    for _ in 0..50 {
        match store.pick_recommendation() {
            Recommendation::Task { id, .. } => {
                assert_ne!(id, done.id);
                seen.insert(id);
            }
            Recommendation::NothingToDo => panic!("pending tasks exist"),
        }
    }
    assert!(seen.contains(&open_a.id));
    assert!(seen.contains(&open_b.id));
}

#[test]
fn sorted_puts_pending_first_then_oldest() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn);
    let first = store.add("first", None).unwrap();
    let second = store.add("second", None).unwrap();
    let third = store.add("third", None).unwrap();
    store.toggle_done(first.id);

    let order: Vec<_> = store.sorted().iter().map(|task| task.id).collect();
    assert_eq!(order, vec![second.id, third.id, first.id]);
}

#[test]
fn grouped_follows_display_order_without_empty_groups() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn);
    let unknown = store.add("call mom", None).unwrap();
    let standup = store.add("standup", None).unwrap();
    let milk = store.add("buy milk", None).unwrap();
    let bread = store.add("milk and bread", None).unwrap();
    store.toggle_done(milk.id);

    let groups = store.grouped();
    let categories: Vec<_> = groups.iter().map(|group| group.category).collect();
    assert_eq!(
        categories,
        vec![Category::Shopping, Category::Meeting, Category::Others]
    );

    let shopping: Vec<_> = groups[0].tasks.iter().map(|task| task.id).collect();
    assert_eq!(shopping, vec![bread.id, milk.id]);
    assert_eq!(groups[1].tasks[0].id, standup.id);
    assert_eq!(groups[2].tasks[0].id, unknown.id);

    let grouped_total: usize = groups.iter().map(|group| group.tasks.len()).sum();
    assert_eq!(grouped_total, store.filtered().len());
}

#[test]
fn grouped_respects_today_only_filter() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn);
    store.add("gym", Some(noon().timestamp_millis())).unwrap();
    store.add("buy milk", None).unwrap();
    store.set_today_only_filter(true);

    let groups = store.grouped();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].category, Category::Workout);
}

#[test]
fn date_added_comes_from_store_clock() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let no_label = |_: &str| -> Option<String> { None };
    let mut store =
        TaskStore::open(repo, no_label, InMemoryNotifier::new()).with_clock(FixedClock(noon()));

    let task = store.add("anything", None).unwrap();
    assert_eq!(task.date_added, noon().timestamp_millis());
    assert_eq!(task.category, Category::Others);
}
