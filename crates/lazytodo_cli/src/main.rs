//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `lazytodo_core` linkage.
//! - Optionally summarize an existing task database opened read-only.

use lazytodo_core::db::open_db_read_only;
use lazytodo_core::service::task_view::{format_day, group_tasks, sort_tasks};
use lazytodo_core::{SqliteTaskRepository, Task, TaskRepository, TaskStats};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("lazytodo_core ping={}", lazytodo_core::ping());
    println!("lazytodo_core version={}", lazytodo_core::core_version());

    let Some(db_path) = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("LAZYTODO_DB_PATH").ok())
        .filter(|value| !value.trim().is_empty())
    else {
        return ExitCode::SUCCESS;
    };

    match summarize(db_path.trim()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("lazytodo_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn summarize(db_path: &str) -> Result<(), String> {
    let conn =
        open_db_read_only(db_path).map_err(|err| format!("task DB open failed: {err}"))?;
    let repo =
        SqliteTaskRepository::try_new(&conn).map_err(|err| format!("repo init failed: {err}"))?;
    let tasks = repo
        .load_tasks()
        .map_err(|err| format!("task load failed: {err}"))?;

    for line in render_summary(&tasks) {
        println!("{line}");
    }
    Ok(())
}

/// Stats line, then one section per category in display order.
fn render_summary(tasks: &[Task]) -> Vec<String> {
    let stats = TaskStats::from_tasks(tasks);
    let mut lines = vec![format!(
        "tasks total={} completed={} completion_rate={:.1}",
        stats.total, stats.completed_count, stats.completion_rate
    )];

    for group in group_tasks(&sort_tasks(tasks.iter().collect())) {
        let icon = group.category.icon();
        lines.push(if icon.is_empty() {
            format!("## {}", group.category)
        } else {
            format!("## {icon} {}", group.category)
        });
        for task in group.tasks {
            let due = task
                .target_date
                .and_then(format_day)
                .unwrap_or_else(|| "-".to_string());
            lines.push(format!(
                "[{}] {} due={}",
                if task.is_done { "x" } else { " " },
                task.text,
                due
            ));
        }
    }
    lines
}
