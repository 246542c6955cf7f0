//! Connection bootstrap utilities for the task database.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Run schema migrations before handing the connection out.
//!
//! # Invariants
//! - Read-write connections have migrations fully applied.
//! - Read-only connections never create or alter the database file.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the task database file, creating it when missing.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with("file", || Connection::open(path), bootstrap_connection)
}

/// Opens an in-memory task database. Used by tests and ephemeral sessions.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", Connection::open_in_memory, bootstrap_connection)
}

/// Opens an existing task database file for reads only.
///
/// A missing file is an error and migrations are not applied; callers
/// detect an outdated schema through `SqliteTaskRepository::try_new`.
pub fn open_db_read_only(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with(
        "read_only",
        || Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY),
        |conn| Ok(conn.busy_timeout(BUSY_TIMEOUT)?),
    )
}

fn open_with(
    mode: &'static str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
    bootstrap: impl FnOnce(&mut Connection) -> DbResult<()>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let result = connect()
        .map_err(DbError::from)
        .and_then(|mut conn| bootstrap(&mut conn).map(|()| conn));

    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)
}
