//! Connection bootstrap for the word database.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure pragmas and run migrations before handing a connection out.
//!
//! # Invariants
//! - Returned connections have the latest schema applied.
//! - New creation timestamps sort after every word already stored.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use crate::model::word::advance_created_at_clock;
use log::{debug, error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) the word database file at `path`.
///
/// # Side effects
/// - Applies pending migrations.
/// - Emits `db_open` logging events with duration and status.
///
/// # Errors
/// - `DbError::MissingDataDir` when the parent directory does not exist.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if !dir.is_dir() {
            error!(
                "event=db_open module=db status=error mode=file error_code=missing_data_dir"
            );
            return Err(DbError::MissingDataDir(dir.to_path_buf()));
        }
    }
    open_with("file", || Connection::open(path))
}

/// Opens a private in-memory word database, mainly for tests.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &'static str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = connect().map_err(|err| {
        error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={err}",
            started_at.elapsed().as_millis()
        );
        err
    })?;

    if let Err(err) = bootstrap_connection(&mut conn) {
        error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={err}",
            started_at.elapsed().as_millis()
        );
        return Err(err);
    }

    info!(
        "event=db_open module=db status=ok mode={mode} duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)?;
    seed_created_at_clock(conn)?;
    Ok(())
}

fn seed_created_at_clock(conn: &Connection) -> DbResult<()> {
    let newest: Option<i64> =
        conn.query_row("SELECT MAX(created_at) FROM words;", [], |row| row.get(0))?;
    if let Some(newest) = newest {
        advance_created_at_clock(newest);
        debug!("event=db_clock_seed module=db status=ok newest_created_at={newest}");
    }
    Ok(())
}
