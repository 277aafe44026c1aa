//! SQLite database connection management.
//!
//! Both the similarity index and the card collection are SQLite files. Each
//! gets its own connection pool with WAL mode enabled. Database files and
//! their parent directories are created automatically if they don't exist.
//!
//! # Write-Ahead Logging (WAL)
//!
//! WAL keeps every committed transaction readable after a crash: a write
//! interrupted mid-transaction is rolled back on the next open, so the file
//! is never left half-written.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Create a connection pool to the SQLite database at `db_path`.
///
/// - Creates the database file and parent directories if they don't exist.
/// - Enables WAL journal mode.
/// - Waits up to five seconds on a locked database before failing.
///
/// # Errors
///
/// Returns the underlying [`sqlx::Error`] so callers can tell a locked or
/// missing database apart from a corrupt one.
pub async fn connect(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Primary SQLite result code carried by a database error, if any.
///
/// SQLite reports extended codes (e.g. `267` for `SQLITE_CORRUPT_VTAB`); the
/// low byte is the primary code.
pub fn sqlite_code(err: &sqlx::Error) -> Option<i32> {
    match err {
        sqlx::Error::Database(db) => db
            .code()
            .and_then(|c| c.parse::<i32>().ok())
            .map(|c| c & 0xff),
        _ => None,
    }
}

/// `SQLITE_BUSY`
pub const SQLITE_BUSY: i32 = 5;
/// `SQLITE_LOCKED`
pub const SQLITE_LOCKED: i32 = 6;
/// `SQLITE_CORRUPT`
pub const SQLITE_CORRUPT: i32 = 11;
/// `SQLITE_NOTADB`
pub const SQLITE_NOTADB: i32 = 26;
