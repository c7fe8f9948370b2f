//! Opening the favorites database.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;

use super::migrations::run_migrations;
use super::paths::{AppDir, app_file};

/// Database file name.
const DB_FILE_NAME: &str = "reelcat.db";

/// How long a writer waits for another connection's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the favorites database under `dir` (or the user data directory),
/// creating it and applying pending migrations.
///
/// # Errors
///
/// Returns an error if the path cannot be resolved, the file cannot be
/// opened, or a migration fails.
pub fn open_db(dir: Option<&PathBuf>) -> Result<Connection> {
    let db_path = app_file(dir, AppDir::Data, DB_FILE_NAME)?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let conn = Connection::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .context("failed to set busy timeout")?;
    run_migrations(&conn).context("database migration failed")?;

    tracing::debug!(path = %db_path.display(), "favorites database ready");
    Ok(conn)
}
