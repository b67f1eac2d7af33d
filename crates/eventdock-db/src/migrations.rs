//! Embedded SQL migrations.
//!
//! Migrations are SQL files compiled into the binary. The schema version is
//! SQLite's `user_version`: migration `n` (1-based) moves it to `n`, inside
//! the same transaction as its statements, so a failed migration leaves
//! both the schema and the version untouched.

use rusqlite::Connection;
use thiserror::Error;

/// `(name, sql)` in application order. New migrations are appended here.
const MIGRATIONS: &[(&str, &str)] = &[(
    "001_kv_slots",
    include_str!("migrations/001_kv_slots.sql"),
)];

/// Errors that can occur during migration execution.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// A SQL statement within a migration failed.
    #[error("migration '{name}' failed: {source}")]
    ExecutionFailed {
        /// The name of the migration that failed.
        name: &'static str,
        /// The underlying SQLite error.
        source: rusqlite::Error,
    },

    /// Failed to read the schema version.
    #[error("failed to read schema version: {0}")]
    StateQuery(rusqlite::Error),
}

/// Runs all pending migrations against the given connection.
///
/// Returns the number of migrations applied by this call.
///
/// # Errors
///
/// Returns `MigrationError` if the schema version cannot be read or a
/// migration fails to execute.
pub fn run_migrations(conn: &Connection) -> Result<usize, MigrationError> {
    run_migrations_from_list(conn, MIGRATIONS)
}

fn run_migrations_from_list(
    conn: &Connection,
    migrations: &[(&'static str, &'static str)],
) -> Result<usize, MigrationError> {
    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(MigrationError::StateQuery)?;
    let current = usize::try_from(version).unwrap_or(0);

    let mut applied = 0;
    for (index, &(name, sql)) in migrations.iter().enumerate().skip(current) {
        tracing::info!(migration = name, "applying migration");

        let failed = |source| MigrationError::ExecutionFailed { name, source };
        let tx = conn.unchecked_transaction().map_err(failed)?;
        tx.execute_batch(sql).map_err(failed)?;
        tx.pragma_update(None, "user_version", (index + 1) as i64)
            .map_err(failed)?;
        tx.commit().map_err(failed)?;

        applied += 1;
    }

    if applied == 0 {
        tracing::debug!(version, "schema up to date");
    }
    Ok(applied)
}
