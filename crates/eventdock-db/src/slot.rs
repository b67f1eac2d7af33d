//! [`SlotStorage`] over the `kv_slots` table.

use eventdock_types::{PersistError, SlotStorage};
use rusqlite::{params, OptionalExtension};
use thiserror::Error;

use crate::migrations::{run_migrations, MigrationError};
use crate::pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};

/// Errors raised while opening the slot database.
#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("failed to get a pooled connection: {0}")]
    Connection(#[from] r2d2::Error),

    #[error(transparent)]
    Migration(#[from] MigrationError),
}

/// Durable slot store backed by a SQLite pool.
#[derive(Clone)]
pub struct SqliteSlot {
    pool: DbPool,
}

impl SqliteSlot {
    /// Wraps an existing pool. The schema must already be migrated.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl std::fmt::Debug for SqliteSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSlot")
            .field("max_size", &self.pool.max_size())
            .finish()
    }
}

/// Creates the pool at `db_path`, runs pending migrations, and returns a
/// ready slot store.
///
/// # Errors
///
/// Returns `DbError` if the pool cannot be built or a migration fails.
pub fn open_slot_store(db_path: &str, settings: DbRuntimeSettings) -> Result<SqliteSlot, DbError> {
    let pool = create_pool(db_path, settings)?;
    let conn = pool.get()?;
    let applied = run_migrations(&conn)?;
    drop(conn);

    tracing::info!(path = db_path, applied, "slot store ready");
    Ok(SqliteSlot::new(pool))
}

impl SlotStorage for SqliteSlot {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        let conn = self.pool.get().map_err(PersistError::backend)?;
        conn.query_row(
            "SELECT value FROM kv_slots WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(PersistError::backend)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let conn = self.pool.get().map_err(PersistError::backend)?;
        conn.execute(
            "INSERT INTO kv_slots (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            params![key, value],
        )
        .map_err(PersistError::backend)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        let conn = self.pool.get().map_err(PersistError::backend)?;
        conn.execute("DELETE FROM kv_slots WHERE key = ?1", params![key])
            .map_err(PersistError::backend)?;
        Ok(())
    }
}
