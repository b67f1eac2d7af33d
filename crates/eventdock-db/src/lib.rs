//! SQLite storage backend for the event dock.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization,
//! embedded SQL migrations, and [`SqliteSlot`], a durable key-value slot
//! store the log persists through.
//!
//! # Design decisions
//!
//! - **SQLite with WAL mode**: no external database process required, and a
//!   single file survives restarts the way browser storage survives reloads.
//! - **`r2d2` connection pool**: bounded connection reuse without manual
//!   lifetime management.
//! - **Embedded migrations**: SQL files are compiled into the binary via
//!   `include_str!`, so the schema cannot drift from the code that uses it.

mod migrations;
mod pool;
mod slot;

pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
pub use slot::{open_slot_store, DbError, SqliteSlot};
