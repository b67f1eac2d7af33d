//! Bounded, persisted event log for the event dock.
//!
//! Captured events, custom messages, and structured records are normalized
//! into canonical [`LogEntry`](eventdock_types::LogEntry) records and
//! appended to a [`LogStore`]. The store enforces a maximum entry count
//! and a maximum serialized size together by evicting the oldest
//! entries, and writes the surviving sequence to a durable key-value slot
//! after every mutation.
//!
//! # Persistence contract
//!
//! In-memory state is authoritative. A failed write is logged and the
//! mutation still succeeds; a slot that cannot be read or parsed at startup
//! yields an empty log.
//!
//! # Usage
//!
//! ```rust,ignore
//! use eventdock_log::{LogPersistence, LogStore, MemorySlot};
//!
//! let persistence = LogPersistence::new("kibEventDock:logs:v1", Arc::new(MemorySlot::new()));
//! let mut store = LogStore::open(persistence, LogLimits::default());
//! store.append("user clicked save");
//! store.append(HostEvent::new("keydown").with("key", "s"));
//! ```

mod normalize;
mod persist;
mod store;

pub use normalize::{normalize, normalize_at, LogInput, SUMMARY_MAX_CHARS};
pub use persist::{LogPersistence, MemorySlot};
pub use store::{AppendOutcome, LogStore, StoreEvent};
