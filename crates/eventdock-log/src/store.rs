//! The bounded, dual-limited log store.
//!
//! All writes go through [`LogStore::append`], which normalizes the input,
//! enforces the count limit and then the size limit by evicting from the
//! front, persists the result, and notifies subscribers.
//!
//! The serialized size of the sequence is tracked incrementally: the
//! compact JSON encoding of `n` entries is the sum of their encodings plus
//! `n - 1` separating commas plus the two brackets, so it never has to be
//! re-encoded to check the limit.

use std::collections::VecDeque;

use eventdock_types::{LogEntry, LogLimits};
use tokio::sync::broadcast;

use crate::normalize::{normalize, LogInput};
use crate::persist::LogPersistence;

/// Capacity of the change notification channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A change notification for observers such as unread counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Exactly one entry was added.
    Appended {
        /// Id of the new entry.
        entry_id: String,
        /// Number of entries after eviction.
        total: usize,
    },
    /// The log was emptied.
    Cleared,
}

/// Result of a single append.
#[derive(Debug, Clone, PartialEq)]
pub struct AppendOutcome {
    /// The normalized entry that was appended.
    pub entry: LogEntry,
    /// Number of older entries evicted to satisfy the limits.
    pub evicted: usize,
    /// Whether the durable write succeeded.
    pub persisted: bool,
}

/// Ordered, append-only log under a count limit and a byte limit.
pub struct LogStore {
    entries: VecDeque<LogEntry>,
    sizes: VecDeque<usize>,
    entry_bytes: usize,
    limits: LogLimits,
    persistence: LogPersistence,
    events_tx: broadcast::Sender<StoreEvent>,
}

impl LogStore {
    /// Opens the store, loading whatever the slot holds.
    ///
    /// Never fails: unreadable or malformed data is logged and replaced by
    /// an empty log. Loaded entries are trimmed to `limits` in memory.
    pub fn open(persistence: LogPersistence, limits: LogLimits) -> Self {
        let loaded = match persistence.load() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    key = persistence.key(),
                    error = %e,
                    "failed to load persisted log, starting empty"
                );
                Vec::new()
            }
        };

        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let mut store = Self {
            entries: VecDeque::with_capacity(loaded.len()),
            sizes: VecDeque::with_capacity(loaded.len()),
            entry_bytes: 0,
            limits,
            persistence,
            events_tx,
        };
        for entry in loaded {
            store.push_back(entry);
        }
        let evicted = store.enforce_limits();
        tracing::debug!(
            key = store.persistence.key(),
            entries = store.entries.len(),
            evicted,
            "log store opened"
        );
        store
    }

    /// Appends one input and returns what happened.
    pub fn append(&mut self, input: impl Into<LogInput>) -> AppendOutcome {
        let entry = normalize(input);
        self.push_back(entry.clone());
        let evicted = self.enforce_limits();
        let persisted = self.persist();

        let _ = self.events_tx.send(StoreEvent::Appended {
            entry_id: entry.id.clone(),
            total: self.entries.len(),
        });

        AppendOutcome {
            entry,
            evicted,
            persisted,
        }
    }

    /// Removes every entry and the durable copy.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.sizes.clear();
        self.entry_bytes = 0;
        if let Err(e) = self.persistence.clear() {
            tracing::warn!(key = self.persistence.key(), error = %e, "failed to clear persisted log");
        }
        let _ = self.events_tx.send(StoreEvent::Cleared);
    }

    /// Returns a copy of every entry, oldest first.
    pub fn get_all(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The count and size caps this store enforces.
    pub fn limits(&self) -> LogLimits {
        self.limits
    }

    /// Compact JSON size of the whole sequence, in bytes.
    pub fn byte_size(&self) -> usize {
        match self.entries.len() {
            0 => 2,
            n => 2 + self.entry_bytes + (n - 1),
        }
    }

    /// Subscribes to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events_tx.subscribe()
    }

    fn push_back(&mut self, entry: LogEntry) {
        let size = entry.encoded_len();
        self.entry_bytes += size;
        self.sizes.push_back(size);
        self.entries.push_back(entry);
    }

    fn pop_front(&mut self) -> Option<LogEntry> {
        let entry = self.entries.pop_front()?;
        if let Some(size) = self.sizes.pop_front() {
            self.entry_bytes -= size;
        }
        Some(entry)
    }

    /// Evicts oldest entries until both limits hold. Count first, then size.
    fn enforce_limits(&mut self) -> usize {
        let mut evicted = 0;
        while self.entries.len() > self.limits.max_entries() {
            self.pop_front();
            evicted += 1;
        }
        while !self.entries.is_empty() && self.byte_size() > self.limits.max_bytes() {
            self.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            tracing::debug!(
                evicted,
                remaining = self.entries.len(),
                bytes = self.byte_size(),
                "evicted oldest log entries"
            );
        }
        evicted
    }

    fn persist(&mut self) -> bool {
        match self.persistence.save(self.entries.make_contiguous()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    key = self.persistence.key(),
                    entries = self.entries.len(),
                    error = %e,
                    "failed to persist log, keeping in-memory copy"
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for LogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStore")
            .field("entries", &self.entries.len())
            .field("bytes", &self.byte_size())
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}
