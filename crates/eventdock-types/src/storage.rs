//! The durable key-value surface the log store persists through.

/// Errors raised by a storage backend or while encoding stored values.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The backend refused the write because it would exceed its quota.
    #[error("storage quota exceeded: {needed} bytes requested, quota is {quota} bytes")]
    QuotaExceeded {
        /// Size of the rejected value.
        needed: usize,
        /// Total capacity of the backend.
        quota: usize,
    },

    /// The backend itself failed (I/O, SQL, connection pool, ...).
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// JSON encoding or decoding failed.
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The stored value exists but is not a log entry array.
    #[error("stored value under '{key}' is not a log entry array")]
    Corrupt {
        /// The slot key that held the value.
        key: String,
    },
}

impl PersistError {
    /// Wraps an arbitrary backend failure.
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Backend(err.into())
    }
}

/// A string key-value store with single-slot semantics.
///
/// Implementations must be cheap to share between threads; the log store
/// is the only writer of its slot and reads it once at startup.
pub trait SlotStorage: Send + Sync {
    /// Returns the value under `key`, or `None` when the slot is empty.
    fn read(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Replaces the value under `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), PersistError>;

    /// Empties the slot. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), PersistError>;
}

impl<T: SlotStorage + ?Sized> SlotStorage for std::sync::Arc<T> {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        (**self).remove(key)
    }
}
