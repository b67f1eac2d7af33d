//! Binding of the log to one durable storage slot.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use eventdock_types::{LogEntry, PersistError, SlotStorage};
use serde_json::Value;

/// Reads and writes the entry array stored under one key.
#[derive(Clone)]
pub struct LogPersistence {
    key: String,
    slot: Arc<dyn SlotStorage>,
}

impl LogPersistence {
    pub fn new(key: impl Into<String>, slot: Arc<dyn SlotStorage>) -> Self {
        Self {
            key: key.into(),
            slot,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Loads the stored entries. An empty or absent slot yields no entries.
    ///
    /// # Errors
    ///
    /// Returns `PersistError::Serialization` for malformed JSON,
    /// `PersistError::Corrupt` when the JSON is not an entry array, or the
    /// backend's own error.
    pub fn load(&self) -> Result<Vec<LogEntry>, PersistError> {
        let raw = match self.slot.read(&self.key)? {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Ok(Vec::new()),
        };

        let value: Value = serde_json::from_str(&raw)?;
        if !value.is_array() {
            return Err(PersistError::Corrupt {
                key: self.key.clone(),
            });
        }
        serde_json::from_value(value).map_err(|_| PersistError::Corrupt {
            key: self.key.clone(),
        })
    }

    /// Replaces the stored array with `entries`.
    ///
    /// # Errors
    ///
    /// Returns the backend's error, e.g. `PersistError::QuotaExceeded`.
    pub fn save(&self, entries: &[LogEntry]) -> Result<(), PersistError> {
        let json = serde_json::to_string(entries)?;
        self.slot.write(&self.key, &json)
    }

    /// Removes the stored array.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    pub fn clear(&self) -> Result<(), PersistError> {
        self.slot.remove(&self.key)
    }
}

impl std::fmt::Debug for LogPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogPersistence")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// A process-local slot store.
///
/// An optional quota caps the total size of all keys and values, the way
/// browser storage does. The store can also be switched into a failing
/// state where every operation errors.
#[derive(Debug, Default)]
pub struct MemorySlot {
    values: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
    failing: AtomicBool,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding at most `quota` bytes of keys and values.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    /// Makes every subsequent operation fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns the raw value under `key`, bypassing the failure switch.
    pub fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    /// Stores a raw value, bypassing quota and failure switch.
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.into(), value.into());
    }

    fn check_available(&self) -> Result<(), PersistError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistError::backend("memory slot unavailable"));
        }
        Ok(())
    }
}

impl SlotStorage for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        self.check_available()?;
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistError> {
        self.check_available()?;
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(quota) = self.quota {
            let others: usize = values
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = key.len() + value.len();
            if others + needed > quota {
                return Err(PersistError::QuotaExceeded { needed, quota });
            }
        }
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        self.check_available()?;
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.remove(key);
        Ok(())
    }
}
