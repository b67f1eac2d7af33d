//! Dock configuration.

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_MAX_BYTES, DEFAULT_MAX_ENTRIES, DEFAULT_STORAGE_KEY};

/// Where the floating dock button sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DockPosition {
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
}

impl DockPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }
}

/// Colors handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockTheme {
    pub fab_color: String,
    pub fab_text_color: String,
    pub modal_bg: String,
    pub modal_text_color: String,
}

impl Default for DockTheme {
    fn default() -> Self {
        Self {
            fab_color: "#0ea5e9".to_string(),
            fab_text_color: "#fff".to_string(),
            modal_bg: "#0f172a".to_string(),
            modal_text_color: "#e6eef8".to_string(),
        }
    }
}

/// Immutable dock options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockConfig {
    /// Placement of the floating button.
    pub position: DockPosition,
    /// Color theming.
    pub theme: DockTheme,
    /// Maximum number of retained log entries.
    pub max_entries: usize,
    /// Maximum compact JSON size of the retained log, in bytes.
    pub max_bytes: usize,
    /// Durable storage key of the log slot.
    pub storage_key: String,
    /// Whether the unread badge is maintained.
    pub show_badge: bool,
    /// Whether the default event capture list is registered on creation.
    pub capture_defaults: bool,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            position: DockPosition::default(),
            theme: DockTheme::default(),
            max_entries: DEFAULT_MAX_ENTRIES,
            max_bytes: DEFAULT_MAX_BYTES,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            show_badge: true,
            capture_defaults: true,
        }
    }
}

impl DockConfig {
    /// Returns the validated store limits.
    ///
    /// # Errors
    ///
    /// Returns `LimitError` if either limit is zero.
    pub fn limits(&self) -> Result<LogLimits, LimitError> {
        LogLimits::new(self.max_entries, self.max_bytes)
    }
}

/// Errors produced when validating store limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LimitError {
    #[error("max_entries must be greater than zero")]
    ZeroEntries,
    #[error("max_bytes must be greater than zero")]
    ZeroBytes,
}

/// The two simultaneous caps enforced by the log store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLimits {
    max_entries: usize,
    max_bytes: usize,
}

impl LogLimits {
    /// Creates limits, rejecting zero values.
    pub fn new(max_entries: usize, max_bytes: usize) -> Result<Self, LimitError> {
        if max_entries == 0 {
            return Err(LimitError::ZeroEntries);
        }
        if max_bytes == 0 {
            return Err(LimitError::ZeroBytes);
        }
        Ok(Self {
            max_entries,
            max_bytes,
        })
    }

    pub fn max_entries(self) -> usize {
        self.max_entries
    }

    pub fn max_bytes(self) -> usize {
        self.max_bytes
    }
}

impl Default for LogLimits {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}
