//! Shared types, error definitions, and constants for the event dock.
//!
//! This crate provides the foundational types used across all eventdock
//! crates: the host event snapshot handed to listeners, the canonical
//! [`LogEntry`] record, the key-value [`SlotStorage`] surface that durable
//! backends implement, and the parametric [`DockConfig`].
//!
//! No crate in the workspace depends on anything *except* `eventdock-types`
//! for cross-cutting type definitions. This keeps the dependency graph clean
//! and prevents circular dependencies.

use serde::{Deserialize, Serialize};

mod dock;
mod entry;
mod event;
mod storage;

pub use dock::{DockConfig, DockPosition, DockTheme, LimitError, LogLimits};
pub use entry::LogEntry;
pub use event::{ElementRef, HostEvent};
pub use storage::{PersistError, SlotStorage};

/// Default durable storage key for the persisted log array.
pub const DEFAULT_STORAGE_KEY: &str = "kibEventDock:logs:v1";

/// Default cap on the number of stored log entries.
pub const DEFAULT_MAX_ENTRIES: usize = 2000;

/// Default cap on the serialized size of the stored log, in bytes.
pub const DEFAULT_MAX_BYTES: usize = 2_000_000;

/// Event type assigned to entries that do not name their own category.
pub const CUSTOM_EVENT_TYPE: &str = "custom";

/// The event source object a listener is attached to.
///
/// Targets are plain comparable handles. Holding one never keeps the
/// underlying platform object alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTarget {
    /// The top-level window.
    Window,
    /// The document.
    Document,
    /// Any other node, identified by a host-assigned id.
    Node(u64),
}

impl EventTarget {
    /// Returns a short label for log fields.
    pub fn label(self) -> String {
        match self {
            Self::Window => "window".to_string(),
            Self::Document => "document".to_string(),
            Self::Node(id) => format!("node:{id}"),
        }
    }
}

impl std::fmt::Display for EventTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// Options forwarded to the host when attaching or detaching a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ListenerOptions {
    /// Attach in the capture phase.
    #[serde(default)]
    pub capture: bool,
    /// Promise the host never to cancel the event.
    #[serde(default)]
    pub passive: bool,
}

impl ListenerOptions {
    /// Options for a capture-phase listener.
    pub const CAPTURE: Self = Self {
        capture: true,
        passive: false,
    };
}
