//! Document and window event subscriptions plus the event dock.
//!
//! Two context objects sit on top of the lower crates:
//!
//! - [`DocumentEvents`]: typed subscriptions (ready state, visibility,
//!   focus, resize, scroll, keyboard, navigation, connectivity, clipboard,
//!   drag and drop, errors), each returning a [`Disposer`].
//! - [`EventDock`]: records host events into a bounded, persisted log and
//!   exports it through an [`ExportPipeline`].
//!
//! Both go through one [`Registry`] per host, so every listener either of
//! them attaches can be released deterministically.
//!
//! # Wiring
//!
//! ```rust,ignore
//! let config = eventdock::load_config(Some("eventdock.toml"))?;
//! eventdock::init_tracing(&config.logging);
//!
//! let source = Arc::new(LocalEventSource::new());
//! let registry = Registry::new(source.clone());
//! let host = Arc::new(SimulatedHost::default());
//!
//! let events = DocumentEvents::new(registry.clone(), host.clone())?;
//! let dock = EventDock::create(
//!     config.dock.clone(),
//!     registry,
//!     host,
//!     config.storage.open()?,
//!     ExportPipeline::new().with_clipboard(Arc::new(MemoryClipboard::new())),
//! )?;
//! ```

pub mod badge;
pub mod config;
pub mod dock;
mod error;
pub mod events;
pub mod host;
pub mod payloads;
pub mod selector;
pub mod telemetry;

pub use config::{load_config, Config, ConfigError};
pub use dock::{CaptureSpec, EventDock, DEFAULT_CAPTURE};
pub use error::DockError;
pub use events::{DocumentEvents, DEFAULT_RESIZE_DEBOUNCE, DEFAULT_SCROLL_THROTTLE};
pub use host::{HostEnvironment, HostSnapshot, SimulatedHost};
pub use telemetry::init_tracing;

pub use eventdock_registry::{Disposer, LocalEventSource, Registry};
pub use eventdock_share::{ExportPipeline, ShareOutcome};
