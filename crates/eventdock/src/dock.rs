//! The event dock: a bounded, persisted log fed by host events.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use eventdock_log::{AppendOutcome, LogInput, LogPersistence, LogStore, StoreEvent};
use eventdock_registry::{Binding, Disposer, EventHandler, Registry};
use eventdock_share::{export_payload, ExportPipeline, ShareOutcome};
use eventdock_types::{DockConfig, EventTarget, ListenerOptions, LogEntry, SlotStorage};
use tokio::sync::broadcast;

use crate::badge::Badge;
use crate::host::HostEnvironment;
use crate::DockError;

/// One entry of the capture list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSpec {
    pub event: &'static str,
    pub target: EventTarget,
    pub capture: bool,
}

const fn spec(event: &'static str, target: EventTarget, capture: bool) -> CaptureSpec {
    CaptureSpec {
        event,
        target,
        capture,
    }
}

/// Events recorded when `capture_defaults` is enabled.
pub const DEFAULT_CAPTURE: &[CaptureSpec] = &[
    spec("visibilitychange", EventTarget::Document, false),
    spec("online", EventTarget::Window, false),
    spec("offline", EventTarget::Window, false),
    spec("popstate", EventTarget::Window, false),
    spec("hashchange", EventTarget::Window, false),
    spec("keydown", EventTarget::Window, false),
    spec("keyup", EventTarget::Window, false),
    spec("keypress", EventTarget::Window, false),
    spec("click", EventTarget::Document, true),
    spec("dblclick", EventTarget::Document, true),
    spec("contextmenu", EventTarget::Document, true),
    spec("resize", EventTarget::Window, false),
    spec("scroll", EventTarget::Window, false),
    spec("copy", EventTarget::Document, true),
    spec("cut", EventTarget::Document, true),
    spec("paste", EventTarget::Document, true),
    spec("dragstart", EventTarget::Document, true),
    spec("dragend", EventTarget::Document, true),
    spec("drop", EventTarget::Document, true),
    spec("error", EventTarget::Window, true),
    spec("unhandledrejection", EventTarget::Window, false),
    spec("pagehide", EventTarget::Window, false),
    spec("pageshow", EventTarget::Window, false),
    spec("beforeunload", EventTarget::Window, false),
    spec("pointerdown", EventTarget::Document, true),
    spec("pointerup", EventTarget::Document, true),
    spec("touchstart", EventTarget::Document, true),
    spec("touchend", EventTarget::Document, true),
];

/// State reachable from listeners. Never holds the registry, so listeners
/// do not keep the dock's bookkeeping alive.
struct Shared {
    store: Mutex<LogStore>,
    badge: Mutex<Badge>,
    open: AtomicBool,
    online: AtomicBool,
}

impl Shared {
    fn record(&self, input: LogInput) -> AppendOutcome {
        let outcome = self
            .store
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .append(input);
        self.badge
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .record_append();
        outcome
    }

    fn set_open(&self, open: bool) {
        self.open.store(open, Ordering::SeqCst);
        if open {
            self.badge
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .mark_read();
        }
    }
}

/// A diagnostic log of host events with an unread badge and export.
pub struct EventDock {
    config: DockConfig,
    registry: Registry,
    shared: Arc<Shared>,
    pipeline: ExportPipeline,
    subscriptions: Mutex<Vec<Disposer>>,
}

impl EventDock {
    /// Opens the log from `slot` and attaches the dock's listeners.
    ///
    /// Connection tracking and Escape-to-close are always attached; the
    /// default capture list only when `config.capture_defaults` is set.
    ///
    /// # Errors
    ///
    /// Returns `DockError::Limits` for zero limits and `DockError::Attach`
    /// if any listener cannot be attached, in which case none stay attached.
    pub fn create(
        config: DockConfig,
        registry: Registry,
        host: Arc<dyn HostEnvironment>,
        slot: Arc<dyn SlotStorage>,
        pipeline: ExportPipeline,
    ) -> Result<Self, DockError> {
        let limits = config.limits()?;
        let store = LogStore::open(LogPersistence::new(config.storage_key.clone(), slot), limits);

        let mut badge = Badge::new(config.show_badge);
        badge.sync_to(store.len());

        let shared = Arc::new(Shared {
            store: Mutex::new(store),
            badge: Mutex::new(badge),
            open: AtomicBool::new(false),
            online: AtomicBool::new(host.is_online()),
        });

        let dock = Self {
            config,
            registry,
            shared,
            pipeline,
            subscriptions: Mutex::new(Vec::new()),
        };

        if let Err(e) = dock.attach_listeners() {
            dock.dispose_all();
            return Err(e.into());
        }

        tracing::info!(
            storage_key = %dock.config.storage_key,
            entries = dock.len(),
            capture_defaults = dock.config.capture_defaults,
            "event dock created"
        );
        Ok(dock)
    }

    fn attach_listeners(&self) -> Result<(), eventdock_registry::AttachError> {
        let online = |value: bool| {
            let shared = Arc::clone(&self.shared);
            EventHandler::new(move |_| shared.online.store(value, Ordering::SeqCst))
        };
        let shared = Arc::clone(&self.shared);
        let escape = EventHandler::new(move |event| {
            if event.str_prop("key") == Some("Escape") && shared.open.load(Ordering::SeqCst) {
                shared.set_open(false);
            }
        });
        self.keep(self.registry.register_all([
            Binding::new("online", EventTarget::Window, online(true)),
            Binding::new("offline", EventTarget::Window, online(false)),
            Binding::new("keydown", EventTarget::Document, escape),
        ])?);

        if self.config.capture_defaults {
            let shared = Arc::clone(&self.shared);
            let record = EventHandler::new(move |event| {
                shared.record(event.into());
            });
            let bindings = DEFAULT_CAPTURE.iter().map(|entry| {
                Binding::new(entry.event, entry.target, record.clone()).with_options(ListenerOptions {
                    capture: entry.capture,
                    passive: false,
                })
            });
            self.keep(self.registry.register_all(bindings)?);
        }
        Ok(())
    }

    fn keep(&self, disposer: Disposer) {
        self.subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(disposer);
    }

    /// The options the dock was created with.
    pub fn config(&self) -> &DockConfig {
        &self.config
    }

    /// Appends a message, event, record or value to the log.
    pub fn add_log(&self, input: impl Into<LogInput>) -> AppendOutcome {
        self.shared.record(input.into())
    }

    /// Empties the log and its durable copy.
    pub fn clear(&self) {
        let mut store = self.shared.store.lock().unwrap_or_else(|e| e.into_inner());
        store.clear();
        self.shared
            .badge
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .sync_to(store.len());
    }

    /// Copies every entry, oldest first.
    pub fn get_all(&self) -> Vec<LogEntry> {
        self.shared
            .store
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_all()
    }

    /// Number of entries in the log.
    pub fn len(&self) -> usize {
        self.shared
            .store
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Whether the log holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pretty-printed JSON of the whole log.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error.
    pub fn export_payload(&self) -> Result<String, serde_json::Error> {
        export_payload(&self.get_all())
    }

    /// Hands the exported log to the first share channel that accepts it.
    pub async fn share(&self, prefer_rich: bool) -> ShareOutcome {
        let entries = self.get_all();
        self.pipeline.share(&entries, prefer_rich).await
    }

    /// Subscribes to append and clear notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.shared
            .store
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .subscribe()
    }

    /// Opens the panel and marks everything as read.
    pub fn open(&self) {
        self.shared.set_open(true);
    }

    /// Closes the panel. The unread count is left as it is.
    pub fn close(&self) {
        self.shared.set_open(false);
    }

    /// Flips the panel state and returns whether it is now open.
    pub fn toggle(&self) -> bool {
        let open = !self.is_open();
        self.shared.set_open(open);
        open
    }

    /// Whether the panel is currently open.
    pub fn is_open(&self) -> bool {
        self.shared.open.load(Ordering::SeqCst)
    }

    /// Connection status as of the last online/offline event.
    pub fn is_online(&self) -> bool {
        self.shared.online.load(Ordering::SeqCst)
    }

    /// Entries appended since the panel was last opened.
    pub fn unread(&self) -> usize {
        self.shared
            .badge
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .unread()
    }

    /// Badge text: empty, the count, or `99+`.
    pub fn badge_label(&self) -> String {
        self.shared
            .badge
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .label()
    }

    /// Releases every listener the dock attached. Returns how many were
    /// still live.
    pub fn dispose_all(&self) -> usize {
        let disposers = std::mem::take(
            &mut *self
                .subscriptions
                .lock()
                .unwrap_or_else(|e| e.into_inner()),
        );
        let released: usize = disposers.into_iter().map(Disposer::dispose).sum();
        if released > 0 {
            tracing::debug!(released, "event dock listeners released");
        }
        released
    }
}

impl Drop for EventDock {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

impl std::fmt::Debug for EventDock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDock")
            .field("storage_key", &self.config.storage_key)
            .field("open", &self.is_open())
            .field("online", &self.is_online())
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}
