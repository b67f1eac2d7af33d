//! Typed subscriptions to document and window events.
//!
//! [`DocumentEvents`] turns raw host events into the values in
//! [`crate::payloads`], reading whatever extra state it needs from the
//! [`HostEnvironment`] at dispatch time. Every listener it attaches is
//! recorded in its [`Registry`], so [`DocumentEvents::remove_all_listeners`]
//! releases all of them, including pending `ready`/`loaded` callbacks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use eventdock_registry::{AttachError, Binding, Disposer, EventHandler, Registry};
use eventdock_timing::{debounce, throttle, Debounced};
use eventdock_types::{ElementRef, EventTarget, HostEvent};

use crate::host::{HostEnvironment, ScrollPosition, ViewportSize, VisibilityState};
use crate::payloads::{
    ClipboardAction, ClipboardChange, DocumentState, DropData, ErrorReport, HashChange, KeyCombo,
    NavigationChange,
};
use crate::selector::Selector;
use crate::DockError;

/// Quiet period applied to resize notifications by default.
pub const DEFAULT_RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

/// Minimum spacing of scroll notifications by default.
pub const DEFAULT_SCROLL_THROTTLE: Duration = Duration::from_millis(16);

const DOM_CONTENT_LOADED: &str = "DOMContentLoaded";
const LOAD: &str = "load";

/// Owned by a debounced listener. The registry and the host drop their
/// copies of the handler on release, which cancels the pending call.
struct CancelOnRelease(Debounced<()>);

impl Drop for CancelOnRelease {
    fn drop(&mut self) {
        if self.0.cancel() {
            tracing::debug!(wait_ms = self.0.wait().as_millis() as u64, "pending debounced call cancelled");
        }
    }
}

#[derive(Debug)]
struct Lifecycle {
    ready: AtomicBool,
    loaded: AtomicBool,
}

/// Document / window event facade.
///
/// An explicit context object: create one per host, share it by reference.
pub struct DocumentEvents {
    registry: Registry,
    host: Arc<dyn HostEnvironment>,
    lifecycle: Arc<Lifecycle>,
}

impl DocumentEvents {
    /// Creates the facade and starts ready-state tracking.
    ///
    /// # Errors
    ///
    /// Returns the host's `AttachError` if a tracking listener cannot be
    /// attached.
    pub fn new(registry: Registry, host: Arc<dyn HostEnvironment>) -> Result<Self, AttachError> {
        let state = host.ready_state();
        let lifecycle = Arc::new(Lifecycle {
            ready: AtomicBool::new(state.is_ready()),
            loaded: AtomicBool::new(state.is_loaded()),
        });
        let events = Self {
            registry,
            host,
            lifecycle,
        };

        if !events.is_ready() {
            let lifecycle = Arc::clone(&events.lifecycle);
            events.once(DOM_CONTENT_LOADED, EventTarget::Document, move || {
                lifecycle.ready.store(true, Ordering::SeqCst);
            })?;
        }
        if !events.is_loaded() {
            let lifecycle = Arc::clone(&events.lifecycle);
            events.once(LOAD, EventTarget::Window, move || {
                // A load event implies the DOM was parsed.
                lifecycle.ready.store(true, Ordering::SeqCst);
                lifecycle.loaded.store(true, Ordering::SeqCst);
            })?;
        }
        tracing::debug!(ready_state = ?state, "document events initialised");
        Ok(events)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle.ready.load(Ordering::SeqCst)
    }

    pub fn is_loaded(&self) -> bool {
        self.lifecycle.loaded.load(Ordering::SeqCst)
    }

    /// Runs `callback` once the DOM is parsed: now if it already is,
    /// otherwise on `DOMContentLoaded`.
    ///
    /// # Errors
    ///
    /// Returns the host's `AttachError` when the callback must be deferred
    /// and the listener cannot be attached.
    pub fn ready<F>(&self, callback: F) -> Result<(), AttachError>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_ready() {
            callback();
            return Ok(());
        }
        self.once(DOM_CONTENT_LOADED, EventTarget::Document, callback)
    }

    /// Runs `callback` once every resource has loaded.
    ///
    /// # Errors
    ///
    /// Same as [`DocumentEvents::ready`].
    pub fn loaded<F>(&self, callback: F) -> Result<(), AttachError>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_loaded() {
            callback();
            return Ok(());
        }
        self.once(LOAD, EventTarget::Window, callback)
    }

    /// Calls `callback(hidden, state)` whenever page visibility changes.
    pub fn on_visibility_change<F>(&self, callback: F) -> Result<Disposer, AttachError>
    where
        F: Fn(bool, VisibilityState) + Send + Sync + 'static,
    {
        let host = Arc::clone(&self.host);
        self.listen(
            "visibilitychange",
            EventTarget::Document,
            EventHandler::new(move |_| {
                let state = host.visibility();
                callback(state == VisibilityState::Hidden, state);
            }),
        )
    }

    /// Calls `callback(true)` on window focus and `callback(false)` on blur.
    pub fn on_focus_change<F>(&self, callback: F) -> Result<Disposer, AttachError>
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.boolean_pair("focus", "blur", callback)
    }

    /// Reports the viewport once resizing has paused for `wait`.
    ///
    /// Releasing the subscription also drops a report that is still
    /// waiting out its quiet period.
    ///
    /// # Errors
    ///
    /// Fails outside a tokio runtime or if the listener cannot be attached.
    pub fn on_resize<F>(&self, callback: F, wait: Duration) -> Result<Disposer, DockError>
    where
        F: Fn(ViewportSize) + Send + Sync + 'static,
    {
        let host = Arc::clone(&self.host);
        let pending = CancelOnRelease(debounce(move |()| callback(host.viewport()), wait)?);
        let disposer = self.listen(
            "resize",
            EventTarget::Window,
            EventHandler::new(move |_| pending.0.call(())),
        )?;
        Ok(disposer)
    }

    /// Reports the scroll position at most once per `limit`.
    pub fn on_scroll<F>(&self, callback: F, limit: Duration) -> Result<Disposer, AttachError>
    where
        F: Fn(ScrollPosition) + Send + Sync + 'static,
    {
        let host = Arc::clone(&self.host);
        let throttled = throttle(move |()| callback(host.scroll()), limit);
        self.listen(
            "scroll",
            EventTarget::Document,
            EventHandler::new(move |_| {
                throttled.call(());
            }),
        )
    }

    /// Reports every key press on the document.
    pub fn on_keyboard<F>(&self, callback: F) -> Result<Disposer, AttachError>
    where
        F: Fn(KeyCombo) + Send + Sync + 'static,
    {
        self.listen(
            "keydown",
            EventTarget::Document,
            EventHandler::new(move |event| callback(KeyCombo::from_event(event))),
        )
    }

    /// Reports history traversal with the location after it.
    pub fn on_navigation<F>(&self, callback: F) -> Result<Disposer, AttachError>
    where
        F: Fn(NavigationChange) + Send + Sync + 'static,
    {
        let host = Arc::clone(&self.host);
        self.listen(
            "popstate",
            EventTarget::Window,
            EventHandler::new(move |event| {
                callback(NavigationChange::from_event(event, host.location()));
            }),
        )
    }

    pub fn on_hash_change<F>(&self, callback: F) -> Result<Disposer, AttachError>
    where
        F: Fn(HashChange) + Send + Sync + 'static,
    {
        let host = Arc::clone(&self.host);
        self.listen(
            "hashchange",
            EventTarget::Window,
            EventHandler::new(move |event| {
                callback(HashChange::from_event(event, host.location()));
            }),
        )
    }

    /// Calls `callback(true)` when the host goes online, `false` when it
    /// goes offline.
    pub fn on_connection_change<F>(&self, callback: F) -> Result<Disposer, AttachError>
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.boolean_pair("online", "offline", callback)
    }

    /// Reports copy, cut and paste on the document.
    pub fn on_clipboard<F>(&self, callback: F) -> Result<Disposer, AttachError>
    where
        F: Fn(ClipboardChange) + Send + Sync + 'static,
    {
        let host = Arc::clone(&self.host);
        let handler = EventHandler::new(move |event| {
            if let Some(change) = ClipboardChange::from_event(event, || host.selection_text()) {
                callback(change);
            }
        });
        self.registry.register_all(
            ClipboardAction::EVENTS
                .iter()
                .map(|name| Binding::new(*name, EventTarget::Document, handler.clone())),
        )
    }

    /// Reports content dropped on the document.
    pub fn on_drag_drop<F>(&self, callback: F) -> Result<Disposer, AttachError>
    where
        F: Fn(DropData) + Send + Sync + 'static,
    {
        self.listen(
            "drop",
            EventTarget::Document,
            EventHandler::new(move |event| callback(DropData::from_event(event))),
        )
    }

    /// Reports uncaught errors and unhandled promise rejections.
    pub fn on_error<F>(&self, callback: F) -> Result<Disposer, AttachError>
    where
        F: Fn(ErrorReport) + Send + Sync + 'static,
    {
        let handler = EventHandler::new(move |event| callback(ErrorReport::from_event(event)));
        self.registry.register_all([
            Binding::new("error", EventTarget::Window, handler.clone()),
            Binding::new("unhandledrejection", EventTarget::Window, handler),
        ])
    }

    /// Calls `callback` for `event` on the document when the originating
    /// element matches `selector`.
    ///
    /// Only the origin element itself is tested; events without an origin
    /// never match.
    ///
    /// # Errors
    ///
    /// Fails on an unsupported selector or if the listener cannot be
    /// attached.
    pub fn delegate<F>(&self, selector: &str, event: &str, callback: F) -> Result<Disposer, DockError>
    where
        F: Fn(&HostEvent, &ElementRef) + Send + Sync + 'static,
    {
        let selector: Selector = selector.parse()?;
        let disposer = self.listen(
            event,
            EventTarget::Document,
            EventHandler::new(move |ev| {
                if let Some(origin) = ev.origin().filter(|o| selector.matches(o)) {
                    callback(ev, origin);
                }
            }),
        )?;
        Ok(disposer)
    }

    /// Releases every listener attached through this facade.
    pub fn remove_all_listeners(&self) -> usize {
        self.registry.unregister_all()
    }

    pub fn get_state(&self) -> DocumentState {
        DocumentState {
            is_ready: self.is_ready(),
            is_loaded: self.is_loaded(),
            is_online: self.host.is_online(),
            is_visible: !self.host.is_hidden(),
            has_focus: self.host.has_focus(),
            viewport: self.host.viewport().into(),
            scroll: self.host.scroll().into(),
        }
    }

    fn listen(
        &self,
        event: &str,
        target: EventTarget,
        handler: EventHandler,
    ) -> Result<Disposer, AttachError> {
        let token = self.registry.register(event, handler, target)?;
        Ok(self.registry.disposer(vec![token]))
    }

    fn boolean_pair<F>(&self, on: &str, off: &str, callback: F) -> Result<Disposer, AttachError>
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let callback = Arc::new(callback);
        let on_cb = Arc::clone(&callback);
        self.registry.register_all([
            Binding::new(on, EventTarget::Window, EventHandler::new(move |_| on_cb(true))),
            Binding::new(off, EventTarget::Window, EventHandler::new(move |_| callback(false))),
        ])
    }

    /// Attaches a listener that runs `callback` on the first `event` and
    /// then releases itself.
    fn once<F>(&self, event: &str, target: EventTarget, callback: F) -> Result<(), AttachError>
    where
        F: FnOnce() + Send + 'static,
    {
        let callback = Mutex::new(Some(callback));
        let slot: Arc<Mutex<Option<Disposer>>> = Arc::new(Mutex::new(None));
        let own = Arc::clone(&slot);

        let token = self.registry.register(
            event,
            EventHandler::new(move |_| {
                let pending = callback.lock().unwrap_or_else(|e| e.into_inner()).take();
                if let Some(disposer) = own.lock().unwrap_or_else(|e| e.into_inner()).take() {
                    disposer.dispose();
                }
                if let Some(callback) = pending {
                    callback();
                }
            }),
            target,
        )?;
        *slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(self.registry.disposer(vec![token]));
        Ok(())
    }
}

impl std::fmt::Debug for DocumentEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentEvents")
            .field("registry", &self.registry)
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}
