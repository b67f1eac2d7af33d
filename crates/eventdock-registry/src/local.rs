//! In-process host event source.

use std::collections::HashSet;
use std::sync::Mutex;

use eventdock_types::{EventTarget, HostEvent, ListenerOptions};

use crate::{AttachError, EventHandler, EventSource};

struct Attached {
    target: EventTarget,
    event: String,
    handler: EventHandler,
    capture: bool,
}

impl Attached {
    fn matches(&self, target: EventTarget, event: &str, handler: &EventHandler, capture: bool) -> bool {
        self.target == target
            && self.event == event
            && self.capture == capture
            && self.handler.same_as(handler)
    }
}

/// An event source that dispatches events handed to it by the embedding
/// application.
///
/// Listener bookkeeping follows platform rules: attaching the same
/// `(target, event, handler, capture)` twice is a no-op, and a listener
/// detached while an event is being dispatched is not invoked for that
/// event if it has not run yet.
#[derive(Default)]
pub struct LocalEventSource {
    listeners: Mutex<Vec<Attached>>,
    rejected: Mutex<HashSet<String>>,
}

impl LocalEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every future attach for `event` fail.
    pub fn reject(&self, event: impl Into<String>) {
        let mut rejected = self.rejected.lock().unwrap_or_else(|e| e.into_inner());
        rejected.insert(event.into());
    }

    /// Delivers `event` to the listeners on `target` in attach order,
    /// capture-phase listeners first.
    ///
    /// Returns the number of handlers invoked.
    pub fn dispatch(&self, target: EventTarget, event: &HostEvent) -> usize {
        let snapshot: Vec<(EventHandler, bool)> = {
            let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
            let matching = listeners
                .iter()
                .filter(|l| l.target == target && l.event == event.name());
            let (capture, bubble): (Vec<_>, Vec<_>) = matching.partition(|l| l.capture);
            capture
                .into_iter()
                .chain(bubble)
                .map(|l| (l.handler.clone(), l.capture))
                .collect()
        };

        let mut invoked = 0;
        for (handler, capture) in snapshot {
            if !self.is_attached_with(target, event.name(), &handler, capture) {
                continue;
            }
            handler.call(event);
            invoked += 1;
        }
        tracing::trace!(event = event.name(), target = %target, invoked, "dispatched host event");
        invoked
    }

    /// Whether `handler` is attached to `target` for `event` in either phase.
    pub fn is_attached(&self, target: EventTarget, event: &str, handler: &EventHandler) -> bool {
        self.is_attached_with(target, event, handler, false)
            || self.is_attached_with(target, event, handler, true)
    }

    /// Number of listeners on `target` for `event`.
    pub fn listener_count(&self, target: EventTarget, event: &str) -> usize {
        let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        listeners
            .iter()
            .filter(|l| l.target == target && l.event == event)
            .count()
    }

    /// Number of listeners across all targets and events.
    pub fn total_listeners(&self) -> usize {
        let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        listeners.len()
    }

    fn is_attached_with(
        &self,
        target: EventTarget,
        event: &str,
        handler: &EventHandler,
        capture: bool,
    ) -> bool {
        let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        listeners
            .iter()
            .any(|l| l.matches(target, event, handler, capture))
    }
}

impl EventSource for LocalEventSource {
    fn attach(
        &self,
        target: EventTarget,
        event: &str,
        handler: &EventHandler,
        options: ListenerOptions,
    ) -> Result<(), AttachError> {
        {
            let rejected = self.rejected.lock().unwrap_or_else(|e| e.into_inner());
            if rejected.contains(event) {
                return Err(AttachError::Rejected {
                    event: event.to_string(),
                    target,
                });
            }
        }

        let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        if listeners
            .iter()
            .any(|l| l.matches(target, event, handler, options.capture))
        {
            return Ok(());
        }
        listeners.push(Attached {
            target,
            event: event.to_string(),
            handler: handler.clone(),
            capture: options.capture,
        });
        Ok(())
    }

    fn detach(
        &self,
        target: EventTarget,
        event: &str,
        handler: &EventHandler,
        options: ListenerOptions,
    ) {
        let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(pos) = listeners
            .iter()
            .position(|l| l.matches(target, event, handler, options.capture))
        {
            listeners.remove(pos);
        }
    }
}
