//! Token-addressed subscription bookkeeping.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use eventdock_types::{EventTarget, ListenerOptions};

use crate::{AttachError, EventHandler, EventSource};

/// Opaque identifier of one registered listener.
///
/// Tokens are issued from a per-registry monotonic counter and are never
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionToken(u64);

impl SubscriptionToken {
    /// The raw counter value, for log fields.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// One listener to attach as part of a group.
#[derive(Debug, Clone)]
pub struct Binding {
    pub event: String,
    pub target: EventTarget,
    pub handler: EventHandler,
    pub options: ListenerOptions,
}

impl Binding {
    /// A bubble-phase binding of `handler` to `event` on `target`.
    pub fn new(event: impl Into<String>, target: EventTarget, handler: EventHandler) -> Self {
        Self {
            event: event.into(),
            target,
            handler,
            options: ListenerOptions::default(),
        }
    }

    /// Replaces the listener options.
    pub fn with_options(mut self, options: ListenerOptions) -> Self {
        self.options = options;
        self
    }
}

struct Subscription {
    target: EventTarget,
    event: String,
    handler: EventHandler,
    options: ListenerOptions,
}

impl Subscription {
    /// Same host listener: hosts key attachments by target, event, handler
    /// and phase, so two such subscriptions share one attachment.
    fn same_listener(&self, target: EventTarget, event: &str, handler: &EventHandler, capture: bool) -> bool {
        self.target == target
            && self.event == event
            && self.options.capture == capture
            && self.handler.same_as(handler)
    }

    fn shares_attachment(&self, other: &Subscription) -> bool {
        self.same_listener(other.target, &other.event, &other.handler, other.options.capture)
    }
}

struct Inner {
    source: Arc<dyn EventSource>,
    next_token: AtomicU64,
    subscriptions: Mutex<BTreeMap<SubscriptionToken, Subscription>>,
}

impl Inner {
    /// Removes `token` and reports whether another live subscription still
    /// uses the same host attachment.
    fn take(&self, token: SubscriptionToken) -> Option<(Subscription, bool)> {
        let mut subs = self.subscriptions.lock().unwrap_or_else(|e| e.into_inner());
        let sub = subs.remove(&token)?;
        let shared = subs.values().any(|other| other.shares_attachment(&sub));
        Some((sub, shared))
    }

    fn release(&self, token: SubscriptionToken) -> bool {
        // The lock is dropped before detaching so the host may dispatch or
        // call back into the registry.
        let Some((sub, shared)) = self.take(token) else {
            return false;
        };
        if !shared {
            self.source
                .detach(sub.target, &sub.event, &sub.handler, sub.options);
        }
        tracing::debug!(
            token = %token,
            event = sub.event.as_str(),
            target = %sub.target,
            shared,
            "listener unregistered"
        );
        true
    }

    fn is_attached(&self, target: EventTarget, event: &str, handler: &EventHandler, capture: bool) -> bool {
        let subs = self.subscriptions.lock().unwrap_or_else(|e| e.into_inner());
        subs.values()
            .any(|sub| sub.same_listener(target, event, handler, capture))
    }
}

/// Tracks every listener attached through it.
///
/// Cloning a `Registry` yields another handle to the same bookkeeping.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<Inner>,
}

impl Registry {
    /// Creates an empty registry over a host event source.
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                next_token: AtomicU64::new(1),
                subscriptions: Mutex::new(BTreeMap::new()),
            }),
        }
    }

    /// Attaches `handler` to `target` for `event` with default options.
    ///
    /// # Errors
    ///
    /// Propagates the host's `AttachError`; nothing is recorded in that case.
    pub fn register(
        &self,
        event: &str,
        handler: EventHandler,
        target: EventTarget,
    ) -> Result<SubscriptionToken, AttachError> {
        self.register_with(event, handler, target, ListenerOptions::default())
    }

    /// Attaches `handler` with explicit listener options.
    ///
    /// Registering a listener that is already attached with the same
    /// target, event and phase issues a new token without attaching it a
    /// second time; the host listener stays attached until the last of
    /// those tokens is released.
    ///
    /// # Errors
    ///
    /// Propagates the host's `AttachError`; nothing is recorded in that case.
    pub fn register_with(
        &self,
        event: &str,
        handler: EventHandler,
        target: EventTarget,
        options: ListenerOptions,
    ) -> Result<SubscriptionToken, AttachError> {
        if !self.inner.is_attached(target, event, &handler, options.capture) {
            if let Err(e) = self.inner.source.attach(target, event, &handler, options) {
                tracing::warn!(event, target = %target, error = %e, "listener attach failed");
                return Err(e);
            }
        }

        let token = SubscriptionToken(self.inner.next_token.fetch_add(1, Ordering::Relaxed));
        let mut subs = self
            .inner
            .subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        subs.insert(
            token,
            Subscription {
                target,
                event: event.to_string(),
                handler,
                options,
            },
        );
        tracing::debug!(token = %token, event, target = %target, "listener registered");
        Ok(token)
    }

    /// Attaches a group of listeners that are released together.
    ///
    /// The group is all-or-nothing: if any attach fails, the bindings that
    /// were already attached are released before the error is returned.
    ///
    /// # Errors
    ///
    /// Propagates the first `AttachError`.
    pub fn register_all<I>(&self, bindings: I) -> Result<Disposer, AttachError>
    where
        I: IntoIterator<Item = Binding>,
    {
        let mut tokens = Vec::new();
        for binding in bindings {
            match self.register_with(
                &binding.event,
                binding.handler,
                binding.target,
                binding.options,
            ) {
                Ok(token) => tokens.push(token),
                Err(e) => {
                    for token in tokens {
                        self.unregister(token);
                    }
                    return Err(e);
                }
            }
        }
        Ok(self.disposer(tokens))
    }

    /// Detaches and forgets one listener.
    ///
    /// Unknown or already-released tokens are ignored. Returns whether a
    /// listener was released by this call.
    pub fn unregister(&self, token: SubscriptionToken) -> bool {
        self.inner.release(token)
    }

    /// Detaches every live listener and empties the registry.
    ///
    /// Returns the number of listeners released.
    pub fn unregister_all(&self) -> usize {
        let drained = {
            let mut subs = self
                .inner
                .subscriptions
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *subs)
        };

        let count = drained.len();
        let mut detached: Vec<&Subscription> = Vec::with_capacity(count);
        for sub in drained.values() {
            if detached.iter().any(|done| done.shares_attachment(sub)) {
                continue;
            }
            self.inner
                .source
                .detach(sub.target, &sub.event, &sub.handler, sub.options);
            detached.push(sub);
        }
        if count > 0 {
            tracing::debug!(count, "all listeners unregistered");
        }
        count
    }

    /// Wraps tokens issued by this registry into a release handle.
    pub fn disposer(&self, tokens: Vec<SubscriptionToken>) -> Disposer {
        Disposer {
            registry: Arc::downgrade(&self.inner),
            tokens,
        }
    }

    /// Whether `token` still names a live listener.
    pub fn contains(&self, token: SubscriptionToken) -> bool {
        let subs = self
            .inner
            .subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        subs.contains_key(&token)
    }

    /// Number of live listeners.
    pub fn len(&self) -> usize {
        let subs = self
            .inner
            .subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        subs.len()
    }

    /// Whether no listener is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("live", &self.len()).finish()
    }
}

/// Releases a group of listeners on demand.
///
/// A `Disposer` does not keep the registry alive; disposing after the
/// registry was dropped does nothing.
#[derive(Debug)]
pub struct Disposer {
    registry: Weak<Inner>,
    tokens: Vec<SubscriptionToken>,
}

impl Disposer {
    /// Tokens of the group, in registration order.
    pub fn tokens(&self) -> &[SubscriptionToken] {
        &self.tokens
    }

    /// Releases every listener in the group that is still live.
    ///
    /// Returns the number released by this call.
    pub fn dispose(mut self) -> usize {
        self.release()
    }

    /// Converts into a guard that disposes when dropped.
    pub fn into_guard(self) -> DisposeGuard {
        DisposeGuard(Some(self))
    }

    fn release(&mut self) -> usize {
        let Some(inner) = self.registry.upgrade() else {
            return 0;
        };
        let mut released = 0;
        for token in self.tokens.drain(..) {
            if inner.release(token) {
                released += 1;
            }
        }
        released
    }
}

/// Scoped subscription: disposes its group on drop.
#[derive(Debug)]
pub struct DisposeGuard(Option<Disposer>);

impl DisposeGuard {
    /// Detaches the group from the guard without releasing it.
    pub fn into_inner(mut self) -> Disposer {
        self.0.take().unwrap_or_else(|| Disposer {
            registry: Weak::new(),
            tokens: Vec::new(),
        })
    }
}

impl Drop for DisposeGuard {
    fn drop(&mut self) {
        if let Some(mut disposer) = self.0.take() {
            disposer.release();
        }
    }
}
