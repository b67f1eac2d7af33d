//! Listener lifecycle registry.
//!
//! Every listener attached through the eventdock API goes through a
//! [`Registry`], which records the binding under an opaque
//! [`SubscriptionToken`] and can release any single binding or all of them
//! at once. The platform dispatch mechanism itself sits behind the
//! [`EventSource`] trait; [`LocalEventSource`] is an in-process
//! implementation used by headless hosts and tests.
//!
//! # Release guarantees
//!
//! A binding is released by exactly one of [`Registry::unregister`] or
//! [`Registry::unregister_all`]. Both are idempotent with respect to
//! already-released tokens, and neither holds the registry lock while
//! calling into the host, so a handler may release its own subscription
//! while it is being dispatched.
//!
//! # Usage
//!
//! ```rust,ignore
//! use eventdock_registry::{EventHandler, LocalEventSource, Registry};
//! use eventdock_types::EventTarget;
//!
//! let host = Arc::new(LocalEventSource::new());
//! let registry = Registry::new(host.clone());
//! let token = registry.register("resize", EventHandler::new(|ev| redraw(ev)), EventTarget::Window)?;
//! // ...
//! registry.unregister(token);
//! ```

mod error;
mod handler;
mod local;
mod registry;

pub use error::AttachError;
pub use handler::EventHandler;
pub use local::LocalEventSource;
pub use registry::{Binding, DisposeGuard, Disposer, Registry, SubscriptionToken};

use eventdock_types::{EventTarget, ListenerOptions};

/// The platform capability listeners are attached through.
pub trait EventSource: Send + Sync {
    /// Attaches `handler` to `target` for `event`.
    ///
    /// # Errors
    ///
    /// Returns `AttachError` if the host refuses the attachment.
    fn attach(
        &self,
        target: EventTarget,
        event: &str,
        handler: &EventHandler,
        options: ListenerOptions,
    ) -> Result<(), AttachError>;

    /// Detaches a handler previously attached with the same arguments.
    /// Detaching an unknown handler is a no-op.
    fn detach(
        &self,
        target: EventTarget,
        event: &str,
        handler: &EventHandler,
        options: ListenerOptions,
    );
}

#[cfg(test)]
mod tests;
