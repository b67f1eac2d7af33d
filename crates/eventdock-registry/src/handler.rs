use std::fmt;
use std::sync::Arc;

use eventdock_types::HostEvent;

/// A shared listener callback.
///
/// Handlers are compared by identity: two clones of the same handler are
/// equal, two separately created handlers never are, even with identical
/// code. Hosts rely on this to find the listener to detach.
#[derive(Clone)]
pub struct EventHandler(Arc<dyn Fn(&HostEvent) + Send + Sync>);

impl EventHandler {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&HostEvent) + Send + Sync + 'static,
    {
        Self(Arc::new(func))
    }

    /// Runs the handler.
    pub fn call(&self, event: &HostEvent) {
        (self.0)(event)
    }

    /// Whether both values refer to the same callback.
    pub fn same_as(&self, other: &EventHandler) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for EventHandler {}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}
