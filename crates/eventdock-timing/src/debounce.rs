//! Trailing-edge debounce.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::TimingError;

/// A callback that fires once calls have been quiet for `wait`.
pub struct Debounced<A> {
    inner: Arc<Inner<A>>,
}

struct Inner<A> {
    func: Arc<dyn Fn(A) + Send + Sync>,
    wait: Duration,
    runtime: Handle,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<A> Clone for Debounced<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: Send + 'static> Debounced<A> {
    /// Creates the wrapper on the current runtime.
    ///
    /// # Errors
    ///
    /// Returns `TimingError::NoRuntime` outside a tokio runtime.
    pub fn new<F>(func: F, wait: Duration) -> Result<Self, TimingError>
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| TimingError::NoRuntime)?;
        Ok(Self {
            inner: Arc::new(Inner {
                func: Arc::new(func),
                wait,
                runtime,
                pending: Mutex::new(None),
            }),
        })
    }

    /// Restarts the quiet period; `args` replace any earlier pending ones.
    pub fn call(&self, args: A) {
        let func = Arc::clone(&self.inner.func);
        let wait = self.inner.wait;

        let mut pending = self.inner.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(self.inner.runtime.spawn(async move {
            tokio::time::sleep(wait).await;
            func(args);
        }));
    }

    /// Drops the pending invocation, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        let mut pending = self.inner.pending.lock().unwrap_or_else(|e| e.into_inner());
        match pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    /// Whether an invocation is scheduled and has not run yet.
    pub fn is_pending(&self) -> bool {
        let pending = self.inner.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub fn wait(&self) -> Duration {
        self.inner.wait
    }
}
