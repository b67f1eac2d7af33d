//! Timing control for high-frequency event producers.
//!
//! Two wrappers around a callback:
//!
//! - [`Debounced`] delays the callback until calls stop arriving for a
//!   quiet period, then runs it once with the arguments of the last call.
//! - [`Throttled`] runs the first call immediately and drops every call
//!   that arrives inside the following cooldown window.
//!
//! Both own their scheduling state privately; clones share it. Timers run
//! on the tokio runtime that drives the host event loop.
//!
//! ```rust,ignore
//! let on_resize = eventdock_timing::debounce(|size| redraw(size), Duration::from_millis(100))?;
//! on_resize.call(size);
//! ```

mod debounce;
mod throttle;

use std::time::Duration;

pub use debounce::Debounced;
pub use throttle::Throttled;

/// Errors raised when constructing a timing wrapper.
#[derive(Debug, thiserror::Error)]
pub enum TimingError {
    /// Debouncing needs a runtime to schedule the delayed call on.
    #[error("debounce requires a running tokio runtime")]
    NoRuntime,
}

/// Wraps `func` so it only runs once `wait` has elapsed without new calls.
///
/// # Errors
///
/// Returns `TimingError::NoRuntime` when called outside a tokio runtime.
pub fn debounce<A, F>(func: F, wait: Duration) -> Result<Debounced<A>, TimingError>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    Debounced::new(func, wait)
}

/// Wraps `func` so it runs at most once per `limit` window.
pub fn throttle<A, F>(func: F, limit: Duration) -> Throttled<A>
where
    F: Fn(A) + Send + Sync + 'static,
{
    Throttled::new(func, limit)
}
