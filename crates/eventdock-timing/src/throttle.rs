//! Leading-edge, lossy throttle.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

/// A callback that runs at most once per cooldown window.
///
/// Calls inside an open window are dropped, never queued or replayed.
pub struct Throttled<A> {
    inner: Arc<Inner<A>>,
}

struct Inner<A> {
    func: Box<dyn Fn(A) + Send + Sync>,
    limit: Duration,
    window_opened: Mutex<Option<Instant>>,
}

impl<A> Clone for Throttled<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> Throttled<A> {
    pub fn new<F>(func: F, limit: Duration) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                func: Box::new(func),
                limit,
                window_opened: Mutex::new(None),
            }),
        }
    }

    /// Runs the callback unless a window is open. Returns whether it ran.
    pub fn call(&self, args: A) -> bool {
        let now = Instant::now();
        {
            let mut opened = self
                .inner
                .window_opened
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            if let Some(start) = *opened {
                if now.duration_since(start) < self.inner.limit {
                    tracing::trace!(limit_ms = self.inner.limit.as_millis() as u64, "throttled call dropped");
                    return false;
                }
            }
            *opened = Some(now);
        }
        // Lock released: the callback may call back into this wrapper.
        (self.inner.func)(args);
        true
    }

    pub fn limit(&self) -> Duration {
        self.inner.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_window() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&fired);
        let throttled = Throttled::new(
            move |t: u64| sink.lock().unwrap().push(t),
            Duration::from_millis(50),
        );

        for t in (0..=100).step_by(5) {
            throttled.call(t);
            sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(*fired.lock().unwrap(), vec![0, 50, 100]);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_calls_are_not_replayed() {
        let count = Arc::new(Mutex::new(0u32));
        let sink = Arc::clone(&count);
        let throttled = Throttled::new(
            move |_: ()| *sink.lock().unwrap() += 1,
            Duration::from_millis(50),
        );

        assert!(throttled.call(()));
        assert!(!throttled.call(()));
        assert!(!throttled.call(()));
        sleep(Duration::from_millis(200)).await;

        assert_eq!(*count.lock().unwrap(), 1);
        assert!(throttled.call(()));
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn callback_may_reenter() {
        let slot: Arc<Mutex<Option<Throttled<u32>>>> = Arc::new(Mutex::new(None));
        let inner_slot = Arc::clone(&slot);
        let reentered = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&reentered);
        let throttled = Throttled::new(
            move |n: u32| {
                if n == 0 {
                    let again = inner_slot.lock().unwrap().clone();
                    if let Some(t) = again {
                        *sink.lock().unwrap() = Some(t.call(1));
                    }
                }
            },
            Duration::from_millis(10),
        );
        *slot.lock().unwrap() = Some(throttled.clone());

        assert!(throttled.call(0));
        assert_eq!(*reentered.lock().unwrap(), Some(false));
    }
}
