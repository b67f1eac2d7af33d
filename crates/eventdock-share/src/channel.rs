//! The share channel seam and an in-process clipboard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use futures_util::future::{BoxFuture, FutureExt};
use thiserror::Error;

use crate::export::SharePayload;

/// Reasons a channel failed to deliver.
#[derive(Debug, Error)]
pub enum ShareError {
    /// The channel cannot be used on this host.
    #[error("share channel '{0}' is unavailable")]
    Unavailable(&'static str),

    /// The user dismissed the share prompt.
    #[error("share was cancelled")]
    Cancelled,

    /// The channel refused the payload.
    #[error("share channel rejected the payload: {0}")]
    Rejected(String),

    #[error("share I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// One way of handing the exported log to the user.
///
/// `deliver` returns a boxed future so channels can be stored as trait
/// objects.
pub trait ShareChannel: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether the host supports this channel at all.
    fn is_available(&self) -> bool {
        true
    }

    fn deliver<'a>(&'a self, payload: &'a SharePayload) -> BoxFuture<'a, Result<(), ShareError>>;
}

/// A clipboard held in process memory.
///
/// Stands in for the system clipboard in headless hosts. Can be switched
/// into a failing state.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
    failing: AtomicBool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns the last text written.
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl ShareChannel for MemoryClipboard {
    fn name(&self) -> &'static str {
        "memory-clipboard"
    }

    fn deliver<'a>(&'a self, payload: &'a SharePayload) -> BoxFuture<'a, Result<(), ShareError>> {
        async move {
            if self.failing.load(Ordering::SeqCst) {
                return Err(ShareError::Rejected("clipboard write denied".into()));
            }
            *self.contents.lock().unwrap_or_else(|e| e.into_inner()) = Some(payload.body.clone());
            Ok(())
        }
        .boxed()
    }
}
