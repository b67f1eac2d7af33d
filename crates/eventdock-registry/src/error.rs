//! Error types for listener registration.

use eventdock_types::EventTarget;

/// Errors raised when the host cannot attach a listener.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachError {
    /// The host refused this event on this target.
    #[error("host rejected '{event}' listener on {target}")]
    Rejected {
        /// The event category.
        event: String,
        /// The target the listener was meant for.
        target: EventTarget,
    },

    /// The host event source is not usable (e.g. torn down).
    #[error("host event source unavailable: {0}")]
    Unavailable(String),
}
