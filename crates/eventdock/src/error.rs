use eventdock_db::DbError;
use eventdock_registry::AttachError;
use eventdock_timing::TimingError;
use eventdock_types::LimitError;
use thiserror::Error;

use crate::selector::SelectorError;

/// Errors surfaced by the facade and the dock.
#[derive(Debug, Error)]
pub enum DockError {
    #[error(transparent)]
    Attach(#[from] AttachError),

    #[error("invalid log limits: {0}")]
    Limits(#[from] LimitError),

    #[error(transparent)]
    Timing(#[from] TimingError),

    #[error("failed to open slot storage: {0}")]
    Storage(#[from] DbError),

    #[error(transparent)]
    Selector(#[from] SelectorError),
}
