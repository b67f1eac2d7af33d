//! Export of the event log as JSON and delivery through a chain of share
//! channels.
//!
//! [`export_payload`] renders the log as pretty-printed JSON. An
//! [`ExportPipeline`] then tries its channels in a fixed order (rich share,
//! clipboard, manual copy) and reports which one delivered the payload.
//! Channel failures never escape the pipeline: they are logged and the next
//! channel is tried.

mod channel;
mod export;
mod file;
mod pipeline;

pub use channel::{MemoryClipboard, ShareChannel, ShareError};
pub use export::{
    export_payload, parse_payload, SharePayload, SHARE_FILE_NAME, SHARE_MIME, SHARE_TEXT,
    SHARE_TITLE,
};
pub use file::FileChannel;
pub use pipeline::{ExportPipeline, ShareKind, ShareOutcome};
