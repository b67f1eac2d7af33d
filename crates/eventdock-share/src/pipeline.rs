//! Ordered fallback across share channels.

use std::fmt;
use std::sync::Arc;

use eventdock_types::LogEntry;
use serde::Serialize;

use crate::channel::ShareChannel;
use crate::export::{export_payload, SharePayload};

/// Which stage of the pipeline handled a share request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShareKind {
    Share,
    Clipboard,
    CopyFallback,
    None,
}

impl ShareKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Share => "share",
            Self::Clipboard => "clipboard",
            Self::CopyFallback => "copy-fallback",
            Self::None => "none",
        }
    }
}

impl fmt::Display for ShareKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShareOutcome {
    pub channel: ShareKind,
    pub ok: bool,
}

impl ShareOutcome {
    fn delivered(channel: ShareKind) -> Self {
        Self { channel, ok: true }
    }

    fn failed() -> Self {
        Self {
            channel: ShareKind::None,
            ok: false,
        }
    }
}

/// Tries the rich share channel, then the clipboard, then a manual copy.
///
/// Any stage may be absent. A stage that is unavailable is skipped
/// silently; a stage that fails is logged and the next one is tried.
#[derive(Clone, Default)]
pub struct ExportPipeline {
    rich: Option<Arc<dyn ShareChannel>>,
    clipboard: Option<Arc<dyn ShareChannel>>,
    manual: Option<Arc<dyn ShareChannel>>,
}

impl ExportPipeline {
    /// A pipeline with no channels. Every share reports `none`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rich(mut self, channel: Arc<dyn ShareChannel>) -> Self {
        self.rich = Some(channel);
        self
    }

    pub fn with_clipboard(mut self, channel: Arc<dyn ShareChannel>) -> Self {
        self.clipboard = Some(channel);
        self
    }

    pub fn with_manual(mut self, channel: Arc<dyn ShareChannel>) -> Self {
        self.manual = Some(channel);
        self
    }

    /// Exports `entries` and hands them to the first channel that accepts.
    ///
    /// The rich channel is only consulted when `prefer_rich` is set.
    pub async fn share(&self, entries: &[LogEntry], prefer_rich: bool) -> ShareOutcome {
        let body = match export_payload(entries) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, entries = entries.len(), "failed to export log");
                return ShareOutcome::failed();
            }
        };
        let payload = SharePayload::new(body);

        let stages = [
            (ShareKind::Share, self.rich.as_ref().filter(|_| prefer_rich)),
            (ShareKind::Clipboard, self.clipboard.as_ref()),
            (ShareKind::CopyFallback, self.manual.as_ref()),
        ];

        for (kind, channel) in stages {
            let Some(channel) = channel else { continue };
            if !channel.is_available() {
                tracing::debug!(stage = %kind, channel = channel.name(), "share channel unavailable");
                continue;
            }
            match channel.deliver(&payload).await {
                Ok(()) => {
                    tracing::debug!(stage = %kind, channel = channel.name(), "log shared");
                    return ShareOutcome::delivered(kind);
                }
                Err(e) => {
                    tracing::warn!(
                        stage = %kind,
                        channel = channel.name(),
                        error = %e,
                        "share stage failed, falling back"
                    );
                }
            }
        }

        tracing::error!(entries = entries.len(), "every share stage failed");
        ShareOutcome::failed()
    }
}

impl fmt::Debug for ExportPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |c: &Option<Arc<dyn ShareChannel>>| c.as_ref().map(|c| c.name());
        f.debug_struct("ExportPipeline")
            .field("rich", &name(&self.rich))
            .field("clipboard", &name(&self.clipboard))
            .field("manual", &name(&self.manual))
            .finish()
    }
}
