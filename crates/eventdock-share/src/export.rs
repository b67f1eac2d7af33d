//! JSON rendering of the log.

use eventdock_types::LogEntry;

pub const SHARE_TITLE: &str = "Document / Window Event Logs";
pub const SHARE_TEXT: &str = "Event logs (JSON)";
pub const SHARE_FILE_NAME: &str = "event-logs.json";
pub const SHARE_MIME: &str = "application/json";

/// Renders entries as pretty-printed JSON with two-space indentation.
///
/// Field order follows [`LogEntry`]'s declaration, so repeated exports of
/// the same log are byte-identical.
///
/// # Errors
///
/// Returns the serializer's error. Entries built by the normalizer always
/// serialize.
pub fn export_payload(entries: &[LogEntry]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(entries)
}

/// Parses an exported payload back into entries.
///
/// # Errors
///
/// Returns an error if `payload` is not a JSON array of entries.
pub fn parse_payload(payload: &str) -> Result<Vec<LogEntry>, serde_json::Error> {
    serde_json::from_str(payload)
}

/// Everything a share channel may present to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub file_name: String,
    pub mime: String,
    /// The exported JSON.
    pub body: String,
}

impl SharePayload {
    /// Wraps an exported body with the standard title, text and file name.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            title: SHARE_TITLE.to_string(),
            text: SHARE_TEXT.to_string(),
            file_name: SHARE_FILE_NAME.to_string(),
            mime: SHARE_MIME.to_string(),
            body: body.into(),
        }
    }
}
