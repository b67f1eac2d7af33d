//! The canonical log record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One captured event or custom message.
///
/// Field order here is the serialized field order and is part of the export
/// format: `id`, `ts`, `type`, `payload`, `summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// `<unix-millis>_<random suffix>`.
    pub id: String,
    /// ISO 8601 UTC capture instant with millisecond precision.
    #[serde(rename = "ts", alias = "timestamp")]
    pub timestamp: String,
    /// Short category, e.g. an event name or `custom`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Sanitized structured data, serialized as `null` when absent.
    #[serde(default)]
    pub payload: Option<Value>,
    /// Short human-readable description.
    #[serde(default)]
    pub summary: String,
}

impl LogEntry {
    /// Returns the compact JSON size of this entry in bytes.
    ///
    /// The compact encoding of a sequence is `[` + entries joined by `,` +
    /// `]`, so sequence sizes can be derived from per-entry sizes.
    pub fn encoded_len(&self) -> usize {
        serde_json::to_vec(self).map(|v| v.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> LogEntry {
        LogEntry {
            id: "1700000000000_abc1234".into(),
            timestamp: "2023-11-14T22:13:20.000Z".into(),
            kind: "custom".into(),
            payload: Some(json!({"a": 1})),
            summary: "hello".into(),
        }
    }

    #[test]
    fn serializes_with_stable_field_order() {
        let text = serde_json::to_string(&sample()).expect("should serialize");
        assert_eq!(
            text,
            r#"{"id":"1700000000000_abc1234","ts":"2023-11-14T22:13:20.000Z","type":"custom","payload":{"a":1},"summary":"hello"}"#
        );
    }

    #[test]
    fn missing_payload_serializes_as_null() {
        let mut entry = sample();
        entry.payload = None;
        let text = serde_json::to_string(&entry).expect("should serialize");
        assert!(text.contains(r#""payload":null"#));
    }

    #[test]
    fn encoded_len_matches_serialized_length() {
        let entry = sample();
        let text = serde_json::to_string(&entry).expect("should serialize");
        assert_eq!(entry.encoded_len(), text.len());
    }

    #[test]
    fn accepts_timestamp_alias_and_missing_summary() {
        let entry: LogEntry = serde_json::from_str(
            r#"{"id":"1","timestamp":"2023-11-14T22:13:20.000Z","type":"click"}"#,
        )
        .expect("should deserialize");
        assert_eq!(entry.kind, "click");
        assert_eq!(entry.payload, None);
        assert_eq!(entry.summary, "");
    }
}
