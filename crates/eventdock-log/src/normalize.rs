//! Conversion of heterogeneous input into canonical log entries.
//!
//! Normalization never fails. Anything that cannot be read is left out of
//! the payload rather than reported.

use chrono::{DateTime, SecondsFormat, Utc};
use eventdock_types::{HostEvent, LogEntry, CUSTOM_EVENT_TYPE};
use serde_json::{Map, Value};

/// Maximum length, in characters, of a summary rendered from a record.
pub const SUMMARY_MAX_CHARS: usize = 120;

/// Scalar event properties copied into an event payload when present.
const EVENT_FIELDS: &[&str] = &[
    "key", "code", "clientX", "clientY", "button", "deltaY", "detail",
];

/// Anything that can be logged.
#[derive(Debug, Clone, PartialEq)]
pub enum LogInput {
    /// A free-form message.
    Message(String),
    /// A platform event.
    Event(HostEvent),
    /// A structured record; `type`, `summary`, and `payload` keys are
    /// honoured when present.
    Object(Map<String, Value>),
    /// Any other JSON value.
    Value(Value),
}

impl From<&str> for LogInput {
    fn from(text: &str) -> Self {
        Self::Message(text.to_string())
    }
}

impl From<String> for LogInput {
    fn from(text: String) -> Self {
        Self::Message(text)
    }
}

impl From<HostEvent> for LogInput {
    fn from(event: HostEvent) -> Self {
        Self::Event(event)
    }
}

impl From<&HostEvent> for LogInput {
    fn from(event: &HostEvent) -> Self {
        Self::Event(event.clone())
    }
}

impl From<Map<String, Value>> for LogInput {
    fn from(record: Map<String, Value>) -> Self {
        Self::Object(record)
    }
}

impl From<Value> for LogInput {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Message(text),
            Value::Object(record) => Self::Object(record),
            other => Self::Value(other),
        }
    }
}

/// Normalizes `input` with a fresh id and the current time.
pub fn normalize(input: impl Into<LogInput>) -> LogEntry {
    normalize_at(input, Utc::now())
}

/// Normalizes `input` as if captured at `now`.
pub fn normalize_at(input: impl Into<LogInput>, now: DateTime<Utc>) -> LogEntry {
    let (kind, summary, payload) = match input.into() {
        LogInput::Message(text) => (CUSTOM_EVENT_TYPE.to_string(), text, None),
        LogInput::Event(event) => from_event(&event),
        LogInput::Object(record) => from_record(record),
        LogInput::Value(value) => from_value(value),
    };

    LogEntry {
        id: entry_id(now),
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        kind,
        payload,
        summary,
    }
}

fn entry_id(now: DateTime<Utc>) -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", now.timestamp_millis(), &random[..7])
}

fn from_event(event: &HostEvent) -> (String, String, Option<Value>) {
    let mut out = Map::new();
    out.insert("type".into(), Value::String(event.name().to_string()));
    out.insert(
        "timeStamp".into(),
        event
            .time_stamp()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
    );

    for field in EVENT_FIELDS {
        match event.prop(field) {
            Some(value) if is_scalar(value) => {
                out.insert((*field).to_string(), value.clone());
            }
            Some(_) => {
                tracing::trace!(field, event = event.name(), "skipping non-scalar event field");
            }
            None => {}
        }
    }

    if let Some(target) = event.origin().and_then(|origin| origin.describe()) {
        out.insert("target".into(), Value::String(target));
    }

    let name = event.name().to_string();
    (name.clone(), name, Some(Value::Object(out)))
}

fn from_record(record: Map<String, Value>) -> (String, String, Option<Value>) {
    let kind = record
        .get("type")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let summary = match record.get("summary") {
        Some(Value::Null) | None => kind
            .clone()
            .unwrap_or_else(|| truncated(&Value::Object(record.clone()))),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    };

    let payload = match record.get("payload") {
        Some(Value::Null) | None => Value::Object(record),
        Some(inner) => inner.clone(),
    };

    (
        kind.unwrap_or_else(|| CUSTOM_EVENT_TYPE.to_string()),
        summary,
        Some(payload),
    )
}

fn from_value(value: Value) -> (String, String, Option<Value>) {
    let summary = truncated(&value);
    let payload = match value {
        Value::Null => None,
        other => Some(other),
    };
    (CUSTOM_EVENT_TYPE.to_string(), summary, payload)
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn truncated(value: &Value) -> String {
    value.to_string().chars().take(SUMMARY_MAX_CHARS).collect()
}
