//! Values handed to facade callbacks.
//!
//! Each is read off a [`HostEvent`] using the property names a browser
//! would expose (`ctrlKey`, `oldURL`, `clientX`, ...) plus the host state
//! at dispatch time.

use eventdock_types::HostEvent;
use serde::Serialize;
use serde_json::Value;

use crate::host::{Location, ScrollPosition, ViewportSize};

/// A key press with its modifier state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyCombo {
    pub key: String,
    pub code: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyCombo {
    pub(crate) fn from_event(event: &HostEvent) -> Self {
        Self {
            key: event.str_prop("key").unwrap_or_default().to_string(),
            code: event.str_prop("code").unwrap_or_default().to_string(),
            ctrl: event.flag("ctrlKey"),
            alt: event.flag("altKey"),
            shift: event.flag("shiftKey"),
            meta: event.flag("metaKey"),
        }
    }
}

/// History traversal (back / forward).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationChange {
    /// The history state object, `null` when none was pushed.
    pub state: Value,
    pub url: String,
    pub pathname: String,
    pub hash: String,
}

impl NavigationChange {
    pub(crate) fn from_event(event: &HostEvent, location: Location) -> Self {
        Self {
            state: event.prop("state").cloned().unwrap_or(Value::Null),
            url: location.href,
            pathname: location.pathname,
            hash: location.hash,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HashChange {
    pub old_url: String,
    pub new_url: String,
    pub hash: String,
}

impl HashChange {
    pub(crate) fn from_event(event: &HostEvent, location: Location) -> Self {
        Self {
            old_url: event.str_prop("oldURL").unwrap_or_default().to_string(),
            new_url: event.str_prop("newURL").unwrap_or_default().to_string(),
            hash: location.hash,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardAction {
    Copy,
    Cut,
    Paste,
}

impl ClipboardAction {
    pub(crate) const EVENTS: [&'static str; 3] = ["copy", "cut", "paste"];

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "copy" => Some(Self::Copy),
            "cut" => Some(Self::Cut),
            "paste" => Some(Self::Paste),
            _ => None,
        }
    }
}

/// A clipboard operation and the text involved.
///
/// For `paste` the text comes from the event (`clipboardText`); for `copy`
/// and `cut` it is the host's current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipboardChange {
    pub action: ClipboardAction,
    pub data: String,
}

impl ClipboardChange {
    pub(crate) fn from_event(event: &HostEvent, selection: impl FnOnce() -> String) -> Option<Self> {
        let action = ClipboardAction::from_name(event.name())?;
        let data = match action {
            ClipboardAction::Paste => event.str_prop("clipboardText").unwrap_or_default().to_string(),
            ClipboardAction::Copy | ClipboardAction::Cut => selection(),
        };
        Some(Self { action, data })
    }
}

/// Content dropped onto the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropData {
    /// Names of dropped files.
    pub files: Vec<String>,
    pub text: String,
    pub x: f64,
    pub y: f64,
}

impl DropData {
    pub(crate) fn from_event(event: &HostEvent) -> Self {
        let files = event
            .prop("files")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            files,
            text: event.str_prop("text").unwrap_or_default().to_string(),
            x: event.f64_prop("clientX").unwrap_or_default(),
            y: event.f64_prop("clientY").unwrap_or_default(),
        }
    }
}

/// An uncaught script error or an unhandled promise rejection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ErrorReport {
    #[serde(rename = "javascript")]
    Script {
        message: String,
        filename: String,
        lineno: i64,
        colno: i64,
        error: Value,
    },
    #[serde(rename = "promise")]
    Rejection { reason: Value },
}

impl ErrorReport {
    pub(crate) fn from_event(event: &HostEvent) -> Self {
        if event.name() == "unhandledrejection" {
            return Self::Rejection {
                reason: event.prop("reason").cloned().unwrap_or(Value::Null),
            };
        }
        Self::Script {
            message: event.str_prop("message").unwrap_or_default().to_string(),
            filename: event.str_prop("filename").unwrap_or_default().to_string(),
            lineno: event.i64_prop("lineno").unwrap_or_default(),
            colno: event.i64_prop("colno").unwrap_or_default(),
            error: event.prop("error").cloned().unwrap_or(Value::Null),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl From<ViewportSize> for Dimensions {
    fn from(v: ViewportSize) -> Self {
        Self {
            width: v.width,
            height: v.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl From<ScrollPosition> for Offset {
    fn from(s: ScrollPosition) -> Self {
        Self { x: s.x, y: s.y }
    }
}

/// A point-in-time summary of document and window state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentState {
    pub is_ready: bool,
    pub is_loaded: bool,
    pub is_online: bool,
    pub is_visible: bool,
    pub has_focus: bool,
    pub viewport: Dimensions,
    pub scroll: Offset,
}
