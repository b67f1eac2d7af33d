//! Read-only platform state the facade queries when an event fires.

use std::sync::Mutex;

use serde::Serialize;

/// Document loading progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    Loading,
    Interactive,
    #[default]
    Complete,
}

impl ReadyState {
    /// The DOM has been parsed.
    pub fn is_ready(self) -> bool {
        self != Self::Loading
    }

    /// Every subresource has loaded.
    pub fn is_loaded(self) -> bool {
        self == Self::Complete
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityState {
    #[default]
    Visible,
    Hidden,
}

impl VisibilityState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
        }
    }
}

/// Inner and outer window dimensions, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
    pub outer_width: f64,
    pub outer_height: f64,
}

/// Current scroll offset and the largest reachable offset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollPosition {
    pub x: f64,
    pub y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub href: String,
    pub pathname: String,
    pub hash: String,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            href: "about:blank".to_string(),
            pathname: "blank".to_string(),
            hash: String::new(),
        }
    }
}

/// Queries against the hosting platform.
///
/// Implementations report the state at the moment of the call; nothing is
/// cached by callers.
pub trait HostEnvironment: Send + Sync {
    fn ready_state(&self) -> ReadyState;
    fn is_online(&self) -> bool;
    fn visibility(&self) -> VisibilityState;
    fn has_focus(&self) -> bool;
    fn viewport(&self) -> ViewportSize;
    fn scroll(&self) -> ScrollPosition;
    fn location(&self) -> Location;
    /// Text of the current selection, copied or cut by clipboard events.
    fn selection_text(&self) -> String;

    fn is_hidden(&self) -> bool {
        self.visibility() == VisibilityState::Hidden
    }
}

/// Mutable snapshot behind [`SimulatedHost`].
#[derive(Debug, Clone, PartialEq)]
pub struct HostSnapshot {
    pub ready_state: ReadyState,
    pub online: bool,
    pub visibility: VisibilityState,
    pub focused: bool,
    pub viewport: ViewportSize,
    pub scroll: ScrollPosition,
    pub location: Location,
    pub selection: String,
}

impl Default for HostSnapshot {
    fn default() -> Self {
        Self {
            ready_state: ReadyState::Complete,
            online: true,
            visibility: VisibilityState::Visible,
            focused: true,
            viewport: ViewportSize {
                width: 1280.0,
                height: 720.0,
                outer_width: 1280.0,
                outer_height: 800.0,
            },
            scroll: ScrollPosition::default(),
            location: Location::default(),
            selection: String::new(),
        }
    }
}

/// A host whose state is set by the embedding program.
///
/// Headless embedders update it as their own event loop progresses, then
/// dispatch the matching event through the event source.
#[derive(Debug, Default)]
pub struct SimulatedHost {
    state: Mutex<HostSnapshot>,
}

impl SimulatedHost {
    pub fn new(snapshot: HostSnapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
        }
    }

    /// Applies `f` to the current state.
    pub fn update(&self, f: impl FnOnce(&mut HostSnapshot)) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state);
    }

    pub fn snapshot(&self) -> HostSnapshot {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl HostEnvironment for SimulatedHost {
    fn ready_state(&self) -> ReadyState {
        self.snapshot().ready_state
    }

    fn is_online(&self) -> bool {
        self.snapshot().online
    }

    fn visibility(&self) -> VisibilityState {
        self.snapshot().visibility
    }

    fn has_focus(&self) -> bool {
        self.snapshot().focused
    }

    fn viewport(&self) -> ViewportSize {
        self.snapshot().viewport
    }

    fn scroll(&self) -> ScrollPosition {
        self.snapshot().scroll
    }

    fn location(&self) -> Location {
        self.snapshot().location
    }

    fn selection_text(&self) -> String {
        self.snapshot().selection
    }
}
