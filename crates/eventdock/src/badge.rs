//! Unread counter shown on the dock button.

/// Counts entries appended since the panel was last opened.
///
/// A disabled badge ignores every update and always reads zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    enabled: bool,
    unread: usize,
}

/// Counts above this render as `99+`.
const MAX_SHOWN: usize = 99;

impl Badge {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, unread: 0 }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn unread(&self) -> usize {
        self.unread
    }

    pub fn record_append(&mut self) {
        if self.enabled {
            self.unread = self.unread.saturating_add(1);
        }
    }

    /// Resets the counter to the current log length.
    pub fn sync_to(&mut self, len: usize) {
        if self.enabled {
            self.unread = len;
        }
    }

    pub fn mark_read(&mut self) {
        self.unread = 0;
    }

    /// `""` when nothing is unread, the count up to 99, `99+` beyond.
    pub fn label(&self) -> String {
        match self.unread {
            0 => String::new(),
            n if n > MAX_SHOWN => format!("{MAX_SHOWN}+"),
            n => n.to_string(),
        }
    }
}
