//! Submitted-line history with up/down recall.
//!
//! The log is oldest-first and append-only. The cursor indexes into the
//! log; `cursor == len` means the user is editing a fresh line.

/// Maximum number of lines to keep in history.
const MAX_HISTORY_SIZE: usize = 1000;

#[derive(Clone, Debug)]
pub struct HistoryNavigator {
    entries: Vec<String>,
    cursor: usize,
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
        }
    }

    /// Append a submitted line and move the cursor past the end.
    /// Blank lines are never recorded and leave the cursor untouched.
    pub fn record(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        self.entries.push(line.to_string());

        if self.entries.len() > MAX_HISTORY_SIZE {
            self.entries.remove(0);
        }

        self.cursor = self.entries.len();
    }

    /// Step towards older entries.
    ///
    /// Stops at the oldest entry (returning it again) and returns `None`
    /// only when the log is empty.
    pub fn previous(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        if self.cursor > 0 {
            self.cursor -= 1;
        }
        self.entries.get(self.cursor).map(String::as_str)
    }

    /// Step towards newer entries.
    ///
    /// Moving past the newest entry yields `""` (a fresh line); once past
    /// the end this is a no-op returning `None`.
    pub fn next(&mut self) -> Option<&str> {
        let len = self.entries.len();
        if self.cursor >= len {
            return None;
        }
        if self.cursor + 1 < len {
            self.cursor += 1;
            self.entries.get(self.cursor).map(String::as_str)
        } else {
            self.cursor = len;
            Some("")
        }
    }

    /// Move the cursor past the end without recording anything.
    pub fn reset_cursor(&mut self) {
        self.cursor = self.entries.len();
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True when the cursor sits past the newest entry.
    pub fn at_fresh_line(&self) -> bool {
        self.cursor == self.entries.len()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
