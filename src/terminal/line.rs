//! In-progress input line.
//!
//! The buffer only supports append and delete-at-end; there is no mid-line
//! cursor. Every operation is total over any buffer state.

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineBuffer {
    content: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a character and return the new content for echo.
    pub fn insert(&mut self, ch: char) -> &str {
        self.content.push(ch);
        &self.content
    }

    /// Remove the last character.
    ///
    /// Returns `true` when a character was removed and an erase should be
    /// echoed, `false` when the buffer was already empty.
    pub fn delete_back(&mut self) -> bool {
        self.content.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.content.clear();
    }

    /// Replace the content wholesale (history recall).
    pub fn set_content(&mut self, s: &str) {
        self.content.clear();
        self.content.push_str(s);
    }

    /// Take the content, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.content)
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
