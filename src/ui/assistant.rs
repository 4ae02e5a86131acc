//! Assistant chat pane.
//!
//! Shows the conversation with the remote AI endpoint above a one-line
//! input box. Requests are sent by the key handler in
//! [`crate::event::assistant`]; this widget only holds display state.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

/// Shown as the AI reply when a chat request fails.
pub const CHAT_ERROR_MESSAGE: &str = "Sorry, there was an error processing your message. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

pub struct TuiAssistant {
    messages: Vec<ChatMessage>,
    input: String,
    /// A request is in flight; input is not submitted until it settles
    waiting: bool,
    /// Lines scrolled up from the bottom of the conversation
    scroll_offset: usize,
    focused: bool,
}

impl TuiAssistant {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            input: String::new(),
            waiting: false,
            scroll_offset: 0,
            focused: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn insert_char(&mut self, ch: char) {
        self.input.push(ch);
    }

    pub fn delete_char(&mut self) {
        self.input.pop();
    }

    /// Take the current input, leaving the box empty.
    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }

    pub fn push_user_message(&mut self, text: String) {
        self.push(Sender::User, text);
    }

    pub fn push_ai_message(&mut self, text: String) {
        self.push(Sender::Ai, text);
    }

    fn push(&mut self, sender: Sender, text: String) {
        self.messages.push(ChatMessage { sender, text });
        self.scroll_offset = 0;
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    pub fn set_waiting(&mut self, waiting: bool) {
        self.waiting = waiting;
    }

    /// Scroll up (`delta > 0`) or down through the conversation.
    pub fn scroll(&mut self, delta: isize) {
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Wrap the conversation to `width` columns.
    fn conversation_lines(&self, width: u16) -> Vec<Line<'static>> {
        let width = usize::from(width.max(1));
        let mut lines = Vec::new();

        for message in &self.messages {
            let (label, color) = match message.sender {
                Sender::User => ("You", Color::Cyan),
                Sender::Ai => ("AI", Color::Green),
            };
            lines.push(Line::from(Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            for raw in message.text.lines() {
                if raw.is_empty() {
                    lines.push(Line::default());
                    continue;
                }
                for wrapped in textwrap::wrap(raw, width) {
                    lines.push(Line::from(wrapped.into_owned()));
                }
            }
            lines.push(Line::default());
        }

        if self.waiting {
            lines.push(Line::from("AI is typing...".italic().dark_gray()));
        }
        lines
    }
}

impl Default for TuiAssistant {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &TuiAssistant {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Assistant ");
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(2)])
            .split(inner);
        let (history_area, input_area) = (chunks[0], chunks[1]);

        let lines = self.conversation_lines(history_area.width);
        let visible = usize::from(history_area.height);
        let max_offset = lines.len().saturating_sub(visible);
        let top = max_offset.saturating_sub(self.scroll_offset.min(max_offset));
        Paragraph::new(lines)
            .scroll((u16::try_from(top).unwrap_or(u16::MAX), 0))
            .render(history_area, buf);

        let prompt = if self.waiting { "… " } else { "> " };
        let input_block = Block::default().borders(Borders::TOP);
        let input_inner = input_block.inner(input_area);
        input_block.render(input_area, buf);

        // Keep the tail of long input visible
        let room = usize::from(input_inner.width).saturating_sub(prompt.chars().count() + 1);
        let skip = self.input.chars().count().saturating_sub(room);
        let shown: String = self.input.chars().skip(skip).collect();
        let mut spans = vec![Span::raw(prompt), Span::raw(shown)];
        if self.focused {
            spans.push(Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)));
        }
        Paragraph::new(Line::from(spans)).render(input_inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_editing() {
        let mut assistant = TuiAssistant::new();
        for ch in "helo".chars() {
            assistant.insert_char(ch);
        }
        assistant.delete_char();
        assistant.insert_char('p');
        assert_eq!(assistant.input(), "help");
        assert_eq!(assistant.take_input(), "help");
        assert!(assistant.input().is_empty());

        assistant.delete_char();
        assert!(assistant.input().is_empty());
    }

    #[test]
    fn messages_are_kept_in_order() {
        let mut assistant = TuiAssistant::new();
        assistant.push_user_message("how do I list pods?".to_string());
        assistant.push_ai_message("kubectl get pods".to_string());

        let senders: Vec<Sender> = assistant.messages().iter().map(|m| m.sender).collect();
        assert_eq!(senders, vec![Sender::User, Sender::Ai]);
    }

    #[test]
    fn new_message_resets_scroll() {
        let mut assistant = TuiAssistant::new();
        assistant.scroll(5);
        assistant.scroll(-10);
        assert_eq!(assistant.scroll_offset, 0);
        assistant.scroll(3);
        assistant.push_ai_message("hi".to_string());
        assert_eq!(assistant.scroll_offset, 0);
    }

    #[test]
    fn long_messages_are_wrapped() {
        let mut assistant = TuiAssistant::new();
        assistant.push_ai_message("one two three four".to_string());
        let lines = assistant.conversation_lines(9);
        // label, three wrapped lines, spacer
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1].to_string(), "one two");
        assert_eq!(lines[2].to_string(), "three");
        assert_eq!(lines[3].to_string(), "four");
    }

    #[test]
    fn render_shows_messages_and_input() {
        let mut assistant = TuiAssistant::new();
        assistant.push_user_message("hello".to_string());
        assistant.insert_char('x');

        let area = Rect::new(0, 0, 30, 10);
        let mut buf = Buffer::empty(area);
        (&assistant).render(area, &mut buf);

        let row = |y: u16| -> String { (0..30).map(|x| buf[(x, y)].symbol().to_string()).collect() };
        assert!(row(1).contains("You"));
        assert!(row(2).contains("hello"));
        assert!(row(8).contains("> x"));
    }
}
