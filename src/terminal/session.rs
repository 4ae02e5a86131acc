//! Terminal session controller.
//!
//! Owns the line buffer, the history and the connection state of one
//! terminal view. Every input (key presses, channel lifecycle, backend
//! output) goes through [`TerminalSession::dispatch`], which is the only
//! place session state changes.
//!
//! Rendered bytes accumulate in an internal output stream that the UI
//! drains with [`TerminalSession::take_output`].

use crossterm::event::KeyEvent;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use unicode_width::UnicodeWidthStr;

use super::history::HistoryNavigator;
use super::keys::{classify, TermAction};
use super::line::LineBuffer;
use super::output::{self, OutputEnvelope};

const CONNECTED_BANNER: &str = "\r\n*** Connected to server ***\r\n";
const ERASE_LINE: &str = "\r\x1b[2K";
const INTERRUPT_MARK: &str = "^C\r\n";
const NEWLINE: &str = "\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    AwaitingOutput,
    Closed,
}

/// Everything the controller reacts to, in arrival order.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Connected,
    Key(KeyEvent),
    Output(OutputEnvelope),
    Closed { reason: Option<String> },
}

pub struct TerminalSession {
    state: SessionState,
    prompt: String,
    buffer: LineBuffer,
    history: HistoryNavigator,
    /// Submitted lines go out here
    input_tx: UnboundedSender<String>,
    /// Rendered output not yet drained by the UI
    pending: String,
    /// Width of the screen the output is shown on, once known
    columns: Option<u16>,
    /// Display width drawn on the current input line since it started at column 0
    line_width: usize,
}

impl TerminalSession {
    pub fn new(input_tx: UnboundedSender<String>, prompt: impl Into<String>) -> Self {
        Self {
            state: SessionState::Disconnected,
            prompt: prompt.into(),
            buffer: LineBuffer::new(),
            history: HistoryNavigator::new(),
            input_tx,
            pending: String::new(),
            columns: None,
            line_width: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Change the prompt label. Takes effect on the next render.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Tell the session how wide the screen is, so a line that wraps
    /// can be redrawn in place.
    pub fn set_columns(&mut self, columns: u16) {
        self.columns = Some(columns.max(1));
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn history(&self) -> &HistoryNavigator {
        &self.history
    }

    /// Drain everything rendered since the last call.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.pending)
    }

    pub fn dispatch(&mut self, event: SessionEvent) {
        debug!(state = ?self.state, ?event, "dispatch");
        match event {
            SessionEvent::Connected => self.on_connected(),
            SessionEvent::Key(key) => self.on_key(&key),
            SessionEvent::Output(envelope) => self.on_output(&envelope),
            SessionEvent::Closed { reason } => self.on_closed(reason.as_deref()),
        }
    }

    fn on_connected(&mut self) {
        if self.state != SessionState::Disconnected {
            warn!(state = ?self.state, "Ignoring connect notification");
            return;
        }
        info!("Shell channel connected");
        self.state = SessionState::Connected;
        self.pending.push_str(CONNECTED_BANNER);
        self.write_prompt_line();
    }

    fn on_key(&mut self, key: &KeyEvent) {
        if matches!(self.state, SessionState::Disconnected | SessionState::Closed) {
            return;
        }

        match classify(key) {
            TermAction::Insert(ch) => {
                self.buffer.insert(ch);
                self.rerender_line();
            }
            TermAction::EraseBack => {
                if self.buffer.delete_back() {
                    self.rerender_line();
                }
            }
            TermAction::HistoryUp => {
                if let Some(entry) = self.history.previous() {
                    self.buffer.set_content(entry);
                    self.rerender_line();
                }
            }
            TermAction::HistoryDown => {
                if let Some(entry) = self.history.next() {
                    self.buffer.set_content(entry);
                    self.rerender_line();
                }
            }
            TermAction::Submit => self.submit(),
            TermAction::Interrupt => self.interrupt(),
            TermAction::Ignore => {}
        }
    }

    fn submit(&mut self) {
        if self.state != SessionState::Connected {
            // Type-ahead stays in the buffer until the backend answers
            debug!("Submit ignored while awaiting output");
            return;
        }

        let line = self.buffer.take();
        if line.trim().is_empty() {
            self.pending.push_str(NEWLINE);
            self.write_prompt_line();
            return;
        }

        if let Err(e) = self.input_tx.send(line.clone()) {
            warn!("Input channel closed while submitting: {}", e);
            self.on_closed(Some("input channel closed"));
            return;
        }

        debug!(line = %line, "Submitted line");
        self.pending.push_str(NEWLINE);
        self.line_width = 0;
        self.history.record(&line);
        self.state = SessionState::AwaitingOutput;
    }

    fn interrupt(&mut self) {
        debug!(state = ?self.state, "Interrupt");
        self.pending.push_str(INTERRUPT_MARK);
        self.buffer.clear();
        self.history.reset_cursor();
        self.state = SessionState::Connected;
        self.write_prompt_line();
    }

    fn on_output(&mut self, envelope: &OutputEnvelope) {
        if matches!(self.state, SessionState::Disconnected | SessionState::Closed) {
            debug!(state = ?self.state, "Dropping output outside a live session");
            return;
        }

        let text = output::format(envelope);
        self.erase_input_line();
        self.pending.push_str(&text);
        if !text.is_empty() && !text.ends_with('\n') {
            self.pending.push_str(NEWLINE);
        }
        self.state = SessionState::Connected;
        self.write_prompt_line();
    }

    fn on_closed(&mut self, reason: Option<&str>) {
        if self.state == SessionState::Closed {
            return;
        }
        info!(reason = reason.unwrap_or("none"), "Shell channel closed");
        self.state = SessionState::Closed;
        self.buffer.clear();
        let banner = match reason {
            Some(reason) => format!("\r\n*** Disconnected from server: {} ***\r\n", reason),
            None => "\r\n*** Disconnected from server ***\r\n".to_string(),
        };
        self.pending.push_str(&banner);
        self.line_width = 0;
    }

    /// Write prompt + buffer at the current cursor position.
    fn write_prompt_line(&mut self) {
        self.pending.push_str(&self.prompt);
        self.pending.push_str(self.buffer.as_str());
        self.line_width = self.prompt.width() + self.buffer.as_str().width();
    }

    /// Redraw the current line in place.
    fn rerender_line(&mut self) {
        self.erase_input_line();
        match self.state {
            SessionState::Connected => self.write_prompt_line(),
            // No prompt is shown until the backend answers
            _ => {
                self.pending.push_str(self.buffer.as_str());
                self.line_width = self.buffer.as_str().width();
            }
        }
    }

    /// Erase the input line, including rows it wrapped onto, and leave the
    /// cursor at its first column.
    fn erase_input_line(&mut self) {
        let rows_up = match self.columns {
            // The cursor stays on the last column after filling a row
            Some(cols) if self.line_width > 0 => (self.line_width - 1) / usize::from(cols),
            _ => 0,
        };
        if rows_up == 0 {
            self.pending.push_str(ERASE_LINE);
        } else {
            self.pending.push_str(&format!("\x1b[{}A\r\x1b[J", rows_up));
        }
        self.line_width = 0;
    }
}
