//! User interface module for the TUI application.
//!
//! Contains the pane widgets and the layout; [`App`] renders them all
//! through its `Widget` implementation below.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::Line;
use ratatui::widgets::Widget;

use crate::app::{ActivePane, App};
use crate::terminal::SessionState;

pub mod assistant;
pub mod layout;
pub mod scenario;
pub mod terminal;

use layout::{outer_block, terminal_block};

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let pane = match self.get_active_pane() {
            ActivePane::Terminal => "TERMINAL",
            ActivePane::Assistant => "ASSISTANT",
        };
        let mut title = vec![format!(" kpa-term [{}] ", pane).bold()];
        if self.get_command_mode() {
            title.push(" COMMAND: n pane | c check | l redraw | q quit ".black().on_yellow());
        }
        outer_block().title(Line::from(title)).render(area, buf);

        let layout = self.layout();
        self.tui_scenario.render(layout.scenario, buf);

        let (state_label, state_color) = match self.session_state() {
            SessionState::Disconnected => ("connecting", Color::Yellow),
            SessionState::Connected => ("connected", Color::Green),
            SessionState::AwaitingOutput => ("running", Color::Cyan),
            SessionState::Closed => ("disconnected", Color::Red),
        };
        let focused = self.get_active_pane() == ActivePane::Terminal;
        terminal_block()
            .title(" Terminal ")
            .title(Line::from(format!(" {} ", state_label).fg(state_color)).right_aligned())
            .border_style(if focused { Style::default().fg(Color::Yellow) } else { Style::default() })
            .render(layout.terminal, buf);
        self.tui_terminal.render(layout.terminal_inner, buf);

        self.tui_assistant.render(layout.assistant, buf);
    }
}
