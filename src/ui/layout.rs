//! Screen layout: scenario panel over the terminal on the left, assistant
//! chat on the right, all inside the outer frame.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders};

/// Width of the assistant column.
const ASSISTANT_WIDTH: u16 = 50;
/// Share of the left column given to the scenario panel.
const SCENARIO_PERCENT: u16 = 35;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppLayout {
    /// Whole frame the layout was computed for
    pub full_area: Rect,
    pub scenario: Rect,
    /// Terminal pane including its border
    pub terminal: Rect,
    /// Area the vt100 screen is drawn into
    pub terminal_inner: Rect,
    pub assistant: Rect,
}

impl AppLayout {
    pub fn build(area: Rect) -> Self {
        let inner = outer_block().inner(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(ASSISTANT_WIDTH)])
            .split(inner);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(SCENARIO_PERCENT),
                Constraint::Percentage(100 - SCENARIO_PERCENT),
            ])
            .split(columns[0]);

        let terminal = left[1];
        Self {
            full_area: area,
            scenario: left[0],
            terminal,
            terminal_inner: terminal_block().inner(terminal),
            assistant: columns[1],
        }
    }
}

/// Frame around the whole application.
pub fn outer_block() -> Block<'static> {
    Block::new().borders(Borders::TOP)
}

/// Border of the terminal pane.
pub fn terminal_block() -> Block<'static> {
    Block::new().borders(Borders::ALL)
}
