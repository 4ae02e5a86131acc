//! Terminal pane widget.
//!
//! The session controller produces an ANSI byte stream; this widget feeds
//! it into a vt100 screen model and paints the visible cells.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Widget;

pub struct TuiTerminal {
    parser: vt100::Parser,
    /// Last byte fed was a carriage return (for eol conversion across chunks)
    last_was_cr: bool,
    focused: bool,
}

impl TuiTerminal {
    pub fn new(rows: u16, cols: u16, scrollback: usize) -> Self {
        Self {
            parser: vt100::Parser::new(rows.max(1), cols.max(1), scrollback),
            last_was_cr: false,
            focused: true,
        }
    }

    /// Feed rendered session output into the screen.
    pub fn feed(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let converted = convert_eol(text, self.last_was_cr);
        self.last_was_cr = text.ends_with('\r');
        self.parser.process(converted.as_bytes());
    }

    /// Match the screen model to the pane's inner size.
    pub fn resize(&mut self, rows: u16, cols: u16) {
        let (rows, cols) = (rows.max(1), cols.max(1));
        if self.parser.screen().size() != (rows, cols) {
            self.parser.set_size(rows, cols);
        }
    }

    /// Scroll back (`delta > 0`) or forward through history.
    pub fn scroll(&mut self, delta: isize) {
        let current = self.parser.screen().scrollback() as isize;
        let target = (current + delta).max(0) as usize;
        self.parser.set_scrollback(target);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.parser.set_scrollback(0);
    }

    pub fn scroll_offset(&self) -> usize {
        self.parser.screen().scrollback()
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Plain-text contents of the visible screen.
    pub fn contents(&self) -> String {
        self.parser.screen().contents()
    }
}

impl Widget for &TuiTerminal {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let screen = self.parser.screen();

        for row in 0..area.height {
            for col in 0..area.width {
                let Some(cell) = screen.cell(row, col) else {
                    continue;
                };
                if cell.is_wide_continuation() {
                    continue;
                }

                let fg = convert_color(cell.fgcolor());
                let bg = convert_color(cell.bgcolor());
                let mut style = Style::default().fg(fg).bg(bg);
                if cell.bold() {
                    style = style.add_modifier(Modifier::BOLD);
                }
                if cell.italic() {
                    style = style.add_modifier(Modifier::ITALIC);
                }
                if cell.underline() {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                if cell.inverse() {
                    style = style.add_modifier(Modifier::REVERSED);
                }

                let contents = cell.contents();
                if let Some(buf_cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    buf_cell.set_symbol(if contents.is_empty() { " " } else { &contents });
                    buf_cell.set_style(style);
                }
            }
        }

        let scrolled = screen.scrollback();
        if scrolled == 0 {
            if self.focused && !screen.hide_cursor() {
                let (cursor_row, cursor_col) = screen.cursor_position();
                if cursor_row < area.height && cursor_col < area.width {
                    if let Some(cell) = buf.cell_mut((area.x + cursor_col, area.y + cursor_row)) {
                        cell.set_style(Style::default().add_modifier(Modifier::REVERSED));
                    }
                }
            }
        } else {
            let indicator = format!(" [{}↑] ", scrolled);
            let width = indicator.chars().count() as u16;
            let x = area.right().saturating_sub(width + 1).max(area.x);
            buf.set_string(
                x,
                area.y,
                indicator,
                Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD),
            );
        }
    }
}

/// Turn bare `\n` into `\r\n` so backend output starts each line at column 0.
fn convert_eol(text: &str, prev_was_cr: bool) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut prev_cr = prev_was_cr;
    for ch in text.chars() {
        if ch == '\n' && !prev_cr {
            out.push('\r');
        }
        out.push(ch);
        prev_cr = ch == '\r';
    }
    out
}

fn convert_color(color: vt100::Color) -> Color {
    match color {
        vt100::Color::Default => Color::Reset,
        vt100::Color::Idx(0) => Color::Black,
        vt100::Color::Idx(1) => Color::Red,
        vt100::Color::Idx(2) => Color::Green,
        vt100::Color::Idx(3) => Color::Yellow,
        vt100::Color::Idx(4) => Color::Blue,
        vt100::Color::Idx(5) => Color::Magenta,
        vt100::Color::Idx(6) => Color::Cyan,
        vt100::Color::Idx(7) => Color::Gray,
        vt100::Color::Idx(8) => Color::DarkGray,
        vt100::Color::Idx(9) => Color::LightRed,
        vt100::Color::Idx(10) => Color::LightGreen,
        vt100::Color::Idx(11) => Color::LightYellow,
        vt100::Color::Idx(12) => Color::LightBlue,
        vt100::Color::Idx(13) => Color::LightMagenta,
        vt100::Color::Idx(14) => Color::LightCyan,
        vt100::Color::Idx(15) => Color::White,
        vt100::Color::Idx(idx) => Color::Indexed(idx),
        vt100::Color::Rgb(r, g, b) => Color::Rgb(r, g, b),
    }
}
