//! Key event handling for the Terminal pane.

use crossterm::event::{KeyCode, KeyEvent};

use crate::terminal::{SessionEvent, TerminalSession};
use crate::ui::terminal::TuiTerminal;

/// Rows scrolled per PageUp/PageDown.
const PAGE_SCROLL: isize = 10;

/// Handle key events when the Terminal pane is active.
///
/// PageUp/PageDown scroll the local scrollback; every other key goes to the
/// session, which snaps the view back to the live screen.
pub fn handle_key_event(terminal: &mut TuiTerminal, session: &mut TerminalSession, key_evt: KeyEvent) {
    match key_evt.code {
        KeyCode::PageUp => terminal.scroll(PAGE_SCROLL),
        KeyCode::PageDown => terminal.scroll(-PAGE_SCROLL),
        _ => {
            terminal.scroll_to_bottom();
            session.dispatch(SessionEvent::Key(key_evt));
        }
    }
}
