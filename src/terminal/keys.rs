//! Key-event classification for the terminal pane.
//!
//! Maps a crossterm key event to exactly one [`TermAction`]. This is a
//! pure function; all side effects live in the session controller.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press means to the terminal session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermAction {
    Insert(char),
    EraseBack,
    Submit,
    HistoryUp,
    HistoryDown,
    Interrupt,
    Ignore,
}

/// Classify a key event. Rules are checked in priority order.
pub fn classify(key_event: &KeyEvent) -> TermAction {
    let KeyEvent { code, modifiers, kind, .. } = *key_event;

    if kind == KeyEventKind::Release {
        return TermAction::Ignore;
    }

    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let alt = modifiers.contains(KeyModifiers::ALT);
    let meta = modifiers.intersects(KeyModifiers::SUPER | KeyModifiers::META);

    match code {
        KeyCode::Char('c') | KeyCode::Char('C') if ctrl => TermAction::Interrupt,
        KeyCode::Enter => TermAction::Submit,
        KeyCode::Backspace => TermAction::EraseBack,
        KeyCode::Up => TermAction::HistoryUp,
        KeyCode::Down => TermAction::HistoryDown,
        KeyCode::Char(c) if !ctrl && !alt && !meta && !c.is_control() => TermAction::Insert(c),
        _ => TermAction::Ignore,
    }
}
