//! Interactive terminal session bridge.
//!
//! Turns the raw event stream of a remote shell into a line-editing
//! terminal: input buffering, key classification, history recall,
//! interrupts, and rendering of structured backend output.

mod history;
mod keys;
mod line;
pub mod output;
mod session;


pub use history::HistoryNavigator;
pub use keys::{classify, TermAction};
pub use line::LineBuffer;
pub use output::OutputEnvelope;
pub use session::{SessionEvent, SessionState, TerminalSession};
