//! kpa-term - terminal front end for a hands-on learning assistant
//!
//! The core is an interactive terminal session bridge that proxies
//! keystrokes to a remote shell backend:
//! - line buffering, history navigation and key classification
//! - rendering of structured output (text, errors, directory listings)
//! - a session state machine driven by one ordered event queue
//!
//! Around it sit the WebSocket shell channel, the REST client for
//! scenarios, chat and validation, and the ratatui panes.
//!
//! # Example
//!
//! ```
//! use kpa_term::terminal::{OutputEnvelope, SessionEvent, SessionState, TerminalSession};
//! use tokio::sync::mpsc;
//!
//! let (input_tx, mut input_rx) = mpsc::unbounded_channel();
//! let mut session = TerminalSession::new(input_tx, "$ ");
//!
//! session.dispatch(SessionEvent::Connected);
//! assert_eq!(session.state(), SessionState::Connected);
//!
//! session.dispatch(SessionEvent::Output(OutputEnvelope::Error("not found".into())));
//! let rendered = session.take_output();
//! assert!(rendered.contains("\x1b[91mnot found\x1b[0m"));
//! assert!(input_rx.try_recv().is_err());
//! ```

pub mod api;
pub mod app;
pub mod channel;
pub mod config;
pub mod event;
pub mod terminal;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use app::{ActivePane, App};
pub use config::{Args, Config};
pub use event::{init_app_eventsource, init_user_event, AppEvent, UserEvent};
pub use terminal::{OutputEnvelope, SessionEvent, SessionState, TerminalSession};
