//! Event handling system for the application.
//!
//! Two sources feed the single main loop in [`crate::app::App::run`]:
//!
//! - **User events**: keyboard and resize events read from the
//!   terminal on a dedicated thread, so input is never blocked by the UI.
//! - **App events**: shell channel lifecycle/output and the results of
//!   background HTTP requests.
//!
//! The loop takes one event at a time from either source, which gives the
//! terminal session a single ordered event queue.
//!
//! # Submodules
//!
//! - `assistant`: key event handling for the chat pane
//! - `terminal`: key event handling for the terminal pane

pub mod assistant;
pub mod terminal;

use std::thread;

use tokio::sync::mpsc::{self, Receiver, UnboundedReceiver, UnboundedSender};
use std::io::Result;

use crate::api::Scenario;
use crate::channel::ChannelEvent;

/// User input events from the terminal.
pub type UserEvent = crossterm::event::Event;

/// Capacity of the user input channel.
const USER_EVENT_BUFFER: usize = 64;

/// Initializes the user event stream.
///
/// Spawns a thread that blocks on `crossterm::event::read()` and forwards
/// every event. The thread ends once the receiver is dropped.
pub fn init_user_event() -> Receiver<Result<UserEvent>> {
    let (tx, rx) = mpsc::channel(USER_EVENT_BUFFER);
    thread::spawn(move || {
        loop {
            if tx.blocking_send(crossterm::event::read()).is_err() {
                break;
            }
        }
    });
    rx
}

/// Application-wide events produced by background tasks.
#[derive(Debug)]
#[non_exhaustive]
pub enum AppEvent {
    /// Shell channel lifecycle or output
    Channel(ChannelEvent),

    // =========================================================================
    // Scenario
    // =========================================================================

    ScenarioLoaded(Scenario),
    ScenarioFailed { error: String },
    ValidationFinished { message: String },
    ValidationFailed { error: String },

    // =========================================================================
    // Chat
    // =========================================================================

    ChatReply { text: String },
    ChatFailed { error: String },
}

/// Creates the app event channel.
///
/// Unbounded: app events are low-frequency and senders live in async tasks
/// that must not block.
pub fn init_app_eventsource() -> (UnboundedSender<AppEvent>, UnboundedReceiver<AppEvent>) {
    mpsc::unbounded_channel()
}
