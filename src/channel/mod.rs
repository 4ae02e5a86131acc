//! Channels to the remote shell backend.
//!
//! The backend is reached over one WebSocket that carries two logical
//! channels:
//! - input: submitted lines, desktop -> backend
//! - output: output envelopes, backend -> desktop
//!
//! Connection lifecycle and output arrive as [`ChannelEvent`]s on the app
//! event queue so they are serialised with key input.

mod socket;

use serde::{Deserialize, Serialize};

use crate::terminal::OutputEnvelope;

pub use socket::spawn_shell_channel;

/// Lifecycle and output notifications from the shell channel.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    Opened,
    Output(OutputEnvelope),
    Closed { reason: Option<String> },
}

/// Messages sent to the backend on the input channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// One submitted line
    Input { data: String },
}
