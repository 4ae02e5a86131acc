//! WebSocket connection to the shell backend.
//!
//! One task owns the socket: it forwards submitted lines from the session
//! and decodes every incoming frame into an output envelope at the
//! boundary, so nothing downstream ever sees raw frames.

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{error::ProtocolError, Error as WsError, Message},
};
use tracing::{debug, error, info, warn};

use super::{ChannelEvent, ClientMessage};
use crate::event::AppEvent;
use crate::terminal::OutputEnvelope;

/// Connect to `url` in the background.
///
/// Lines received on `input_rx` are sent to the backend in order. Channel
/// lifecycle and output are reported on `event_tx`; exactly one
/// [`ChannelEvent::Closed`] is sent when the task ends, including when the
/// connection could not be established.
pub fn spawn_shell_channel(
    url: String,
    input_rx: UnboundedReceiver<String>,
    event_tx: UnboundedSender<AppEvent>,
) {
    tokio::spawn(async move {
        let reason = match run_channel(&url, input_rx, &event_tx).await {
            Ok(reason) => reason,
            Err(e) => {
                warn!("Shell channel failed: {:#}", e);
                Some(format!("{:#}", e))
            }
        };
        notify(&event_tx, ChannelEvent::Closed { reason });
    });
}

async fn run_channel(
    url: &str,
    mut input_rx: UnboundedReceiver<String>,
    event_tx: &UnboundedSender<AppEvent>,
) -> Result<Option<String>> {
    info!("Connecting to shell backend at {}", url);
    let (ws_stream, _response) = connect_async(url)
        .await
        .with_context(|| format!("Failed to connect to {}", url))?;

    info!("Shell backend connected");
    if !notify(event_tx, ChannelEvent::Opened) {
        return Ok(None);
    }

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            line = input_rx.recv() => {
                let Some(line) = line else {
                    // Session dropped: close politely
                    if let Err(e) = write.send(Message::Close(None)).await {
                        debug!("Failed to send close frame: {}", e);
                    }
                    return Ok(None);
                };

                let json = serde_json::to_string(&ClientMessage::Input { data: line })
                    .context("Failed to serialize input message")?;
                write
                    .send(Message::Text(json))
                    .await
                    .context("Failed to send input to shell backend")?;
            }
            msg = read.next() => {
                let msg = match msg {
                    Some(Ok(m)) => m,
                    Some(Err(e)) => {
                        if is_normal_close(&e) {
                            return Ok(None);
                        }
                        return Err(e).context("Shell channel read error");
                    }
                    None => return Ok(None),
                };

                let payload = match msg {
                    Message::Text(text) => text,
                    Message::Binary(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                    Message::Close(frame) => {
                        let reason = frame
                            .map(|f| f.reason.to_string())
                            .filter(|r| !r.is_empty());
                        return Ok(reason);
                    }
                    // Ping/pong are answered by tungstenite
                    _ => continue,
                };

                if !notify(event_tx, ChannelEvent::Output(OutputEnvelope::decode(&payload))) {
                    return Ok(None);
                }
            }
        }
    }
}

fn is_normal_close(e: &WsError) -> bool {
    matches!(
        e,
        WsError::ConnectionClosed
            | WsError::AlreadyClosed
            | WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake)
    )
}

/// Push an event to the app queue. Returns `false` once the app is gone.
fn notify(event_tx: &UnboundedSender<AppEvent>, event: ChannelEvent) -> bool {
    match event_tx.send(AppEvent::Channel(event)) {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to send channel event: {:?}", e.0);
            false
        }
    }
}
