//! Key event handling for the AI Assistant pane.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::api::{ApiClient, ScenarioId};
use crate::event::AppEvent;
use crate::ui::assistant::TuiAssistant;

/// Handle key events when the Assistant pane is active.
///
/// Enter submits the input as a chat request on a background task; the
/// reply comes back as [`AppEvent::ChatReply`] or [`AppEvent::ChatFailed`].
/// Only one request is in flight at a time.
pub fn handle_key_event(
    assistant: &mut TuiAssistant,
    api: &ApiClient,
    scenario_id: Option<ScenarioId>,
    event_tx: &UnboundedSender<AppEvent>,
    key_evt: KeyEvent,
) {
    match key_evt.code {
        KeyCode::Enter => {
            if assistant.is_waiting() {
                return;
            }
            let input = assistant.take_input();
            let message = input.trim();
            if message.is_empty() {
                return;
            }

            assistant.push_user_message(message.to_string());
            assistant.set_waiting(true);
            spawn_chat_request(api.clone(), message.to_string(), scenario_id, event_tx.clone());
        }

        KeyCode::Char(c)
            if !key_evt
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            assistant.insert_char(c);
        }

        KeyCode::Backspace => assistant.delete_char(),

        KeyCode::Up | KeyCode::PageUp => {
            let rows = if key_evt.code == KeyCode::PageUp { 10 } else { 1 };
            assistant.scroll(rows);
        }
        KeyCode::Down | KeyCode::PageDown => {
            let rows = if key_evt.code == KeyCode::PageDown { 10 } else { 1 };
            assistant.scroll(-rows);
        }
        KeyCode::Esc => assistant.scroll_to_bottom(),

        _ => {}
    }
}

fn spawn_chat_request(
    api: ApiClient,
    message: String,
    scenario_id: Option<ScenarioId>,
    event_tx: UnboundedSender<AppEvent>,
) {
    tokio::spawn(async move {
        debug!("Sending chat message ({} chars)", message.len());
        let event = match api.chat(&message, scenario_id).await {
            Ok(text) => AppEvent::ChatReply { text },
            Err(e) => {
                warn!("Chat request failed: {}", e);
                AppEvent::ChatFailed { error: e.to_string() }
            }
        };
        if let Err(e) = event_tx.send(event) {
            debug!("App gone before chat reply: {:?}", e.0);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn client() -> ApiClient {
        ApiClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap()
    }

    #[test]
    fn typing_and_backspace_edit_input() {
        let mut assistant = TuiAssistant::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let api = client();

        for code in [KeyCode::Char('h'), KeyCode::Char('i'), KeyCode::Char('!'), KeyCode::Backspace] {
            handle_key_event(&mut assistant, &api, None, &tx, press(code));
        }
        handle_key_event(
            &mut assistant,
            &api,
            None,
            &tx,
            KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL),
        );
        assert_eq!(assistant.input(), "hi");
    }

    #[test]
    fn blank_input_is_not_sent() {
        let mut assistant = TuiAssistant::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let api = client();

        handle_key_event(&mut assistant, &api, None, &tx, press(KeyCode::Char(' ')));
        handle_key_event(&mut assistant, &api, None, &tx, press(KeyCode::Enter));

        assert!(assistant.messages().is_empty());
        assert!(!assistant.is_waiting());
        assert!(assistant.input().is_empty());
    }

    #[tokio::test]
    async fn enter_sends_and_failure_is_reported() {
        let mut assistant = TuiAssistant::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let api = client();

        for ch in " get pods ".chars() {
            handle_key_event(&mut assistant, &api, Some(1), &tx, press(KeyCode::Char(ch)));
        }
        handle_key_event(&mut assistant, &api, Some(1), &tx, press(KeyCode::Enter));

        assert_eq!(assistant.messages().len(), 1);
        assert_eq!(assistant.messages()[0].text, "get pods");
        assert!(assistant.is_waiting());

        // Input typed while waiting is kept but not sent
        handle_key_event(&mut assistant, &api, Some(1), &tx, press(KeyCode::Char('x')));
        handle_key_event(&mut assistant, &api, Some(1), &tx, press(KeyCode::Enter));
        assert_eq!(assistant.messages().len(), 1);
        assert_eq!(assistant.input(), "x");

        // Nothing listens on port 9
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, AppEvent::ChatFailed { .. }));
    }
}
