//! Application state management.
//!
//! This module defines the main App struct that owns the terminal session,
//! the pane widgets and the event sources, and runs the event loop that
//! serialises user input with channel and HTTP events.

use crate::api::{ApiClient, ScenarioId};
use crate::channel::{spawn_shell_channel, ChannelEvent};
use crate::config::Config;
use crate::event::{AppEvent, init_app_eventsource, init_user_event};
use crate::event::{assistant as assistant_event, terminal as terminal_event, UserEvent};
use crate::terminal::{SessionEvent, SessionState, TerminalSession};
use crate::ui::assistant::{TuiAssistant, CHAT_ERROR_MESSAGE};
use crate::ui::layout::AppLayout;
use crate::ui::scenario::{ScenarioView, TuiScenario, VALIDATION_ERROR_MESSAGE};
use crate::ui::terminal::TuiTerminal;

use anyhow::{Context, Result};
use ratatui::DefaultTerminal;
use tokio::sync::mpsc::{self, Receiver, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers};

/// Greeting shown in the chat once a scenario is loaded.
const WELCOME_MESSAGE: &str = "Welcome to the new scenario! How can I assist you?";

/// Initial screen size, replaced on the first draw.
const INITIAL_ROWS: u16 = 24;
const INITIAL_COLS: u16 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Terminal,
    Assistant,
}

pub struct App {
    // backend
    session: TerminalSession,
    api: ApiClient,
    scenario_id: Option<ScenarioId>,

    // frontend widgets
    // they are public to ui module
    pub(crate) tui_terminal: TuiTerminal,
    pub(crate) tui_assistant: TuiAssistant,
    pub(crate) tui_scenario: TuiScenario,

    // App State
    active_pane: ActivePane,  // Which pane is active? (Terminal/Assistant)

    exit: bool,  // Should the app exit?
    command_mode: bool,  // Is the app in the command mode?
    force_redraw_flag: bool,  // Should force a full screen clear and redraw?

    // Last computed layout, used to detect terminal pane resizes
    layout: AppLayout,

    // events sources
    user_events: Receiver<std::io::Result<UserEvent>>,  // User input
    app_events: UnboundedReceiver<AppEvent>,  // App Events
    event_sink: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(config: &Config, scenario_id: Option<ScenarioId>) -> Result<Self> {
        Self::with_user_events(config, scenario_id, init_user_event())
    }

    /// Build the app around an existing user event source.
    ///
    /// Connects the shell channel and starts loading the scenario; both
    /// report back through the app event queue.
    pub fn with_user_events(
        config: &Config,
        scenario_id: Option<ScenarioId>,
        user_events: Receiver<std::io::Result<UserEvent>>,
    ) -> Result<Self> {
        let (event_sink, app_events) = init_app_eventsource();

        let api = ApiClient::new(&config.server_url, config.request_timeout())
            .context("Failed to create API client")?;

        let (input_tx, input_rx) = mpsc::unbounded_channel();
        spawn_shell_channel(config.shell_socket_url(), input_rx, event_sink.clone());

        let scenario_view = match scenario_id {
            Some(id) => {
                spawn_scenario_load(api.clone(), id, event_sink.clone());
                ScenarioView::Loading
            }
            None => ScenarioView::NotSelected,
        };

        let mut tui_terminal = TuiTerminal::new(INITIAL_ROWS, INITIAL_COLS, config.scrollback_lines);
        tui_terminal.set_focused(true);

        let mut session = TerminalSession::new(input_tx, config.prompt.clone());
        session.set_columns(INITIAL_COLS);

        Ok(Self {
            session,
            api,
            scenario_id,
            tui_terminal,
            tui_assistant: TuiAssistant::new(),
            tui_scenario: TuiScenario::new(scenario_view),
            active_pane: ActivePane::Terminal,
            exit: false,
            command_mode: false,
            force_redraw_flag: false,
            layout: AppLayout::default(),
            user_events,
            app_events,
            event_sink,
        })
    }

    pub fn get_active_pane(&self) -> ActivePane {
        self.active_pane
    }

    pub fn switch_pane(&mut self, pane: ActivePane) {
        self.active_pane = pane;
        self.tui_terminal.set_focused(pane == ActivePane::Terminal);
        self.tui_assistant.set_focused(pane == ActivePane::Assistant);
    }

    pub fn toggle_pane(&mut self) {
        let next = match self.active_pane {
            ActivePane::Terminal => ActivePane::Assistant,
            ActivePane::Assistant => ActivePane::Terminal,
        };
        self.switch_pane(next);
    }

    pub fn get_command_mode(&self) -> bool {
        self.command_mode
    }

    pub fn set_command_mode(&mut self, flag: bool) {
        self.command_mode = flag;
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn should_exit(&self) -> bool {
        self.exit
    }

    /// Get current layout
    pub fn layout(&self) -> &AppLayout {
        &self.layout
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            if self.exit {
                info!("Exiting");
                break Ok(());
            }
            tokio::select! {
                res = self.user_events.recv() => {
                    let usr_evt = res.with_context(|| anyhow::anyhow!("User event stream is ended."))?;
                    self.handle_user_event(usr_evt?);
                }
                res = self.app_events.recv() => {
                    let app_evt = res.with_context(|| anyhow::anyhow!("App event stream is ended"))?;
                    self.handle_app_event(app_evt);
                }
            }
            if self.force_redraw_flag {
                self.force_redraw_flag = false;
                self.force_redraw(terminal)?;
            } else {
                self.draw(terminal)?;
            }
        }
    }

    pub fn draw(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        terminal.draw(|frame| {
            let area = frame.area();

            // Rebuild layout if terminal size changed
            if self.layout.full_area != area {
                self.rebuild_layout(area);
            }

            use ratatui::widgets::Widget;
            (&*self).render(area, frame.buffer_mut());
        })?;

        Ok(())
    }

    /// Force a full screen clear and redraw.
    pub fn force_redraw(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        terminal.clear()?;
        self.draw(terminal)?;
        Ok(())
    }

    /// Recompute the layout and resize the screen model if the terminal
    /// pane changed size.
    fn rebuild_layout(&mut self, area: ratatui::layout::Rect) {
        let old = self.layout.terminal_inner;
        self.layout = AppLayout::build(area);
        let new = self.layout.terminal_inner;
        if new.width != old.width || new.height != old.height {
            debug!("Terminal pane resized to {}x{}", new.width, new.height);
            self.tui_terminal.resize(new.height, new.width);
            self.session.set_columns(new.width);
        }
    }

    /// Move whatever the session rendered into the terminal pane.
    fn flush_session_output(&mut self) {
        let output = self.session.take_output();
        if !output.is_empty() {
            self.tui_terminal.feed(&output);
        }
    }
}


impl App {

    fn handle_user_event(&mut self, event: UserEvent) {
        if self.command_mode {
            self.handle_command_mode_events(event);
            return;
        }

        match event {
            // Held keys auto-repeat where the platform reports repeats
            UserEvent::Key(key_evt) if matches!(key_evt.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
                // Ctrl + B => Command Mode
                if key_evt.kind == KeyEventKind::Press && key_evt.modifiers.contains(KeyModifiers::CONTROL) && matches!(key_evt.code, KeyCode::Char('b') | KeyCode::Char('B')) {
                    self.set_command_mode(true);
                    return;
                }

                // Pane-specific event handling (delegated to event module)
                match self.active_pane {
                    ActivePane::Terminal => {
                        terminal_event::handle_key_event(&mut self.tui_terminal, &mut self.session, key_evt);
                        self.flush_session_output();
                    }
                    ActivePane::Assistant => {
                        assistant_event::handle_key_event(
                            &mut self.tui_assistant,
                            &self.api,
                            self.scenario_id,
                            &self.event_sink,
                            key_evt,
                        );
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_command_mode_events(&mut self, event: UserEvent) {
        let UserEvent::Key(e) = event else {
            return;
        };
        if !matches!(e.kind, KeyEventKind::Press) {
            return;
        }

        match e.code {
            // n => toggle pane (switch between Terminal and Assistant)
            KeyCode::Char('n') | KeyCode::Char('N') => self.toggle_pane(),
            // c => check the scenario
            KeyCode::Char('c') | KeyCode::Char('C') => self.start_validation(),
            // l => force redraw
            KeyCode::Char('l') | KeyCode::Char('L') => self.force_redraw_flag = true,
            // q => exit application
            KeyCode::Char('q') | KeyCode::Char('Q') => self.exit = true,
            _ => {}
        }
        self.set_command_mode(false);
    }

    fn start_validation(&mut self) {
        let Some(id) = self.scenario_id else {
            debug!("Check requested without a scenario");
            return;
        };
        if self.tui_scenario.is_checking() {
            return;
        }
        self.tui_scenario.start_check();
        spawn_validation(self.api.clone(), id, self.event_sink.clone());
    }
}

impl App {
    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            // Shell channel
            AppEvent::Channel(ChannelEvent::Opened) => {
                self.session.dispatch(SessionEvent::Connected);
            }
            AppEvent::Channel(ChannelEvent::Output(envelope)) => {
                self.session.dispatch(SessionEvent::Output(envelope));
            }
            AppEvent::Channel(ChannelEvent::Closed { reason }) => {
                self.session.dispatch(SessionEvent::Closed { reason });
            }

            // Scenario
            AppEvent::ScenarioLoaded(scenario) => {
                info!("Loaded scenario {} ({})", scenario.id, scenario.title);
                self.tui_scenario.set_view(ScenarioView::Loaded(scenario));
                self.tui_assistant.push_ai_message(WELCOME_MESSAGE.to_string());
            }
            AppEvent::ScenarioFailed { error } => {
                warn!("Failed to load scenario: {}", error);
                self.tui_scenario.set_view(ScenarioView::Failed);
            }
            AppEvent::ValidationFinished { message } => {
                self.tui_scenario.finish_check(message);
            }
            AppEvent::ValidationFailed { error } => {
                warn!("Scenario validation failed: {}", error);
                self.tui_scenario.finish_check(VALIDATION_ERROR_MESSAGE.to_string());
            }

            // Chat
            AppEvent::ChatReply { text } => {
                self.tui_assistant.set_waiting(false);
                self.tui_assistant.push_ai_message(text);
            }
            AppEvent::ChatFailed { error } => {
                debug!("Chat failure shown to user: {}", error);
                self.tui_assistant.set_waiting(false);
                self.tui_assistant.push_ai_message(CHAT_ERROR_MESSAGE.to_string());
            }
        }
        self.flush_session_output();
    }
}

fn spawn_scenario_load(api: ApiClient, id: ScenarioId, event_tx: UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let event = match api.get_scenario(id).await {
            Ok(scenario) => AppEvent::ScenarioLoaded(scenario),
            Err(e) => AppEvent::ScenarioFailed { error: e.to_string() },
        };
        if let Err(e) = event_tx.send(event) {
            debug!("App gone before scenario loaded: {:?}", e.0);
        }
    });
}

fn spawn_validation(api: ApiClient, id: ScenarioId, event_tx: UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let event = match api.validate(id).await {
            Ok(message) => AppEvent::ValidationFinished { message },
            Err(e) => AppEvent::ValidationFailed { error: e.to_string() },
        };
        if let Err(e) = event_tx.send(event) {
            debug!("App gone before validation finished: {:?}", e.0);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;
    use crate::api::Scenario;
    use crate::terminal::OutputEnvelope;

    fn test_app(scenario_id: Option<ScenarioId>) -> App {
        let config = Config {
            server_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 1,
            ..Config::default()
        };
        let (_tx, user_events) = mpsc::channel(1);
        App::with_user_events(&config, scenario_id, user_events).unwrap()
    }

    fn key(code: KeyCode) -> UserEvent {
        UserEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(ch: char) -> UserEvent {
        UserEvent::Key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL))
    }

    fn type_line(app: &mut App, line: &str) {
        for ch in line.chars() {
            app.handle_user_event(key(KeyCode::Char(ch)));
        }
    }

    #[tokio::test]
    async fn session_output_reaches_terminal_pane() {
        let mut app = test_app(None);
        app.handle_app_event(AppEvent::Channel(ChannelEvent::Opened));
        assert_eq!(app.session_state(), SessionState::Connected);

        type_line(&mut app, "ls");
        app.handle_user_event(key(KeyCode::Enter));
        assert_eq!(app.session_state(), SessionState::AwaitingOutput);

        app.handle_app_event(AppEvent::Channel(ChannelEvent::Output(OutputEnvelope::Text(
            "a.txt\nb.txt".to_string(),
        ))));
        let contents = app.tui_terminal.contents();
        assert!(contents.contains("*** Connected to server ***"));
        assert!(contents.contains("$ ls"));
        assert!(contents.contains("a.txt\nb.txt"));
        assert_eq!(app.session_state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn held_keys_repeat_in_terminal_pane() {
        let mut app = test_app(None);
        app.handle_app_event(AppEvent::Channel(ChannelEvent::Opened));

        let with_kind = |code, kind| UserEvent::Key(KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind));
        app.handle_user_event(with_kind(KeyCode::Char('x'), KeyEventKind::Press));
        app.handle_user_event(with_kind(KeyCode::Char('x'), KeyEventKind::Repeat));
        app.handle_user_event(with_kind(KeyCode::Char('x'), KeyEventKind::Repeat));
        app.handle_user_event(with_kind(KeyCode::Char('x'), KeyEventKind::Release));
        assert_eq!(app.session.buffer().as_str(), "xxx");

        app.handle_user_event(with_kind(KeyCode::Backspace, KeyEventKind::Repeat));
        assert_eq!(app.session.buffer().as_str(), "xx");

        // Only a fresh press enters command mode
        app.handle_user_event(UserEvent::Key(KeyEvent::new_with_kind(
            KeyCode::Char('b'),
            KeyModifiers::CONTROL,
            KeyEventKind::Repeat,
        )));
        assert!(!app.get_command_mode());
    }

    #[tokio::test]
    async fn channel_close_shows_banner() {
        let mut app = test_app(None);
        app.handle_app_event(AppEvent::Channel(ChannelEvent::Opened));
        app.handle_app_event(AppEvent::Channel(ChannelEvent::Closed { reason: None }));
        assert_eq!(app.session_state(), SessionState::Closed);
        assert!(app.tui_terminal.contents().contains("*** Disconnected from server ***"));
    }

    #[tokio::test]
    async fn command_mode_toggles_pane_and_quits() {
        let mut app = test_app(None);
        app.handle_user_event(ctrl('b'));
        assert!(app.get_command_mode());
        app.handle_user_event(key(KeyCode::Char('n')));
        assert!(!app.get_command_mode());
        assert_eq!(app.get_active_pane(), ActivePane::Assistant);

        // Keys now go to the chat input
        type_line(&mut app, "hi");
        assert_eq!(app.tui_assistant.input(), "hi");

        app.handle_user_event(ctrl('b'));
        app.handle_user_event(key(KeyCode::Char('x')));
        assert!(!app.get_command_mode());
        assert!(!app.should_exit());

        app.handle_user_event(ctrl('b'));
        app.handle_user_event(key(KeyCode::Char('q')));
        assert!(app.should_exit());
    }

    #[tokio::test]
    async fn scenario_events_update_panels() {
        let mut app = test_app(Some(3));
        assert_eq!(app.tui_scenario.view(), &ScenarioView::Loading);

        let scenario = Scenario {
            id: 3,
            title: "Deployments".to_string(),
            description: String::new(),
            tasks: vec![],
        };
        app.handle_app_event(AppEvent::ScenarioLoaded(scenario.clone()));
        assert_eq!(app.tui_scenario.view(), &ScenarioView::Loaded(scenario));
        assert_eq!(app.tui_assistant.messages()[0].text, WELCOME_MESSAGE);

        app.handle_app_event(AppEvent::ScenarioFailed { error: "boom".to_string() });
        assert_eq!(app.tui_scenario.view(), &ScenarioView::Failed);
    }

    #[tokio::test]
    async fn validation_and_chat_failures_use_friendly_messages() {
        let mut app = test_app(Some(3));

        app.handle_user_event(ctrl('b'));
        app.handle_user_event(key(KeyCode::Char('c')));
        assert!(app.tui_scenario.is_checking());

        app.handle_app_event(AppEvent::ValidationFailed { error: "500".to_string() });
        assert_eq!(app.tui_scenario.check_output(), Some(VALIDATION_ERROR_MESSAGE));

        app.tui_assistant.set_waiting(true);
        app.handle_app_event(AppEvent::ChatFailed { error: "timeout".to_string() });
        assert!(!app.tui_assistant.is_waiting());
        let last = app.tui_assistant.messages().last().map(|m| m.text.as_str());
        assert_eq!(last, Some(CHAT_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn check_without_scenario_is_ignored() {
        let mut app = test_app(None);
        assert_eq!(app.tui_scenario.view(), &ScenarioView::NotSelected);
        app.handle_user_event(ctrl('b'));
        app.handle_user_event(key(KeyCode::Char('c')));
        assert!(!app.tui_scenario.is_checking());
    }
}
