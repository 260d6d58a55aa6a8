//! App: component-based render loop.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (shared read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage`s in: terminal events, new
//!   `ClientView`s from the core, and operator prompt requests.
//! - The event loop draws each frame, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action.
//! - Intents for the client core flow out through `event_tx`.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Terminal,
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    components::{
        header::Header, help_overlay::HelpOverlay, modal::Modal, station_list::StationList,
        track_panel::TrackPanel,
    },
    core::{ClientEvent, ClientView},
    display::ConnectionStatus,
    dispatch::EMERGENCY_ACK,
    intent::{CommandKind, UserIntent},
    prompt::PromptRequest,
    widgets::{
        status_bar::{draw_banner, draw_keys_bar, draw_separator},
        toast::ToastManager,
    },
};

const INPUT_POLL: Duration = Duration::from_millis(200);

/// Everything the render loop reacts to.
#[derive(Debug)]
pub enum AppMessage {
    Event(Event),
    View(Box<ClientView>),
    Prompt(PromptRequest),
}

/// Last-drawn layout rects, used for mouse hit-testing.
#[derive(Debug, Default, Clone, Copy)]
struct PaneAreas {
    station_list: Rect,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    pub state: AppState,

    // ── Components ────────────────────────────────────────────────────────────
    header: Header,
    station_list: StationList,
    track_panel: TrackPanel,
    modal: Modal,
    help_overlay: HelpOverlay,

    toast: ToastManager,
    event_tx: mpsc::Sender<ClientEvent>,
    pane_areas: PaneAreas,
    should_quit: bool,

    // ── Transition tracking for toasts ────────────────────────────────────────
    prev_status: Option<ConnectionStatus>,
    prev_submitting: Option<CommandKind>,
}

impl App {
    pub fn new(state: AppState, event_tx: mpsc::Sender<ClientEvent>) -> Self {
        Self {
            state,
            header: Header::new(),
            station_list: StationList::new(),
            track_panel: TrackPanel::new(),
            modal: Modal::new(),
            help_overlay: HelpOverlay::new(),
            toast: ToastManager::new(),
            event_tx,
            pane_areas: PaneAreas::default(),
            should_quit: false,
            prev_status: None,
            prev_submitting: None,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(
        mut self,
        view_rx: watch::Receiver<ClientView>,
        prompt_rx: mpsc::Receiver<PromptRequest>,
    ) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let result = self.event_loop(&mut terminal, view_rx, prompt_rx).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        mut view_rx: watch::Receiver<ClientView>,
        mut prompt_rx: mpsc::Receiver<PromptRequest>,
    ) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<AppMessage>(256);

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = tx.clone();
        // Polls with a timeout so the thread notices when the loop is gone.
        tokio::task::spawn_blocking(move || {
            while !event_tx.is_closed() {
                match event::poll(INPUT_POLL) {
                    Ok(true) => match event::read() {
                        Ok(ev) => {
                            if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                                break;
                            }
                        }
                        Err(_) => break,
                    },
                    Ok(false) => {}
                    Err(_) => break,
                }
            }
        });

        // ── Background task: client views (core → AppMessage) ─────────────────
        let view_tx = tx.clone();
        tokio::spawn(async move {
            loop {
                let view = view_rx.borrow_and_update().clone();
                if view_tx.send(AppMessage::View(Box::new(view))).await.is_err() {
                    break;
                }
                if view_rx.changed().await.is_err() {
                    break;
                }
            }
        });

        // ── Background task: operator prompts ─────────────────────────────────
        let prompt_tx = tx;
        tokio::spawn(async move {
            while let Some(request) = prompt_rx.recv().await {
                if prompt_tx.send(AppMessage::Prompt(request)).await.is_err() {
                    break;
                }
            }
        });

        // Toast expiry + spinner animation.
        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }

            if self.should_quit {
                break;
            }

            tokio::select! {
                msg = rx.recv() => match msg {
                    Some(msg) => needs_redraw = self.handle_message(msg).await,
                    None => break,
                },

                _ = ui_tick.tick() => {
                    needs_redraw = !self.toast.is_empty();
                    self.toast.tick();
                }
            }
        }

        info!("render loop finished");
        Ok(())
    }

    // ── Messages ──────────────────────────────────────────────────────────────

    /// Returns whether a redraw is needed.
    async fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                for action in self.handle_key(key) {
                    self.dispatch(action).await;
                }
                true
            }
            AppMessage::Event(Event::Mouse(mouse)) => {
                for action in self.handle_mouse(mouse) {
                    self.dispatch(action).await;
                }
                true
            }
            AppMessage::Event(Event::Resize(..)) => true,
            AppMessage::Event(_) => false,
            AppMessage::View(view) => {
                self.apply_view(*view);
                true
            }
            AppMessage::Prompt(request) => {
                if let PromptRequest::Acknowledge { message } = &request {
                    if message == EMERGENCY_ACK {
                        self.toast.warning("All scrobbling halted");
                    }
                }
                self.modal.push(request);
                true
            }
        }
    }

    fn apply_view(&mut self, view: ClientView) {
        let status = view.display.connection_status;
        let submitting = view.commands.submitting();
        self.state.view = view;
        self.station_list.sync_stations(&self.state);

        if let Some(prev) = self.prev_status {
            if prev != status {
                match status {
                    ConnectionStatus::Active => {
                        let station = self
                            .state
                            .display()
                            .active_station
                            .as_ref()
                            .map(|s| s.display_name())
                            .unwrap_or_default();
                        self.toast.success(format!("Scrobbling started: {}", station));
                    }
                    ConnectionStatus::Inactive => self.toast.info("Scrobbling stopped"),
                }
            }
        }
        self.prev_status = Some(status);

        if submitting != self.prev_submitting {
            match submitting {
                Some(kind) => self.toast.spinner(format!("sending {}…", kind.label())),
                None => self.toast.dismiss_spinner(),
            }
            self.prev_submitting = submitting;
        }
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return Vec::new();
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return vec![Action::Quit];
        }
        if self.modal.is_open() {
            return self.modal.handle_key(key, &self.state);
        }
        if self.help_overlay.visible {
            return self.help_overlay.handle_key(key, &self.state);
        }

        let display = self.state.display();
        match key.code {
            KeyCode::Char('q') => vec![Action::Quit],
            KeyCode::Char('?') => vec![Action::ToggleHelp],
            KeyCode::Char('K') => vec![Action::ToggleKeys],
            // Not gated on can_start: with no selection the core answers
            // with a banner.
            KeyCode::Char('s') if !display.connection_status.is_active() => {
                vec![Action::Intent(UserIntent::Start)]
            }
            KeyCode::Char('x') if display.can_stop => vec![Action::Intent(UserIntent::Stop)],
            KeyCode::Char('E') if display.can_emergency_stop => {
                vec![Action::Intent(UserIntent::EmergencyStop)]
            }
            KeyCode::Char('s') | KeyCode::Char('x') | KeyCode::Char('E') => Vec::new(),
            _ => self.station_list.handle_key(key, &self.state),
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Vec<Action> {
        if self.modal.is_open() || self.help_overlay.visible {
            return Vec::new();
        }
        let area = self.pane_areas.station_list;
        let inside = mouse.column >= area.x
            && mouse.column < area.x + area.width
            && mouse.row >= area.y
            && mouse.row < area.y + area.height;
        if !inside {
            return Vec::new();
        }
        self.station_list.handle_mouse(mouse, area, &self.state)
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    async fn dispatch(&mut self, action: Action) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            match action {
                Action::Intent(intent) => {
                    debug!("intent {:?}", intent);
                    if self.event_tx.send(ClientEvent::Intent(intent)).await.is_err() {
                        warn!("client core is gone; intent dropped");
                        self.toast.error("Client core stopped");
                    }
                }
                Action::ToggleKeys => self.state.show_keys_bar = !self.state.show_keys_bar,
                Action::Quit => {
                    info!("quit requested");
                    self.should_quit = true;
                    let _ = self.event_tx.send(ClientEvent::Shutdown).await;
                }
                other => {
                    queue.extend(self.station_list.on_action(&other, &self.state));
                    queue.extend(self.modal.on_action(&other, &self.state));
                    queue.extend(self.help_overlay.on_action(&other, &self.state));
                }
            }
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        let keys_height = u16::from(self.state.show_keys_bar);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(4),
                Constraint::Length(1),
                Constraint::Length(keys_height),
            ])
            .split(area);

        self.header.draw(frame, rows[0], false, &self.state);
        draw_separator(frame, rows[1]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[2]);
        self.pane_areas.station_list = body[0];
        let list_focused = !self.modal.is_open() && !self.help_overlay.visible;
        self.station_list
            .draw(frame, body[0], list_focused, &self.state);
        self.track_panel.draw(frame, body[1], false, &self.state);

        draw_banner(frame, rows[3], self.state.display().error_banner.as_deref());
        if self.state.show_keys_bar {
            draw_keys_bar(
                frame,
                rows[4],
                self.state.display(),
                &self.state.view.commands,
            );
        }

        self.toast.draw(frame, area);
        self.help_overlay.draw(frame, area, true, &self.state);
        self.modal.draw(frame, area, true, &self.state);
    }
}
