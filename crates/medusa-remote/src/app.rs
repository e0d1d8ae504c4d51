//! App: component-based event loop.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (shared read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background tasks:
//!   terminal input, the poller's view updates, and answers to spawned requests.
//! - The event loop draws each frame, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action.
//! - Every page change bumps a generation counter. Messages stamped with an
//!   older generation belong to a page that is gone and are dropped.

use std::io;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use medusa_proto::config::Config;
use medusa_proto::protocol::SearchHit;
use medusa_proto::route::Route;

use crate::{
    action::{Action, ComponentId},
    app_state::{AppState, PlayingState},
    component::Component,
    components::{
        help_overlay::HelpOverlay, now_playing::NowPlaying, search_panel::SearchPanel,
        snake_picker::SnakePicker, track_picker::TrackPicker,
    },
    dispatch::{start_on, Command, Dispatcher, PostCondition},
    poller::{spawn_poller, PollerHandle},
    reconcile::{Reconciler, RetryPolicy},
    theme::{style_muted, style_secondary, C_BG},
    transport::{Ack, MedusaClient, TransportError},
    view::{ChannelView, ViewBinder, ViewEvent, ViewUpdate},
    widgets::{
        pane_chrome::pane_chrome,
        status_bar::{self, InputMode},
        toast::{Severity, ToastManager},
    },
};

/// Rows of the log strip when shown.
const LOG_STRIP_H: u16 = 8;

// ── Internal event bus ────────────────────────────────────────────────────────

pub enum AppMessage {
    Event(Event),
    /// Display change from the poller of some generation.
    View(ViewEvent),
    /// A spawned dispatch or landing lookup decided where to go.
    Routed {
        generation: u64,
        route: Option<Route>,
    },
    /// Outcome of a play or queue request from the snake chooser.
    Started {
        generation: u64,
        snake: String,
        queue: bool,
        route: Option<Route>,
    },
    SearchResults {
        query: String,
        result: Result<Vec<SearchHit>, TransportError>,
    },
    Snakes(Result<Vec<String>, TransportError>),
    IndexRefreshed(Result<Ack, TransportError>),
    Log(String),
}

impl From<ViewEvent> for AppMessage {
    fn from(event: ViewEvent) -> Self {
        AppMessage::View(event)
    }
}

// ── Pane area tracking ────────────────────────────────────────────────────────

/// Last-drawn layout rects, for mouse hit-testing.
#[derive(Default, Clone)]
struct PaneAreas {
    body: Rect,
    log_strip: Rect,
}

fn hit(r: Rect, col: u16, row: u16) -> bool {
    r.width > 0
        && r.height > 0
        && col >= r.x
        && col < r.x + r.width
        && row >= r.y
        && row < r.y + r.height
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    // ── Shared state (passed read-only to components) ─────────────────────────
    pub state: AppState,

    // ── Components ────────────────────────────────────────────────────────────
    now_playing: NowPlaying,
    track_picker: TrackPicker,
    search_panel: SearchPanel,
    snake_picker: SnakePicker,
    help_overlay: HelpOverlay,

    // ── Head connection ───────────────────────────────────────────────────────
    client: MedusaClient,
    config: Config,
    /// Current page generation; bumped by every navigation.
    generation: u64,
    /// Poller of the playing page, if one is shown.
    poller: Option<PollerHandle>,
    /// Last query handed to the head; older answers are ignored.
    pending_query: String,

    tx: mpsc::Sender<AppMessage>,
    rx: Option<mpsc::Receiver<AppMessage>>,

    show_logs: bool,
    should_quit: bool,
    pane_areas: PaneAreas,
    toast: ToastManager,
}

impl App {
    pub fn new(config: Config, client: MedusaClient, route: Route) -> Self {
        let (tx, rx) = mpsc::channel::<AppMessage>(1024);
        let state = AppState::new(
            route,
            config.server.base_url.clone(),
            config.ui.search_min_chars,
        );
        Self {
            state,
            now_playing: NowPlaying::new(),
            track_picker: TrackPicker::new(),
            search_panel: SearchPanel::new(),
            snake_picker: SnakePicker::new(),
            help_overlay: HelpOverlay::new(),
            client,
            config,
            generation: 0,
            poller: None,
            pending_query: String::new(),
            tx,
            rx: Some(rx),
            show_logs: false,
            should_quit: false,
            pane_areas: PaneAreas::default(),
            toast: ToastManager::new(),
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let Some(mut rx) = self.rx.take() else {
            anyhow::bail!("app event loop already ran");
        };

        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        self.push_log(format!("medusa remote for {}", self.state.server));
        let initial = self.state.route.clone();
        self.navigate(initial);

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = self.tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // Toast expiry check + spinner animation.
        let mut toast_tick = tokio::time::interval(Duration::from_millis(100));
        toast_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    const MAX_DRAIN: usize = 256;
                    let mut redraw = self.handle_message(msg).await;
                    let mut drained = 0usize;
                    while drained < MAX_DRAIN {
                        let Ok(next) = rx.try_recv() else { break };
                        drained += 1;
                        redraw |= self.handle_message(next).await;
                    }
                    needs_redraw = redraw;
                }

                _ = toast_tick.tick() => {
                    let had_toasts = !self.toast.is_empty();
                    self.toast.tick();
                    let tick_actions: Vec<Action> = {
                        let s = &self.state;
                        let mut all = Vec::new();
                        all.extend(self.now_playing.tick(s));
                        all.extend(self.search_panel.tick(s));
                        all
                    };
                    needs_redraw = had_toasts || !tick_actions.is_empty();
                    for action in tick_actions {
                        self.dispatch(action).await;
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        if let Some(poller) = self.poller.take() {
            poller.shutdown().await;
        }
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        Ok(())
    }

    // ── Message handling ──────────────────────────────────────────────────────

    /// Returns whether the screen needs a redraw.
    async fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(ev) => match ev {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        return false;
                    }
                    let actions = self.handle_key(key);
                    for a in actions {
                        self.dispatch(a).await;
                    }
                    self.sync_input_mode();
                }
                Event::Mouse(mouse) => {
                    if matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) {
                        return false;
                    }
                    let actions = self.handle_mouse(mouse);
                    for a in actions {
                        self.dispatch(a).await;
                    }
                    self.sync_input_mode();
                }
                Event::Resize(w, h) => {
                    self.dispatch(Action::Resize(w, h)).await;
                }
                _ => return false,
            },

            AppMessage::View(ViewEvent { generation, update }) => {
                if generation != self.generation {
                    trace!("dropping update from generation {}: {:?}", generation, update);
                    return false;
                }
                self.state.connected = true;
                match update {
                    ViewUpdate::Redirect(route) => {
                        self.push_log(format!("session ended, going to {}", route));
                        self.dispatch(Action::Navigate(route)).await;
                    }
                    update => self.state.playing.apply(update),
                }
            }

            AppMessage::Routed { generation, route } => {
                if generation != self.generation {
                    debug!("ignoring route from generation {}", generation);
                    return false;
                }
                if let Some(route) = route {
                    self.dispatch(Action::Navigate(route)).await;
                }
            }

            AppMessage::Started {
                generation,
                snake,
                queue,
                route,
            } => {
                match (&route, queue) {
                    (None, _) => self.toast.warning(format!("{} did not answer", snake)),
                    (Some(_), true) => self.toast.success(format!("queued on {}", snake)),
                    (Some(_), false) => self.toast.success(format!("playing on {}", snake)),
                }
                // Queueing leaves the browse page as it is.
                if !queue && generation == self.generation {
                    if let Some(route) = route {
                        self.dispatch(Action::Navigate(route)).await;
                    }
                }
            }

            AppMessage::SearchResults { query, result } => {
                if query != self.pending_query {
                    trace!("dropping results for stale query {:?}", query);
                    return false;
                }
                self.state.browse.searching = false;
                match result {
                    Ok(hits) => {
                        self.state.connected = true;
                        debug!("{} hits for {:?}", hits.len(), query);
                        self.search_panel.set_results(hits);
                        self.state.browse.query = query;
                    }
                    Err(e) => {
                        self.state.connected = false;
                        self.push_log(format!("search failed: {}", e));
                    }
                }
            }

            AppMessage::Snakes(result) => match result {
                Ok(snakes) => {
                    self.state.connected = true;
                    self.snake_picker.set_snakes(snakes);
                }
                Err(e) => {
                    self.state.connected = false;
                    self.push_log(format!("snake list unavailable: {}", e));
                }
            },

            AppMessage::IndexRefreshed(result) => match result {
                Ok(Ack::Ok) => self
                    .toast
                    .resolve_spinner(Severity::Success, "media index refreshed"),
                Ok(other) => self.toast.resolve_spinner(
                    Severity::Warning,
                    format!("index refresh answered {:?}", other),
                ),
                Err(e) => {
                    self.toast
                        .resolve_spinner(Severity::Warning, "index refresh failed");
                    self.push_log(format!("index refresh failed: {}", e));
                }
            },

            AppMessage::Log(msg) => self.push_log(msg),
        }
        true
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        let typing = self.state.input_mode == InputMode::Search;

        // Global keys
        match key.code {
            KeyCode::Char('c') if key.modifiers == KeyModifiers::CONTROL => {
                return vec![Action::Quit];
            }
            KeyCode::Char('q') if key.modifiers == KeyModifiers::NONE && !typing => {
                return vec![Action::Quit];
            }
            KeyCode::Char('?') if !typing && !self.help_overlay.visible => {
                return vec![Action::ToggleHelp];
            }
            KeyCode::Char('L') if !typing && !self.help_overlay.visible => {
                return vec![Action::ToggleLogs];
            }
            _ => {}
        }

        let s = &self.state;
        match self.focus() {
            Some(ComponentId::HelpOverlay) => self.help_overlay.handle_key(key, s),
            Some(ComponentId::TrackPicker) => self.track_picker.handle_key(key, s),
            Some(ComponentId::SnakePicker) => self.snake_picker.handle_key(key, s),
            Some(ComponentId::NowPlaying) => self.now_playing.handle_key(key, s),
            Some(ComponentId::SearchPanel) => self.search_panel.handle_key(key, s),
            None => vec![],
        }
    }

    /// The component receiving input: the topmost open overlay, else the
    /// current route's screen.
    fn focus(&self) -> Option<ComponentId> {
        if self.help_overlay.visible {
            Some(ComponentId::HelpOverlay)
        } else if self.track_picker.is_open() {
            Some(ComponentId::TrackPicker)
        } else if self.snake_picker.is_open() {
            Some(ComponentId::SnakePicker)
        } else {
            match self.state.route {
                Route::Playing { .. } => Some(ComponentId::NowPlaying),
                Route::Browse => Some(ComponentId::SearchPanel),
                Route::Landing => None,
            }
        }
    }

    // ── Mouse handling ────────────────────────────────────────────────────────

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        let (col, row) = (event.column, event.row);
        let s = &self.state;

        let body = self.pane_areas.body;
        let focus = self.focus();
        match focus {
            Some(ComponentId::HelpOverlay) => {
                return match event.kind {
                    MouseEventKind::Down(MouseButton::Left) => vec![Action::ToggleHelp],
                    _ => vec![],
                };
            }
            Some(ComponentId::TrackPicker) => {
                return self.track_picker.handle_mouse(event, body, s);
            }
            Some(ComponentId::SnakePicker) => {
                return self.snake_picker.handle_mouse(event, body, s);
            }
            _ => {}
        }
        if !hit(body, col, row) {
            if hit(self.pane_areas.log_strip, col, row)
                && event.kind == MouseEventKind::Down(MouseButton::Left)
            {
                return vec![Action::ToggleLogs];
            }
            return vec![];
        }

        match focus {
            Some(ComponentId::NowPlaying) => self.now_playing.handle_mouse(event, body, s),
            Some(ComponentId::SearchPanel) => self.search_panel.handle_mouse(event, body, s),
            _ => vec![],
        }
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    async fn dispatch(&mut self, action: Action) {
        // Broadcast to all components first so overlays can open and close.
        let secondary: Vec<Action> = {
            let s = &self.state;
            let mut out = Vec::new();
            out.extend(self.now_playing.on_action(&action, s));
            out.extend(self.track_picker.on_action(&action, s));
            out.extend(self.search_panel.on_action(&action, s));
            out.extend(self.snake_picker.on_action(&action, s));
            out.extend(self.help_overlay.on_action(&action, s));
            out
        };

        self.apply_action(action).await;

        // Secondary actions, depth-limited to 1 level.
        for a in secondary {
            self.apply_action(a).await;
        }
    }

    async fn apply_action(&mut self, action: Action) {
        match &action {
            Action::Resize(..) => {}
            _ => debug!("apply_action: {:?}", action),
        }
        match action {
            // ── Transport ─────────────────────────────────────────────────────
            Action::Send(command) => {
                let post = command.default_post_condition();
                self.send(command, post);
            }

            // ── Navigation ────────────────────────────────────────────────────
            Action::Navigate(route) => self.navigate(route),
            Action::SwitchMode(mode) => {
                if self.state.mode() != Some(mode) {
                    let route = self.state.route.with_mode(mode);
                    self.navigate(route);
                }
            }

            // ── Browse ────────────────────────────────────────────────────────
            Action::SearchChanged(query) => self.search(query),
            Action::ChooseSnake(hit) => {
                debug!("choosing a snake for media {}", hit.id);
                let client = self.client.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = client.list_snakes(false).await;
                    let _ = tx.send(AppMessage::Snakes(result)).await;
                });
            }
            Action::StartOn { snake, media, queue } => {
                let verb = if queue { "queueing" } else { "starting" };
                self.push_log(format!("{} media {} on {}", verb, media, snake));
                let client = self.client.clone();
                let tx = self.tx.clone();
                let generation = self.generation;
                tokio::spawn(async move {
                    let route = start_on(&client, &snake, media, queue).await;
                    let _ = tx
                        .send(AppMessage::Started {
                            generation,
                            snake,
                            queue,
                            route,
                        })
                        .await;
                });
            }
            Action::RefreshIndex => {
                self.toast.spinner("refreshing media index");
                let client = self.client.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = client.refresh_index().await;
                    let _ = tx.send(AppMessage::IndexRefreshed(result)).await;
                });
            }

            // ── System ────────────────────────────────────────────────────────
            Action::ToggleLogs => self.show_logs = !self.show_logs,
            Action::Quit => self.should_quit = true,

            // Handled by the components themselves.
            Action::OpenTracks(_)
            | Action::CloseTracks
            | Action::CloseSnakePicker
            | Action::ToggleHelp
            | Action::Resize(..) => {}
        }
    }

    /// Send a command for the shown session; the resulting route comes back
    /// through the channel.
    fn send(&mut self, command: Command, post: PostCondition) {
        if self.state.route.session().is_none() {
            debug!("{} ignored outside a playing view", command.action());
            return;
        }
        self.push_log(format!("sent {}", command.action()));
        let dispatcher = Dispatcher::new(self.client.clone(), self.state.route.clone());
        let tx = self.tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let route = dispatcher.dispatch(command, post).await;
            let _ = tx.send(AppMessage::Routed { generation, route }).await;
        });
    }

    fn search(&mut self, query: String) {
        self.pending_query = query.clone();
        if query.chars().count() < self.state.search_min_chars {
            self.state.browse.searching = false;
            self.search_panel.set_results(Vec::new());
            return;
        }
        self.state.browse.searching = true;
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.search(&query).await;
            let _ = tx.send(AppMessage::SearchResults { query, result }).await;
        });
    }

    /// Leave the current page for `route`. The old poller is cancelled and
    /// the playing view starts from a fresh session.
    fn navigate(&mut self, route: Route) {
        if let Some(poller) = self.poller.take() {
            poller.cancel();
        }
        self.generation += 1;
        self.state.playing = PlayingState::default();
        info!("navigating to {} (generation {})", route, self.generation);
        self.state.route = route.clone();

        match route {
            Route::Playing { session, .. } => {
                let view = ChannelView::new(self.generation, self.tx.clone());
                let engine = Reconciler::new(RetryPolicy::from(&self.config.polling));
                let interval = Duration::from_millis(self.config.polling.interval_ms.max(1));
                self.poller = Some(spawn_poller(
                    self.client.clone(),
                    session,
                    engine,
                    view,
                    interval,
                ));
            }
            Route::Landing => {
                let client = self.client.clone();
                let tx = self.tx.clone();
                let generation = self.generation;
                let mode = self.config.ui.default_mode;
                tokio::spawn(async move {
                    let route = match client.list_snakes(true).await {
                        Ok(snakes) => match snakes.into_iter().next() {
                            Some(snake) => Route::playing(snake, mode),
                            None => Route::Browse,
                        },
                        Err(e) => {
                            warn!("landing lookup failed: {}", e);
                            let _ = tx
                                .send(AppMessage::Log(format!("head unreachable: {}", e)))
                                .await;
                            Route::Browse
                        }
                    };
                    let _ = tx
                        .send(AppMessage::Routed {
                            generation,
                            route: Some(route),
                        })
                        .await;
                });
            }
            Route::Browse => {}
        }
    }

    // ── Draw ──────────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        // ── Outer layout: body | (log strip) | separator | log bar | keys bar
        let log_h = if self.show_logs { LOG_STRIP_H } else { 0 };
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(log_h),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);
        let body = outer[0];
        self.pane_areas.body = body;
        self.pane_areas.log_strip = outer[1];

        match &self.state.route {
            Route::Playing { .. } => {
                let focused = self.focus() == Some(ComponentId::NowPlaying);
                self.now_playing.draw(frame, body, focused, &self.state)
            }
            Route::Browse => {
                let focused = self.focus() == Some(ComponentId::SearchPanel);
                self.search_panel.draw(frame, body, focused, &self.state)
            }
            Route::Landing => {
                let block = pane_chrome("medusa", false, None);
                let inner = block.inner(body);
                frame.render_widget(block, body);
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        format!(" looking for a playing snake on {}…", self.state.server),
                        style_muted(),
                    )),
                    inner,
                );
            }
        }
        self.track_picker.draw(frame, body, true, &self.state);
        self.snake_picker.draw(frame, body, true, &self.state);

        if self.show_logs {
            self.draw_log_strip(frame, outer[1]);
        }
        status_bar::draw_separator(frame, outer[2]);
        status_bar::draw_log_bar(frame, outer[3], self.state.last_log(), self.state.connected);
        status_bar::draw_keys_bar(frame, outer[4], self.state.input_mode, &self.state.route);

        // ── Help overlay (on top of everything) ──────────────────────────────
        self.help_overlay.draw(frame, area, false, &self.state);

        // ── Toast notifications (topmost layer) ──────────────────────────────
        self.toast.draw(frame, area);
    }

    fn draw_log_strip(&self, frame: &mut ratatui::Frame, area: Rect) {
        let block = pane_chrome("log", false, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let rows = inner.height as usize;
        let skip = self.state.logs.len().saturating_sub(rows);
        let lines: Vec<Line> = self.state.logs[skip..]
            .iter()
            .map(|l| Line::from(Span::styled(format!(" {}", l), style_secondary())))
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn push_log(&mut self, msg: String) {
        info!("{}", msg);
        self.state.push_log(msg);
    }

    fn sync_input_mode(&mut self) {
        let typing =
            matches!(self.state.route, Route::Browse) && self.search_panel.is_typing();
        self.state.input_mode = if typing {
            InputMode::Search
        } else {
            InputMode::Normal
        };
    }
}
