//! AppState: shared read-only data passed to all components during render/event.
//!
//! Components read this, but never mutate it.
//! The App event-loop is the only thing that writes to AppState.

use medusa_proto::protocol::Track;
use medusa_proto::route::{Route, UiMode};

use crate::view::{MediaView, ViewBinder, ViewUpdate};
use crate::widgets::status_bar::InputMode;

/// How many log lines the log strip keeps.
pub const LOG_KEEP: usize = 200;

/// What the playing screen currently shows, as last reconciled.
#[derive(Debug, Clone)]
pub struct PlayingState {
    pub pause_label: &'static str,
    pub mute_label: &'static str,
    /// `None` until the first poll reports media, or after it clears.
    pub media: Option<MediaView>,
    pub audio_tracks: Vec<Track>,
    pub subtitle_tracks: Vec<Track>,
    pub progress: f64,
    /// `(elapsed, total)` text; keeps its last value while elapsed is NaN.
    pub clock: Option<(String, String)>,
    /// Last known total, in seconds, for progress-bar seeks.
    pub total_secs: f64,
}

impl Default for PlayingState {
    fn default() -> Self {
        Self {
            pause_label: "Pause",
            mute_label: "Mute",
            media: None,
            audio_tracks: Vec::new(),
            subtitle_tracks: Vec::new(),
            progress: 0.0,
            clock: None,
            total_secs: 0.0,
        }
    }
}

impl PlayingState {
    pub fn track_options(&self) -> bool {
        self.media.as_ref().map_or(true, |m| m.track_options)
    }

    pub fn navigation_options(&self) -> bool {
        self.media.as_ref().is_some_and(|m| m.navigation_options)
    }
}

/// Redirects are routed by the App, not stored here.
impl ViewBinder for PlayingState {
    fn apply(&mut self, update: ViewUpdate) {
        match update {
            ViewUpdate::Controls {
                pause_label,
                mute_label,
            } => {
                self.pause_label = pause_label;
                self.mute_label = mute_label;
            }
            ViewUpdate::Media(view) => self.media = Some(view),
            ViewUpdate::ClearMedia => self.media = None,
            ViewUpdate::Tracks { audio, subtitles } => {
                self.audio_tracks = audio;
                self.subtitle_tracks = subtitles;
            }
            ViewUpdate::Progress { fraction, total } => {
                self.progress = fraction;
                self.total_secs = total;
            }
            ViewUpdate::Clock { elapsed, total } => self.clock = Some((elapsed, total)),
            ViewUpdate::Redirect(_) => {}
        }
    }
}

/// Browse screen data.
#[derive(Debug, Clone, Default)]
pub struct BrowseState {
    /// Query the panel's results answer.
    pub query: String,
    pub searching: bool,
}

/// The full shared state of the application.
/// Components read this; only the App event-loop writes to it.
#[derive(Debug, Clone)]
pub struct AppState {
    pub route: Route,
    pub server: String,
    /// Whether the last poll reached the head.
    pub connected: bool,
    pub playing: PlayingState,
    pub browse: BrowseState,
    pub input_mode: InputMode,
    pub search_min_chars: usize,
    /// Recent log lines shown in the log strip (newest last).
    pub logs: Vec<String>,
}

impl AppState {
    pub fn new(route: Route, server: String, search_min_chars: usize) -> Self {
        Self {
            route,
            server,
            connected: false,
            playing: PlayingState::default(),
            browse: BrowseState::default(),
            input_mode: InputMode::Normal,
            search_min_chars,
            logs: Vec::new(),
        }
    }

    /// Mode of the playing view, if one is shown.
    pub fn mode(&self) -> Option<UiMode> {
        match &self.route {
            Route::Playing { mode, .. } => Some(*mode),
            _ => None,
        }
    }

    pub fn push_log(&mut self, line: String) {
        self.logs.push(line);
        if self.logs.len() > LOG_KEEP {
            let excess = self.logs.len() - LOG_KEEP;
            self.logs.drain(..excess);
        }
    }

    pub fn last_log(&self) -> Option<&str> {
        self.logs.last().map(String::as_str)
    }
}
