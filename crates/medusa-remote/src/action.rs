//! Action enum: all user-initiated intents and internal events.

use medusa_proto::protocol::{SearchHit, Track};
use medusa_proto::route::{Route, UiMode};

use crate::dispatch::Command;

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    NowPlaying,
    TrackPicker,
    SearchPanel,
    SnakePicker,
    HelpOverlay,
}

/// Which track list a picker is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Subtitle,
}

impl TrackKind {
    pub fn command(self, track: &Track) -> Command {
        match self {
            TrackKind::Audio => Command::Audio(track.id),
            TrackKind::Subtitle => Command::Subtitle(track.id),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrackKind::Audio => "audio",
            TrackKind::Subtitle => "subtitles",
        }
    }
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Transport ────────────────────────────────────────────────────────────
    /// Send with the command's default post-condition.
    Send(Command),

    // ── Navigation ───────────────────────────────────────────────────────────
    Navigate(Route),
    SwitchMode(UiMode),

    // ── Playing view ─────────────────────────────────────────────────────────
    OpenTracks(TrackKind),
    CloseTracks,

    // ── Browse ───────────────────────────────────────────────────────────────
    SearchChanged(String),
    /// Pick a snake for this hit.
    ChooseSnake(SearchHit),
    CloseSnakePicker,
    StartOn {
        snake: String,
        media: String,
        queue: bool,
    },
    RefreshIndex,

    // ── System ───────────────────────────────────────────────────────────────
    ToggleHelp,
    ToggleLogs,
    Quit,
    Resize(u16, u16),
}
