//! Key translation for the playing view.
//!
//! Arrow keys mean different things per mode: transport in basic mode, disc
//! menu navigation in navigation mode, nothing in advanced mode.

use medusa_proto::route::{Route, UiMode};
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::{Action, TrackKind};
use crate::dispatch::{Command, NavCode};

/// Map a key press on the playing view to an action, if it has one.
/// `track_options` is false for media without selectable tracks (music).
pub fn playing_action(key: &KeyEvent, mode: UiMode, track_options: bool) -> Option<Action> {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }

    let moded = match mode {
        UiMode::Basic => basic_key(key.code),
        UiMode::Navigation => navigation_key(key.code),
        UiMode::Advanced => advanced_key(key.code, track_options),
    };
    if moded.is_some() {
        return moded;
    }

    match key.code {
        KeyCode::Esc if mode != UiMode::Basic => Some(Action::SwitchMode(UiMode::Basic)),
        KeyCode::Char('m') => Some(Action::Send(Command::Mute)),
        KeyCode::Char('x') => Some(Action::Send(Command::Stop)),
        KeyCode::Char('b') => Some(Action::Navigate(Route::Browse)),
        KeyCode::Char('o') if mode != UiMode::Advanced => {
            Some(Action::SwitchMode(UiMode::Advanced))
        }
        KeyCode::Char('n') if mode != UiMode::Navigation => {
            Some(Action::SwitchMode(UiMode::Navigation))
        }
        _ => None,
    }
}

fn basic_key(code: KeyCode) -> Option<Action> {
    let command = match code {
        KeyCode::Char(' ') => Command::Pause,
        KeyCode::Left => Command::JumpBackward,
        KeyCode::Right => Command::JumpForward,
        KeyCode::Up => Command::VolumeUp,
        KeyCode::Down => Command::VolumeDown,
        _ => return None,
    };
    Some(Action::Send(command))
}

fn navigation_key(code: KeyCode) -> Option<Action> {
    let nav = match code {
        KeyCode::Enter => NavCode::Confirm,
        KeyCode::Up => NavCode::Up,
        KeyCode::Down => NavCode::Down,
        KeyCode::Left => NavCode::Left,
        KeyCode::Right => NavCode::Right,
        _ => return None,
    };
    Some(Action::Send(Command::Navigate(nav)))
}

fn advanced_key(code: KeyCode, track_options: bool) -> Option<Action> {
    if !track_options {
        return None;
    }
    match code {
        KeyCode::Char('a') => Some(Action::OpenTracks(TrackKind::Audio)),
        KeyCode::Char('s') => Some(Action::OpenTracks(TrackKind::Subtitle)),
        _ => None,
    }
}
