//! TrackPicker: popup listing the audio or subtitle tracks of the current
//! media. Choosing one sends the change, after which the view reloads.

use ratatui::crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use medusa_proto::protocol::Track;

use crate::{
    action::{Action, TrackKind},
    app_state::AppState,
    component::Component,
    dispatch::track_choices,
    theme::{style_default, style_selected_focused, C_OVERLAY_BG},
    widgets::{pane_chrome::pane_chrome, select_list::SelectList},
};

#[derive(Default)]
pub struct TrackPicker {
    kind: Option<TrackKind>,
    list: SelectList<Track>,
    /// Inner rect of the last drawn popup, for clicks.
    inner: Rect,
}

impl TrackPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.kind.is_some()
    }

    fn open(&mut self, kind: TrackKind, state: &AppState) {
        let tracks = match kind {
            TrackKind::Audio => &state.playing.audio_tracks,
            TrackKind::Subtitle => &state.playing.subtitle_tracks,
        };
        self.kind = Some(kind);
        self.list = SelectList::new(track_choices(tracks));
    }

    fn choose(&self) -> Vec<Action> {
        match (self.kind, self.list.selected_item()) {
            (Some(kind), Some(track)) => {
                vec![Action::CloseTracks, Action::Send(kind.command(track))]
            }
            _ => vec![],
        }
    }

    /// Popup rect: centered, sized to the list.
    pub fn popup_area(&self, area: Rect) -> Rect {
        let longest = self
            .list
            .items()
            .iter()
            .map(|t| t.label.chars().count())
            .max()
            .unwrap_or(0) as u16;
        let width = (longest + 8).clamp(24, area.width.saturating_sub(4).max(1));
        let height = (self.list.len() as u16 + 2).min(area.height.saturating_sub(2).max(3));
        Rect {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        }
    }
}

impl Component for TrackPicker {
    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        match key.code {
            KeyCode::Esc => vec![Action::CloseTracks],
            KeyCode::Up | KeyCode::Char('k') => {
                self.list.select_up(1);
                vec![]
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.list.select_down(1);
                vec![]
            }
            KeyCode::Enter => self.choose(),
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        if event.kind != MouseEventKind::Down(MouseButton::Left) {
            return vec![];
        }
        let inner = self.inner;
        let inside = event.column >= inner.x
            && event.column < inner.x + inner.width
            && event.row >= inner.y
            && event.row < inner.y + inner.height;
        if !inside {
            return vec![Action::CloseTracks];
        }
        if self.list.click((event.row - inner.y) as usize) {
            self.choose()
        } else {
            vec![]
        }
    }

    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action> {
        match action {
            Action::OpenTracks(kind) => self.open(*kind, state),
            Action::CloseTracks | Action::Navigate(_) | Action::SwitchMode(_) => self.kind = None,
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, _state: &AppState) {
        let Some(kind) = self.kind else {
            return;
        };
        let popup = self.popup_area(area);
        let block = pane_chrome(kind.label(), focused, None).style(Style::default().bg(C_OVERLAY_BG));
        self.inner = block.inner(popup);
        frame.render_widget(Clear, popup);
        frame.render_widget(block, popup);

        let height = self.inner.height as usize;
        self.list.ensure_visible(height);
        let selected = self.list.selected_index();
        let lines: Vec<Line> = self
            .list
            .visible(height)
            .map(|(i, track)| {
                let style = if i == selected {
                    style_selected_focused()
                } else {
                    style_default()
                };
                Line::from(Span::styled(format!(" {} ", track.label), style))
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), self.inner);
    }
}
