//! NowPlaying component: the playing screen.
//!
//! Rows: title + right column, subtitle, progress bar with clock, button row,
//! and in navigation mode a pad hint. Clicking the bar seeks (basic mode
//! only); clicking a button acts like its hotkey.

use medusa_proto::route::{Route, UiMode};
use ratatui::crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{
    action::{Action, TrackKind},
    app_state::AppState,
    component::Component,
    dispatch::{seek_target, Command},
    keymap::playing_action,
    theme::{style_link, style_muted, style_secondary, C_ACCENT, C_PRIMARY, C_SECONDARY},
    view::Linked,
    widgets::{
        pane_chrome::pane_chrome,
        progress_bar::{draw_progress, BarGeometry},
    },
};

/// A clickable label in the button row.
#[derive(Debug, Clone)]
struct Button {
    label: String,
    action: Action,
    area: Rect,
}

#[derive(Default)]
pub struct NowPlaying {
    bar: BarGeometry,
    buttons: Vec<Button>,
}

impl NowPlaying {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buttons offered in `mode`, in display order.
    fn button_set(state: &AppState, mode: UiMode) -> Vec<(String, Action)> {
        let playing = &state.playing;
        let mut set = vec![
            (playing.pause_label.to_string(), Action::Send(Command::Pause)),
            (playing.mute_label.to_string(), Action::Send(Command::Mute)),
            ("Stop".to_string(), Action::Send(Command::Stop)),
        ];
        match mode {
            UiMode::Basic => {
                if playing.track_options() {
                    set.push((
                        "Advanced Options".to_string(),
                        Action::SwitchMode(UiMode::Advanced),
                    ));
                }
                if playing.navigation_options() {
                    set.push((
                        "Navigation".to_string(),
                        Action::SwitchMode(UiMode::Navigation),
                    ));
                }
            }
            UiMode::Advanced => {
                if playing.track_options() {
                    set.push(("Audio".to_string(), Action::OpenTracks(TrackKind::Audio)));
                    set.push((
                        "Subtitles".to_string(),
                        Action::OpenTracks(TrackKind::Subtitle),
                    ));
                }
                set.push(("Basic Options".to_string(), Action::SwitchMode(UiMode::Basic)));
            }
            UiMode::Navigation => {
                set.push(("Basic Options".to_string(), Action::SwitchMode(UiMode::Basic)));
            }
        }
        set
    }

    fn draw_buttons(&mut self, frame: &mut Frame, area: Rect, state: &AppState, mode: UiMode) {
        self.buttons.clear();
        let mut spans = Vec::new();
        let mut x = area.x;
        for (label, action) in Self::button_set(state, mode) {
            let text = format!("[ {} ]", label);
            let width = text.width() as u16;
            if x + width > area.x + area.width {
                break;
            }
            self.buttons.push(Button {
                label: label.clone(),
                action,
                area: Rect {
                    x,
                    y: area.y,
                    width,
                    height: 1,
                },
            });
            spans.push(Span::styled(text, Style::default().fg(C_PRIMARY)));
            spans.push(Span::raw(" "));
            x += width + 1;
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

fn linked_span(linked: &Linked, base: Style) -> Span<'static> {
    match linked.href {
        Some(_) => Span::styled(linked.text.clone(), style_link()),
        None => Span::styled(linked.text.clone(), base),
    }
}

impl Component for NowPlaying {
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        let Some(mode) = state.mode() else {
            return vec![];
        };
        playing_action(&key, mode, state.playing.track_options())
            .into_iter()
            .collect()
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        if event.kind != MouseEventKind::Down(MouseButton::Left) {
            return vec![];
        }
        let (col, row) = (event.column, event.row);

        if state.mode() == Some(UiMode::Basic) {
            if let Some(offset) = self.bar.offset_of(col, row) {
                return seek_target(offset, self.bar.width, state.playing.total_secs)
                    .map(|secs| Action::Send(Command::JumpTo(secs)))
                    .into_iter()
                    .collect();
            }
        }

        self.buttons
            .iter()
            .find(|b| {
                row == b.area.y && col >= b.area.x && col < b.area.x + b.area.width
            })
            .map(|b| {
                tracing::trace!("button {:?} clicked", b.label);
                b.action.clone()
            })
            .into_iter()
            .collect()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let Route::Playing { session, mode } = &state.route else {
            return;
        };
        let block = pane_chrome(session, focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // title | right column
                Constraint::Length(1), // subtitle
                Constraint::Length(1),
                Constraint::Length(1), // progress
                Constraint::Length(1),
                Constraint::Length(1), // buttons
                Constraint::Length(1),
                Constraint::Min(0), // navigation pad
            ])
            .split(inner);

        let playing = &state.playing;
        match &playing.media {
            Some(media) => {
                let title_style = Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD);
                let right_w = media
                    .right
                    .as_ref()
                    .map_or(0, |r| r.text.width() as u16 + 1);
                let cols = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Min(0), Constraint::Length(right_w)])
                    .split(rows[0]);
                frame.render_widget(
                    Paragraph::new(Line::from(linked_span(&media.title, title_style))),
                    cols[0],
                );
                if let Some(right) = &media.right {
                    frame.render_widget(
                        Paragraph::new(Line::from(linked_span(right, style_secondary())))
                            .alignment(Alignment::Right),
                        cols[1],
                    );
                }
                if let Some(subtitle) = &media.subtitle {
                    frame.render_widget(
                        Paragraph::new(Line::from(linked_span(subtitle, style_secondary()))),
                        rows[1],
                    );
                }
            }
            None => {
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        format!("nothing loaded on {}", session),
                        style_muted(),
                    )),
                    rows[0],
                );
            }
        }

        let clock = playing
            .clock
            .as_ref()
            .map(|(elapsed, total)| (elapsed.as_str(), total.as_str()));
        self.bar = draw_progress(frame, rows[3], playing.progress, clock);
        if *mode != UiMode::Basic {
            // Seeking is a basic-mode control.
            self.bar = BarGeometry::default();
        }

        self.draw_buttons(frame, rows[5], state, *mode);

        if *mode == UiMode::Navigation {
            let pad = vec![
                Line::from(Span::styled("        ↑", Style::default().fg(C_ACCENT))),
                Line::from(vec![
                    Span::styled("    ←  ", Style::default().fg(C_ACCENT)),
                    Span::styled("Enter", Style::default().fg(C_PRIMARY)),
                    Span::styled("  →", Style::default().fg(C_ACCENT)),
                ]),
                Line::from(Span::styled("        ↓", Style::default().fg(C_ACCENT))),
                Line::from(Span::styled(
                    " disc menu navigation",
                    Style::default().fg(C_SECONDARY),
                )),
            ];
            frame.render_widget(Paragraph::new(pad), rows[7]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{MediaView, ViewBinder, ViewUpdate};

    fn state(mode: UiMode) -> AppState {
        AppState::new(Route::playing("lounge", mode), "http://head".into(), 2)
    }

    #[test]
    fn music_offers_no_advanced_options() {
        let mut s = state(UiMode::Basic);
        s.playing.apply(ViewUpdate::Media(MediaView {
            track_options: false,
            ..Default::default()
        }));
        let labels: Vec<String> = NowPlaying::button_set(&s, UiMode::Basic)
            .into_iter()
            .map(|(l, _)| l)
            .collect();
        assert_eq!(labels, vec!["Pause", "Mute", "Stop"]);
    }

    #[test]
    fn disc_offers_navigation_and_labels_follow_state() {
        let mut s = state(UiMode::Basic);
        s.playing.apply(ViewUpdate::Controls {
            pause_label: "Resume",
            mute_label: "Unmute",
        });
        s.playing.apply(ViewUpdate::Media(MediaView {
            track_options: true,
            navigation_options: true,
            ..Default::default()
        }));
        let set = NowPlaying::button_set(&s, UiMode::Basic);
        assert_eq!(set[0].0, "Resume");
        assert_eq!(set[1].0, "Unmute");
        assert!(set
            .iter()
            .any(|(_, a)| *a == Action::SwitchMode(UiMode::Navigation)));
    }

    #[test]
    fn bar_click_seeks_in_basic_mode_only() {
        let mut np = NowPlaying::new();
        np.bar = BarGeometry {
            x: 10,
            y: 4,
            width: 100,
        };
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 60,
            row: 4,
            modifiers: ratatui::crossterm::event::KeyModifiers::NONE,
        };
        let mut s = state(UiMode::Basic);
        s.playing.total_secs = 200.0;
        assert_eq!(
            np.handle_mouse(click, Rect::default(), &s),
            vec![Action::Send(Command::JumpTo(100))]
        );

        s.playing.total_secs = 0.0;
        assert!(np.handle_mouse(click, Rect::default(), &s).is_empty());

        let mut adv = state(UiMode::Advanced);
        adv.playing.total_secs = 200.0;
        assert!(np.handle_mouse(click, Rect::default(), &adv).is_empty());
    }
}
