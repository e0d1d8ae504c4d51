//! SnakePicker: popup asking which snake should play (or queue) a search hit.

use ratatui::crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use medusa_proto::protocol::SearchHit;

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    theme::{style_default, style_muted, style_selected_focused, C_OVERLAY_BG, C_PRIMARY},
    widgets::{pane_chrome::pane_chrome, select_list::SelectList},
};

#[derive(Default)]
pub struct SnakePicker {
    hit: Option<SearchHit>,
    snakes: SelectList<String>,
    rows_area: Rect,
}

impl SnakePicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.hit.is_some()
    }

    pub fn set_snakes(&mut self, snakes: Vec<String>) {
        self.snakes.set_items(snakes);
    }

    fn start(&self, queue: bool) -> Vec<Action> {
        match (&self.hit, self.snakes.selected_item()) {
            (Some(hit), Some(snake)) => vec![
                Action::CloseSnakePicker,
                Action::StartOn {
                    snake: snake.clone(),
                    media: hit.id.to_string(),
                    queue,
                },
            ],
            _ => vec![],
        }
    }

    pub fn popup_area(area: Rect) -> Rect {
        let width = area.width.saturating_sub(4).min(50);
        let height = area.height.saturating_sub(2).min(14);
        Rect {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        }
    }
}

impl Component for SnakePicker {
    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        match key.code {
            KeyCode::Esc => vec![Action::CloseSnakePicker],
            KeyCode::Up | KeyCode::Char('k') => {
                self.snakes.select_up(1);
                vec![]
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.snakes.select_down(1);
                vec![]
            }
            KeyCode::Enter | KeyCode::Char('p') => self.start(false),
            KeyCode::Char('a') => self.start(true),
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        if event.kind != MouseEventKind::Down(MouseButton::Left) {
            return vec![];
        }
        let rows = self.rows_area;
        if event.row < rows.y || event.row >= rows.y + rows.height {
            return vec![];
        }
        if self.snakes.click((event.row - rows.y) as usize) {
            self.start(false)
        } else {
            vec![]
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        match action {
            Action::ChooseSnake(hit) => {
                self.hit = Some(hit.clone());
                self.snakes.select_first();
            }
            Action::CloseSnakePicker | Action::Navigate(_) => self.hit = None,
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, _state: &AppState) {
        let Some(hit) = &self.hit else {
            return;
        };
        let popup = Self::popup_area(area);
        let block = pane_chrome("play on", focused, None).style(Style::default().bg(C_OVERLAY_BG));
        let inner = block.inner(popup);
        frame.render_widget(Clear, popup);
        frame.render_widget(block, popup);

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" {}", hit.display_name()),
                Style::default().fg(C_PRIMARY),
            )),
            parts[0],
        );
        frame.render_widget(
            Paragraph::new(Span::styled(
                " Enter play  a add to queue  Esc cancel",
                style_muted(),
            )),
            parts[2],
        );

        self.rows_area = parts[1];
        if self.snakes.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(" no snakes connected", style_muted())),
                parts[1],
            );
            return;
        }
        let height = parts[1].height as usize;
        self.snakes.ensure_visible(height);
        let selected = self.snakes.selected_index();
        let lines: Vec<Line> = self
            .snakes
            .visible(height)
            .map(|(i, name)| {
                let style = if i == selected {
                    style_selected_focused()
                } else {
                    style_default()
                };
                Line::from(Span::styled(format!("  {} ", name), style))
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), parts[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medusa_proto::protocol::MediaMetadata;
    use medusa_proto::route::Route;
    use ratatui::crossterm::event::KeyModifiers;

    #[test]
    fn play_and_queue_on_selected_snake() {
        let s = AppState::new(Route::Browse, "h".into(), 2);
        let hit = SearchHit {
            id: 42,
            metadata: MediaMetadata::Music {
                artist: "Low".into(),
                album: "Things We Lost in the Fire".into(),
                track: "Sunflower".into(),
            },
        };
        let mut picker = SnakePicker::new();
        picker.set_snakes(vec!["lounge".into(), "bedroom".into()]);
        picker.on_action(&Action::ChooseSnake(hit), &s);
        assert!(picker.is_open());

        picker.handle_key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE), &s);
        assert_eq!(
            picker.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE), &s),
            vec![
                Action::CloseSnakePicker,
                Action::StartOn {
                    snake: "bedroom".into(),
                    media: "42".into(),
                    queue: true,
                },
            ]
        );
    }

    #[test]
    fn nothing_to_start_without_snakes() {
        let s = AppState::new(Route::Browse, "h".into(), 2);
        let mut picker = SnakePicker::new();
        picker.on_action(
            &Action::ChooseSnake(SearchHit {
                id: 1,
                metadata: MediaMetadata::Film {
                    title: "Heat".into(),
                    genres: vec![],
                    year: Some(1995),
                },
            }),
            &s,
        );
        assert!(picker
            .handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), &s)
            .is_empty());
    }
}
