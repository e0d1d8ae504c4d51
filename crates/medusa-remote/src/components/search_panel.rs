//! SearchPanel: the browse screen, a search box over the catalog and the
//! hits of the last search. Searching starts once the query is long enough.

use ratatui::crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use medusa_proto::protocol::{MediaMetadata, SearchHit};
use medusa_proto::route::Route;

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    theme::{style_default, style_muted, style_selected_focused, C_SECONDARY},
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        search_input::{InputEvent, SearchInput},
        select_list::SelectList,
    },
};

#[derive(Default)]
pub struct SearchPanel {
    input: SearchInput,
    list: SelectList<SearchHit>,
    /// Rect the result rows were last drawn into.
    rows_area: Rect,
}

fn category(hit: &SearchHit) -> &str {
    match &hit.metadata {
        MediaMetadata::Film { .. } => "film",
        MediaMetadata::Television { .. } => "tv",
        MediaMetadata::Music { .. } => "music",
        MediaMetadata::Other { category, .. } => category,
    }
}

impl SearchPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_typing(&self) -> bool {
        self.input.is_active()
    }

    pub fn set_results(&mut self, hits: Vec<SearchHit>) {
        self.list.set_items(hits);
        self.list.select_first();
    }

    fn choose(&self) -> Vec<Action> {
        self.list
            .selected_item()
            .map(|hit| Action::ChooseSnake(hit.clone()))
            .into_iter()
            .collect()
    }
}

impl Component for SearchPanel {
    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        // Result navigation works while typing too.
        match key.code {
            KeyCode::Up => {
                self.list.select_up(1);
                return vec![];
            }
            KeyCode::Down => {
                self.list.select_down(1);
                return vec![];
            }
            KeyCode::PageUp => {
                self.list.select_up(10);
                return vec![];
            }
            KeyCode::PageDown => {
                self.list.select_down(10);
                return vec![];
            }
            _ => {}
        }

        if self.input.is_active() {
            return match self.input.handle_key(key) {
                InputEvent::Changed(text) => vec![Action::SearchChanged(text)],
                InputEvent::Confirmed => self.choose(),
                InputEvent::Left | InputEvent::None => vec![],
            };
        }

        match key.code {
            KeyCode::Char('/') => {
                self.input.activate();
                vec![]
            }
            KeyCode::Char('k') => {
                self.list.select_up(1);
                vec![]
            }
            KeyCode::Char('j') => {
                self.list.select_down(1);
                vec![]
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.list.select_first();
                vec![]
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.list.select_last();
                vec![]
            }
            KeyCode::Enter => self.choose(),
            KeyCode::Char('r') => vec![Action::RefreshIndex],
            KeyCode::Char('p') => vec![Action::Navigate(Route::Landing)],
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::ScrollUp => {
                self.list.select_up(1);
                vec![]
            }
            MouseEventKind::ScrollDown => {
                self.list.select_down(1);
                vec![]
            }
            MouseEventKind::Down(MouseButton::Left) => {
                let rows = self.rows_area;
                if event.row < rows.y || event.row >= rows.y + rows.height {
                    self.input.activate();
                    return vec![];
                }
                if self.list.click((event.row - rows.y) as usize) {
                    self.choose()
                } else {
                    vec![]
                }
            }
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let count = format!("{} hits", self.list.len());
        let badge = (!self.list.is_empty()).then(|| Badge {
            text: &count,
            color: C_SECONDARY,
        });
        let block = pane_chrome("browse", focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);
        self.input.draw(frame, parts[0]);
        self.rows_area = parts[2];

        let query = self.input.text();
        let browse = &state.browse;
        let note = if query.chars().count() < state.search_min_chars {
            Some(format!(
                "type at least {} characters to search",
                state.search_min_chars
            ))
        } else if browse.searching {
            Some("searching…".to_string())
        } else if self.list.is_empty() && browse.query == query {
            Some(format!("nothing matches {:?}", query))
        } else {
            None
        };
        if let Some(note) = note {
            frame.render_widget(Paragraph::new(Span::styled(note, style_muted())), parts[1]);
        }

        let height = parts[2].height as usize;
        self.list.ensure_visible(height);
        let selected = self.list.selected_index();
        let lines: Vec<Line> = self
            .list
            .visible(height)
            .map(|(i, hit)| {
                let style = if i == selected {
                    style_selected_focused()
                } else {
                    style_default()
                };
                Line::from(vec![
                    Span::styled(format!(" {:<6}", category(hit)), style_muted()),
                    Span::styled(hit.display_name(), style),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), parts[2]);
    }
}
