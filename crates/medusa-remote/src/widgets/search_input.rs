//! SearchInput: tui-input line editor for the browse screen's search box.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{style_filter, C_MUTED};

#[derive(Debug, PartialEq, Eq)]
pub enum InputEvent {
    Changed(String),
    /// Enter: stop typing, keep the text.
    Confirmed,
    /// Esc: stop typing, keep the text.
    Left,
    None,
}

#[derive(Default)]
pub struct SearchInput {
    input: Input,
    active: bool,
}

impl SearchInput {
    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> InputEvent {
        match key.code {
            KeyCode::Esc => {
                self.active = false;
                InputEvent::Left
            }
            KeyCode::Enter => {
                self.active = false;
                InputEvent::Confirmed
            }
            _ => {
                let before = self.input.value().to_string();
                self.input.handle_event(&Event::Key(key));
                if self.input.value() == before {
                    InputEvent::None
                } else {
                    InputEvent::Changed(self.input.value().to_string())
                }
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        if area.width < 3 || area.height == 0 {
            return;
        }
        let width = area.width.saturating_sub(2) as usize;
        let scroll = self.input.visual_scroll(width);
        let value = self.input.value();
        let text = if value.is_empty() && !self.active {
            Span::styled("/ search the catalog", Style::default().fg(C_MUTED))
        } else {
            let shown: String = value.chars().skip(scroll).collect();
            Span::styled(format!("/ {}", shown), style_filter())
        };
        frame.render_widget(
            Paragraph::new(Line::from(text)).style(style_filter()),
            area,
        );

        if self.active {
            let cursor_x = area.x + 2 + (self.input.visual_cursor() - scroll) as u16;
            frame.set_cursor_position((cursor_x.min(area.x + area.width - 1), area.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_reports_changes_and_escape_keeps_text() {
        let mut input = SearchInput::default();
        input.activate();
        assert_eq!(
            input.handle_key(key(KeyCode::Char('a'))),
            InputEvent::Changed("a".into())
        );
        assert_eq!(
            input.handle_key(key(KeyCode::Char('l'))),
            InputEvent::Changed("al".into())
        );
        assert_eq!(input.handle_key(key(KeyCode::Esc)), InputEvent::Left);
        assert!(!input.is_active());
        assert_eq!(input.text(), "al");
    }
}
