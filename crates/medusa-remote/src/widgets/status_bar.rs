//! Status bar: bottom line with connection state, mode, keybindings and the
//! last log line.

use medusa_proto::route::{Route, UiMode};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{
    C_ACCENT, C_MODE_ADVANCED, C_MODE_BASIC, C_MODE_NAVIGATION, C_MODE_SEARCH, C_MUTED,
    C_PLAYING, C_SECONDARY, C_SEPARATOR,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the search box; printable keys are text.
    Search,
}

/// Label and color of the mode badge.
fn badge(mode: InputMode, route: &Route) -> (&'static str, ratatui::style::Color) {
    if mode == InputMode::Search {
        return ("SEARCH", C_MODE_SEARCH);
    }
    match route {
        Route::Playing { mode, .. } => (
            mode.label(),
            match mode {
                UiMode::Basic => C_MODE_BASIC,
                UiMode::Advanced => C_MODE_ADVANCED,
                UiMode::Navigation => C_MODE_NAVIGATION,
            },
        ),
        Route::Browse => ("BROWSE", C_MODE_BASIC),
        Route::Landing => ("…", C_MODE_BASIC),
    }
}

pub fn key_hints(mode: InputMode, route: &Route) -> &'static str {
    match (mode, route) {
        (InputMode::Search, _) => " type to search  ↑↓ results  Enter choose snake  Esc stop typing",
        (_, Route::Playing { mode, .. }) => match mode {
            UiMode::Basic => {
                " Space pause  ←→ jump  ↑↓ volume  m mute  x stop  o advanced  n navigation  b browse  ? help  q quit"
            }
            UiMode::Advanced => {
                " a audio  s subtitles  m mute  x stop  Esc basic  b browse  ? help  q quit"
            }
            UiMode::Navigation => {
                " ↑↓←→ move  Enter select  m mute  x stop  Esc basic  b browse  ? help  q quit"
            }
        },
        _ => " / search  ↑↓ select  Enter choose snake  p now playing  r refresh index  ? help  q quit",
    }
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode, route: &Route) {
    let (label, color) = badge(mode, route);
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", label),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(key_hints(mode, route), Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw the log bar: connection bulb and last log line.
pub fn draw_log_bar(frame: &mut Frame, area: Rect, last_log: Option<&str>, connected: bool) {
    let conn_span = if connected {
        Span::styled("●", Style::default().fg(C_PLAYING))
    } else {
        Span::styled("○", Style::default().fg(C_ACCENT))
    };

    let log_span = Span::styled(last_log.unwrap_or(""), Style::default().fg(C_SECONDARY));

    let line = Line::from(vec![conn_span, Span::raw(" "), log_span]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw a horizontal separator line.
pub fn draw_separator(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(C_SEPARATOR),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_follow_the_mode() {
        let nav = Route::playing("tv", UiMode::Navigation);
        assert!(key_hints(InputMode::Normal, &nav).contains("Enter select"));
        assert!(key_hints(InputMode::Search, &nav).contains("type to search"));
        assert_eq!(badge(InputMode::Normal, &nav).0, "NAVIGATION");
        assert_eq!(badge(InputMode::Normal, &Route::Browse).0, "BROWSE");
    }
}
