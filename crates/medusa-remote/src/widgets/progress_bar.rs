//! Smooth Unicode progress bar widget.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{C_MUTED, C_PLAYING, C_SECONDARY};

const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Where the bar itself landed inside `area`, so clicks can be mapped to
/// positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BarGeometry {
    pub x: u16,
    pub y: u16,
    pub width: u16,
}

impl BarGeometry {
    /// Column offset of `col` into the bar, if `(col, row)` hits it.
    pub fn offset_of(&self, col: u16, row: u16) -> Option<u16> {
        if self.width == 0 || row != self.y || col < self.x || col >= self.x + self.width {
            return None;
        }
        Some(col - self.x)
    }
}

/// Render a smooth progress bar in `area`.
/// `progress` is 0.0..=1.0; `clock` is the `(elapsed, total)` text, if known.
pub fn draw_progress(
    frame: &mut Frame,
    area: Rect,
    progress: f64,
    clock: Option<(&str, &str)>,
) -> BarGeometry {
    if area.width < 4 || area.height == 0 {
        return BarGeometry::default();
    }

    let (left_label, right_label) = clock.unwrap_or(("", ""));
    let left_w = if left_label.is_empty() {
        0
    } else {
        left_label.len() as u16 + 1
    };
    let right_w = if right_label.is_empty() {
        0
    } else {
        right_label.len() as u16 + 1
    };
    let bar_w = area.width.saturating_sub(left_w + right_w).max(4);

    let mut spans = Vec::new();
    if left_w > 0 {
        spans.push(Span::styled(
            format!("{} ", left_label),
            Style::default().fg(C_SECONDARY),
        ));
    }
    spans.push(Span::styled(
        smooth_bar(progress, bar_w as usize),
        Style::default().fg(C_PLAYING),
    ));
    if right_w > 0 {
        spans.push(Span::styled(
            format!(" {}", right_label),
            Style::default().fg(C_MUTED),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
    BarGeometry {
        x: area.x + left_w,
        y: area.y,
        width: bar_w,
    }
}

/// Unicode smooth fill: 8 eighths per cell.
fn smooth_bar(progress: f64, width: usize) -> String {
    let eighths = (progress.clamp(0.0, 1.0) * width as f64 * 8.0) as usize;
    let full_blocks = eighths / 8;
    let partial = eighths % 8;

    let mut bar = String::with_capacity(width * 3);
    for _ in 0..full_blocks.min(width) {
        bar.push('█');
    }
    if full_blocks < width {
        bar.push(BLOCKS[partial]);
        for _ in (full_blocks + 1)..width {
            bar.push(' ');
        }
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_has_fixed_width() {
        for p in [0.0, 0.33, 0.5, 1.0, 7.0] {
            assert_eq!(smooth_bar(p, 10).chars().count(), 10);
        }
        assert_eq!(smooth_bar(0.5, 4), "██  ");
        assert_eq!(smooth_bar(0.0625, 2), "▏ ");
        assert_eq!(smooth_bar(0.25, 2), "▌ ");
    }

    #[test]
    fn clicks_map_into_bar() {
        let bar = BarGeometry {
            x: 6,
            y: 3,
            width: 100,
        };
        assert_eq!(bar.offset_of(56, 3), Some(50));
        assert_eq!(bar.offset_of(5, 3), None);
        assert_eq!(bar.offset_of(106, 3), None);
        assert_eq!(bar.offset_of(56, 4), None);
    }
}
