//! Playback clock formatting.

/// Format seconds as `H:MM:SS`, dropping the hours segment when it is zero
/// (`61` → `01:01`, `3661` → `1:01:01`).
///
/// Returns `None` for values that are not finite numbers; negative values
/// clamp to zero.
pub fn format_time(secs: f64) -> Option<String> {
    if !secs.is_finite() {
        return None;
    }
    let s = secs.max(0.0) as u64;
    let h = s / 3600;
    let m = (s % 3600) / 60;
    let s = s % 60;
    if h > 0 {
        Some(format!("{}:{:02}:{:02}", h, m, s))
    } else {
        Some(format!("{:02}:{:02}", m, s))
    }
}

/// Fraction of the way through the media, clamped to `0.0..=1.0`.
/// Unknown or zero totals give `0.0`.
pub fn progress_fraction(elapsed: f64, total: f64) -> f64 {
    let fraction = elapsed / total;
    if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
