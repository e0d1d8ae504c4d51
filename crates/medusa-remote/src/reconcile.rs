//! Reconciliation Engine: one poll result in, display changes out.
//!
//! The engine does no I/O. The poller feeds it each status it fetched and,
//! when the engine asks for one, the metadata of a newly seen catalog item.
//!
//! # Phases
//! ```text
//!  Active ──end seen──▶ TerminalPending ──end seen, retries spent──▶ Terminal
//!    ▲                        │
//!    └──────normal status─────┘
//! ```
//! `Terminal` is absorbing: later ticks do nothing. The redirect itself is
//! delivered by the caller, which may have to wait for the view to take it.

use medusa_proto::clock::{format_time, progress_fraction};
use medusa_proto::config::PollingConfig;
use medusa_proto::protocol::{MediaId, MediaMetadata, PlayerState, TransportStatus};
use medusa_proto::route::Route;
use tracing::{debug, info};

use crate::session::SessionState;
use crate::view::{MediaView, ViewBinder, ViewUpdate};

/// How many end-of-session observations are forgiven before leaving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Clear the counter whenever the snake reports normal playback again.
    pub reset_on_recovery: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            reset_on_recovery: false,
        }
    }
}

impl From<&PollingConfig> for RetryPolicy {
    fn from(config: &PollingConfig) -> Self {
        Self {
            max_retries: config.max_terminal_retries,
            reset_on_recovery: config.reset_retries_on_recovery,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    TerminalPending,
    Terminal,
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Display updated; `fetch` names a catalog id whose metadata is wanted.
    Reconciled { fetch: Option<u64> },
    /// End of session observed but not yet believed.
    Debounced { attempt: u32 },
    /// Session over; the view was sent to `Route`.
    Terminal(Route),
}

/// End of session: the player stopped, or the clock reached the end.
pub fn is_end_condition(status: &TransportStatus) -> bool {
    status.state.is_finished() || (status.elapsed > 0.0 && status.elapsed == status.total)
}

fn pause_label(state: &PlayerState) -> &'static str {
    if *state == PlayerState::Paused {
        "Resume"
    } else {
        "Pause"
    }
}

fn mute_label(muted: bool) -> &'static str {
    if muted {
        "Unmute"
    } else {
        "Mute"
    }
}

#[derive(Debug)]
pub struct Reconciler {
    session: SessionState,
    phase: Phase,
    policy: RetryPolicy,
}

impl Reconciler {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            session: SessionState::new(),
            phase: Phase::Active,
            policy,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Count a tick whose status poll failed. Only the very first attempt
    /// after the view opens is the initial load, whether or not it answered.
    pub fn skip_tick(&mut self) {
        if self.phase != Phase::Terminal {
            self.session.begin_tick();
        }
    }

    /// Reconcile the view with one status poll.
    pub fn observe<V: ViewBinder + ?Sized>(
        &mut self,
        status: &TransportStatus,
        view: &mut V,
    ) -> TickOutcome {
        if self.phase == Phase::Terminal {
            return TickOutcome::Terminal(Route::Landing);
        }
        let initial_load = self.session.begin_tick();

        view.apply(ViewUpdate::Controls {
            pause_label: pause_label(&status.state),
            mute_label: mute_label(status.mute),
        });

        if is_end_condition(status) {
            if initial_load || self.session.terminal_retries < self.policy.max_retries {
                self.session.terminal_retries += 1;
                self.phase = Phase::TerminalPending;
                debug!(
                    "end of session seen ({:?}, {}/{}), attempt {}",
                    status.state, status.elapsed, status.total, self.session.terminal_retries
                );
                return TickOutcome::Debounced {
                    attempt: self.session.terminal_retries,
                };
            }

            info!(
                "session ended after {} end observations; leaving",
                self.session.terminal_retries
            );
            self.phase = Phase::Terminal;
            return TickOutcome::Terminal(Route::Landing);
        }

        self.phase = Phase::Active;
        if self.policy.reset_on_recovery {
            self.session.terminal_retries = 0;
        }

        let mut fetch = None;
        if self
            .session
            .record_media(&status.media_id, &status.audio, &status.subtitles)
        {
            debug!("media changed to {:?}", status.media_id);
            view.apply(ViewUpdate::Tracks {
                audio: self.session.audio_tracks.clone(),
                subtitles: self.session.subtitle_tracks.clone(),
            });
            match &status.media_id {
                MediaId::Empty => view.apply(ViewUpdate::ClearMedia),
                MediaId::Alternative(_) => {
                    view.apply(ViewUpdate::Media(MediaView::alternative(status)))
                }
                MediaId::Catalog(id) => fetch = Some(*id),
            }
        }

        self.session.elapsed = status.elapsed;
        self.session.total = status.total;
        view.apply(ViewUpdate::Progress {
            fraction: progress_fraction(status.elapsed, status.total),
            total: status.total,
        });
        if let Some(elapsed) = format_time(status.elapsed) {
            let total = format_time(status.total).unwrap_or_else(|| "--:--".to_string());
            view.apply(ViewUpdate::Clock { elapsed, total });
        }

        TickOutcome::Reconciled { fetch }
    }

    /// Show metadata fetched for `media_id`. Ignored (returns `false`) when
    /// the snake has moved on to other media since the fetch was requested.
    pub fn apply_metadata<V: ViewBinder + ?Sized>(
        &mut self,
        media_id: u64,
        metadata: &MediaMetadata,
        view: &mut V,
    ) -> bool {
        if self.phase == Phase::Terminal
            || self.session.media_id != Some(MediaId::Catalog(media_id))
        {
            debug!("dropping stale metadata for {}", media_id);
            return false;
        }
        view.apply(ViewUpdate::Media(MediaView::from_metadata(metadata)));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medusa_proto::protocol::Track;

    fn playing(media_id: u64, elapsed: f64, total: f64) -> TransportStatus {
        TransportStatus {
            state: PlayerState::Playing,
            elapsed,
            total,
            media_id: MediaId::Catalog(media_id),
            ..Default::default()
        }
    }

    fn ended() -> TransportStatus {
        TransportStatus {
            state: PlayerState::Ended,
            elapsed: 100.0,
            total: 100.0,
            media_id: MediaId::Catalog(1),
            ..Default::default()
        }
    }

    fn redirects(view: &[ViewUpdate]) -> usize {
        view.iter()
            .filter(|u| matches!(u, ViewUpdate::Redirect(_)))
            .count()
    }

    #[test]
    fn first_tick_always_debounces_an_end() {
        let mut engine = Reconciler::new(RetryPolicy {
            max_retries: 0,
            reset_on_recovery: false,
        });
        let mut view = Vec::new();
        assert_eq!(
            engine.observe(&ended(), &mut view),
            TickOutcome::Debounced { attempt: 1 }
        );
        assert_eq!(engine.phase(), Phase::TerminalPending);
        // Retries already exceed the threshold, so the next end leaves.
        assert_eq!(
            engine.observe(&ended(), &mut view),
            TickOutcome::Terminal(Route::Landing)
        );
    }

    #[test]
    fn failed_first_poll_uses_up_the_initial_load() {
        let mut engine = Reconciler::new(RetryPolicy {
            max_retries: 0,
            reset_on_recovery: false,
        });
        let mut view = Vec::new();
        engine.skip_tick();
        assert!(!engine.session().is_initial_load());
        assert_eq!(
            engine.observe(&ended(), &mut view),
            TickOutcome::Terminal(Route::Landing)
        );
    }

    #[test]
    fn ended_below_threshold_increments_without_leaving() {
        let mut engine = Reconciler::new(RetryPolicy::default());
        let mut view = Vec::new();
        engine.observe(&playing(1, 10.0, 100.0), &mut view);

        for attempt in 1..=3 {
            assert_eq!(
                engine.observe(&ended(), &mut view),
                TickOutcome::Debounced { attempt }
            );
        }
        assert_eq!(engine.session().terminal_retries, 3);
        assert_eq!(redirects(&view), 0);

        assert_eq!(
            engine.observe(&ended(), &mut view),
            TickOutcome::Terminal(Route::Landing)
        );
        // The poller delivers the redirect.
        assert_eq!(redirects(&view), 0);
        assert_eq!(engine.phase(), Phase::Terminal);
    }

    #[test]
    fn terminal_is_absorbing() {
        let mut engine = Reconciler::new(RetryPolicy::default());
        let mut view = Vec::new();
        for _ in 0..4 {
            engine.observe(&ended(), &mut view);
        }
        assert_eq!(engine.phase(), Phase::Terminal);

        let before = view.len();
        assert_eq!(
            engine.observe(&playing(2, 5.0, 50.0), &mut view),
            TickOutcome::Terminal(Route::Landing)
        );
        assert_eq!(view.len(), before);
        assert!(!engine.apply_metadata(
            2,
            &MediaMetadata::Music {
                artist: "a".into(),
                album: "b".into(),
                track: "c".into()
            },
            &mut view
        ));
    }

    #[test]
    fn clock_at_end_counts_as_ended() {
        let status = playing(1, 100.0, 100.0);
        assert!(is_end_condition(&status));
        assert!(!is_end_condition(&playing(1, 0.0, 0.0)));
        assert!(is_end_condition(&TransportStatus {
            state: PlayerState::Stopped,
            ..Default::default()
        }));
    }

    #[test]
    fn retry_counter_survives_recovery_by_default() {
        let mut engine = Reconciler::new(RetryPolicy::default());
        let mut view = Vec::new();
        engine.observe(&playing(1, 1.0, 100.0), &mut view);
        engine.observe(&ended(), &mut view);
        engine.observe(&playing(1, 2.0, 100.0), &mut view);
        assert_eq!(engine.phase(), Phase::Active);
        assert_eq!(engine.session().terminal_retries, 1);
    }

    #[test]
    fn retry_counter_resets_when_configured() {
        let mut engine = Reconciler::new(RetryPolicy {
            max_retries: 3,
            reset_on_recovery: true,
        });
        let mut view = Vec::new();
        engine.observe(&playing(1, 1.0, 100.0), &mut view);
        engine.observe(&ended(), &mut view);
        engine.observe(&ended(), &mut view);
        engine.observe(&playing(1, 2.0, 100.0), &mut view);
        assert_eq!(engine.session().terminal_retries, 0);
    }

    #[test]
    fn unchanged_media_never_refetches() {
        let mut engine = Reconciler::new(RetryPolicy::default());
        let mut view = Vec::new();
        assert_eq!(
            engine.observe(&playing(7, 1.0, 100.0), &mut view),
            TickOutcome::Reconciled { fetch: Some(7) }
        );
        for t in 2..10 {
            assert_eq!(
                engine.observe(&playing(7, t as f64, 100.0), &mut view),
                TickOutcome::Reconciled { fetch: None }
            );
        }
        assert_eq!(
            engine.observe(&playing(8, 1.0, 100.0), &mut view),
            TickOutcome::Reconciled { fetch: Some(8) }
        );
    }

    #[test]
    fn stale_metadata_is_dropped() {
        let mut engine = Reconciler::new(RetryPolicy::default());
        let mut view = Vec::new();
        engine.observe(&playing(7, 1.0, 100.0), &mut view);
        engine.observe(&playing(8, 1.0, 100.0), &mut view);

        let meta = MediaMetadata::Film {
            title: "Old".into(),
            genres: vec![],
            year: None,
        };
        assert!(!engine.apply_metadata(7, &meta, &mut view));
        assert!(engine.apply_metadata(8, &meta, &mut view));
        assert!(matches!(view.last(), Some(ViewUpdate::Media(_))));
    }

    #[test]
    fn alternative_media_renders_without_fetch() {
        let mut engine = Reconciler::new(RetryPolicy::default());
        let mut view = Vec::new();
        let status = TransportStatus {
            state: PlayerState::Playing,
            elapsed: 3.0,
            total: 60.0,
            media_id: MediaId::Alternative("disc".into()),
            name: Some("Disc".into()),
            audio: vec![Track::new(1, "Stereo")],
            ..Default::default()
        };
        assert_eq!(
            engine.observe(&status, &mut view),
            TickOutcome::Reconciled { fetch: None }
        );
        assert!(view.iter().any(|u| matches!(
            u,
            ViewUpdate::Media(m) if m.title.text == "Disc" && m.navigation_options
        )));
        assert_eq!(engine.session().audio_tracks, vec![Track::new(1, "Stereo")]);
    }

    #[test]
    fn labels_progress_and_clock() {
        let mut engine = Reconciler::new(RetryPolicy::default());
        let mut view = Vec::new();
        let status = TransportStatus {
            state: PlayerState::Paused,
            mute: true,
            ..playing(1, 61.0, 3661.0)
        };
        engine.observe(&status, &mut view);

        assert_eq!(
            view[0],
            ViewUpdate::Controls {
                pause_label: "Resume",
                mute_label: "Unmute"
            }
        );
        assert!(view.contains(&ViewUpdate::Progress {
            fraction: 61.0 / 3661.0,
            total: 3661.0
        }));
        assert!(view.contains(&ViewUpdate::Clock {
            elapsed: "01:01".into(),
            total: "1:01:01".into()
        }));
    }

    #[test]
    fn nan_elapsed_updates_bar_but_not_clock() {
        let mut engine = Reconciler::new(RetryPolicy::default());
        let mut view = Vec::new();
        engine.observe(&playing(1, f64::NAN, 100.0), &mut view);

        assert!(view.contains(&ViewUpdate::Progress {
            fraction: 0.0,
            total: 100.0
        }));
        assert!(!view.iter().any(|u| matches!(u, ViewUpdate::Clock { .. })));
    }
}
