//! Per-view session record, owned by the reconciliation engine.

use medusa_proto::protocol::{MediaId, Track};

/// Everything remembered between polls for one playing view. Created empty
/// when the view opens and dropped with it.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Last media id seen; `None` until the first reconciled poll.
    pub media_id: Option<MediaId>,
    pub audio_tracks: Vec<Track>,
    pub subtitle_tracks: Vec<Track>,
    pub elapsed: f64,
    pub total: f64,
    /// End-of-session observations so far.
    pub terminal_retries: u32,
    ticks: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True until the first tick has been processed.
    pub fn is_initial_load(&self) -> bool {
        self.ticks == 0
    }

    pub(crate) fn begin_tick(&mut self) -> bool {
        let initial = self.is_initial_load();
        self.ticks += 1;
        initial
    }

    /// Store a new media id and its tracks. Returns `false` when `media_id`
    /// is the one already recorded.
    pub(crate) fn record_media(
        &mut self,
        media_id: &MediaId,
        audio: &[Track],
        subtitles: &[Track],
    ) -> bool {
        if self.media_id.as_ref() == Some(media_id) {
            return false;
        }
        self.media_id = Some(media_id.clone());
        self.audio_tracks = audio.to_vec();
        self.subtitle_tracks = subtitles.to_vec();
        true
    }
}
