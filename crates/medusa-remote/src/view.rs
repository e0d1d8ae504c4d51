//! View Binder seam: the engine hands display data across it and never
//! touches the terminal itself.

use std::future::Future;

use medusa_proto::protocol::{MediaMetadata, TransportStatus, Track};
use medusa_proto::route::Route;
use tokio::sync::mpsc;
use tracing::warn;

/// Text that may point somewhere in the web interface (or outside it).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Linked {
    pub text: String,
    pub href: Option<String>,
}

impl Linked {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: None,
        }
    }

    pub fn to(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: Some(href.into()),
        }
    }
}

/// What the now-playing header shows for the current media.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MediaView {
    pub title: Linked,
    pub subtitle: Option<Linked>,
    /// Right-aligned detail: year, `SxxEyy`, or artist.
    pub right: Option<Linked>,
    /// Audio/subtitle selection makes sense for this media.
    pub track_options: bool,
    /// Disc menus can be driven from navigation mode.
    pub navigation_options: bool,
}

impl MediaView {
    pub fn from_metadata(meta: &MediaMetadata) -> Self {
        match meta {
            MediaMetadata::Film {
                title,
                genres,
                year,
            } => Self {
                title: Linked::to(
                    title.clone(),
                    format!("http://www.imdb.com/find?q={}#tt", title),
                ),
                subtitle: Some(Linked::plain(genres.join(", "))),
                right: year.map(|y| Linked::plain(y.to_string())),
                track_options: true,
                navigation_options: false,
            },
            MediaMetadata::Television {
                show,
                season,
                episode,
                episode_title,
            } => {
                let show_url = format!("/medusa/browse/television/{}", show);
                Self {
                    title: Linked::plain(episode_title.clone()),
                    subtitle: Some(Linked::to(show.clone(), show_url.clone())),
                    right: Some(Linked::to(
                        format!("S{:02}E{:02}", season, episode),
                        format!("{}/{}", show_url, season),
                    )),
                    track_options: true,
                    navigation_options: false,
                }
            }
            MediaMetadata::Music {
                artist,
                album,
                track,
            } => Self {
                title: Linked::plain(track.clone()),
                subtitle: Some(Linked::to(
                    album.clone(),
                    format!("/medusa/browse/music/{}/{}", artist, album),
                )),
                right: Some(Linked::to(
                    artist.clone(),
                    format!("/medusa/browse/music/{}", artist),
                )),
                track_options: false,
                navigation_options: false,
            },
            MediaMetadata::Other {
                title,
                details,
                year,
                ..
            } => Self {
                title: Linked::plain(title.clone()),
                subtitle: Some(Linked::plain(details.join(", "))),
                right: year.map(|y| Linked::plain(y.to_string())),
                track_options: true,
                navigation_options: false,
            },
        }
    }

    /// Reduced view for media outside the catalog: a name and nothing else.
    pub fn alternative(status: &TransportStatus) -> Self {
        let name = status
            .name
            .clone()
            .unwrap_or_else(|| status.media_id.to_string());
        Self {
            title: Linked::plain(name),
            subtitle: None,
            right: None,
            track_options: true,
            navigation_options: status.media_id.is_disc(),
        }
    }
}

/// One display change requested by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewUpdate {
    Controls {
        pause_label: &'static str,
        mute_label: &'static str,
    },
    Media(MediaView),
    ClearMedia,
    Tracks {
        audio: Vec<Track>,
        subtitles: Vec<Track>,
    },
    /// Bar fill in `0.0..=1.0`, with the total (seconds) it was taken from.
    Progress { fraction: f64, total: f64 },
    Clock {
        elapsed: String,
        total: String,
    },
    Redirect(Route),
}

/// Receives display changes. `apply` must not block.
pub trait ViewBinder {
    fn apply(&mut self, update: ViewUpdate);

    /// Hand over an update that must not be lost, waiting for room when the
    /// binder sits in front of a bounded queue.
    fn deliver(&mut self, update: ViewUpdate) -> impl Future<Output = ()> + Send {
        self.apply(update);
        std::future::ready(())
    }
}

/// Recording binder.
impl ViewBinder for Vec<ViewUpdate> {
    fn apply(&mut self, update: ViewUpdate) {
        self.push(update);
    }
}

/// A view update stamped with the poller generation that produced it, so the
/// app can drop leftovers from a poller it already replaced.
#[derive(Debug, Clone)]
pub struct ViewEvent {
    pub generation: u64,
    pub update: ViewUpdate,
}

/// Forwards updates into the app's event channel.
pub struct ChannelView<M> {
    generation: u64,
    tx: mpsc::Sender<M>,
}

impl<M: From<ViewEvent>> ChannelView<M> {
    pub fn new(generation: u64, tx: mpsc::Sender<M>) -> Self {
        Self { generation, tx }
    }
}

impl<M: From<ViewEvent> + Send> ViewBinder for ChannelView<M> {
    fn apply(&mut self, update: ViewUpdate) {
        let event = ViewEvent {
            generation: self.generation,
            update,
        };
        if let Err(e) = self.tx.try_send(M::from(event)) {
            warn!("view update dropped: {}", e);
        }
    }

    fn deliver(&mut self, update: ViewUpdate) -> impl Future<Output = ()> + Send {
        let tx = self.tx.clone();
        let event = M::from(ViewEvent {
            generation: self.generation,
            update,
        });
        async move {
            if tx.send(event).await.is_err() {
                warn!("view closed before a pending update arrived");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medusa_proto::protocol::MediaId;

    #[test]
    fn television_pads_season_and_episode() {
        let view = MediaView::from_metadata(&MediaMetadata::Television {
            show: "Lost".into(),
            season: 1,
            episode: 7,
            episode_title: "The Moth".into(),
        });
        assert_eq!(view.title.text, "The Moth");
        assert_eq!(
            view.subtitle,
            Some(Linked::to("Lost", "/medusa/browse/television/Lost"))
        );
        assert_eq!(
            view.right,
            Some(Linked::to("S01E07", "/medusa/browse/television/Lost/1"))
        );
    }

    #[test]
    fn film_links_title_and_lists_genres() {
        let view = MediaView::from_metadata(&MediaMetadata::Film {
            title: "Alien".into(),
            genres: vec!["Horror".into(), "Sci-Fi".into()],
            year: Some(1979),
        });
        assert_eq!(
            view.title.href.as_deref(),
            Some("http://www.imdb.com/find?q=Alien#tt")
        );
        assert_eq!(view.subtitle.unwrap().text, "Horror, Sci-Fi");
        assert_eq!(view.right.unwrap().text, "1979");
    }

    #[test]
    fn music_hides_track_options() {
        let view = MediaView::from_metadata(&MediaMetadata::Music {
            artist: "Low".into(),
            album: "Secret Name".into(),
            track: "Weight of Water".into(),
        });
        assert!(!view.track_options);
        assert_eq!(
            view.subtitle.unwrap().href.as_deref(),
            Some("/medusa/browse/music/Low/Secret Name")
        );
        assert_eq!(view.right.unwrap().text, "Low");
    }

    #[test]
    fn disc_offers_navigation() {
        let status = TransportStatus {
            media_id: MediaId::Alternative("disc".into()),
            name: Some("DVD".into()),
            ..Default::default()
        };
        let view = MediaView::alternative(&status);
        assert_eq!(view.title.text, "DVD");
        assert!(view.subtitle.is_none());
        assert!(view.navigation_options);
    }
}
