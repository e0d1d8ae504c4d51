//! Wire types of the Medusa head API (`/medusa/api`).
//!
//! The head relays whatever the snake reported, so decoding is lenient: an
//! unknown snake answers `{}`, numbers sometimes arrive as strings, and track
//! lists are `[id, label]` pairs straight from VLC.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Default API prefix on the head.
pub const API_BASE: &str = "/medusa/api";

/// Track id the player uses for "no track".
pub const DISABLED_TRACK_ID: i64 = -1;

// ── Player state ──────────────────────────────────────────────────────────────

/// Transport state as reported by the snake.
///
/// The snake derives these from VLC's `State.*` names by stripping the
/// prefix characters, which is why stopped arrives as `"opped"`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlayerState {
    Playing,
    Paused,
    Stopped,
    Ended,
    #[default]
    NothingSpecial,
    Opening,
    Buffering,
    Error,
    Other(String),
}

impl From<String> for PlayerState {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "playing" => PlayerState::Playing,
            "paused" => PlayerState::Paused,
            "opped" | "stopped" => PlayerState::Stopped,
            "ended" => PlayerState::Ended,
            "nothingspecial" | "" => PlayerState::NothingSpecial,
            "opening" => PlayerState::Opening,
            "buffering" => PlayerState::Buffering,
            "error" => PlayerState::Error,
            _ => PlayerState::Other(raw),
        }
    }
}

impl From<PlayerState> for String {
    fn from(state: PlayerState) -> Self {
        match state {
            PlayerState::Playing => "playing".into(),
            PlayerState::Paused => "paused".into(),
            PlayerState::Stopped => "opped".into(),
            PlayerState::Ended => "ended".into(),
            PlayerState::NothingSpecial => "nothingspecial".into(),
            PlayerState::Opening => "opening".into(),
            PlayerState::Buffering => "buffering".into(),
            PlayerState::Error => "error".into(),
            PlayerState::Other(s) => s,
        }
    }
}

impl PlayerState {
    /// States after which the snake has nothing more to play.
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            PlayerState::Stopped | PlayerState::Ended | PlayerState::NothingSpecial
        )
    }
}

// ── Media identifier ──────────────────────────────────────────────────────────

/// What the snake is playing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(untagged)]
pub enum MediaId {
    /// Nothing loaded (`null` or `""`).
    #[default]
    Empty,
    /// A catalog entry with metadata on the head.
    Catalog(u64),
    /// A source outside the catalog, e.g. `"disc"` or a downloaded file name.
    Alternative(String),
}

impl MediaId {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => match n.as_u64() {
                Some(id) => MediaId::Catalog(id),
                None => MediaId::Alternative(n.to_string()),
            },
            Value::String(s) => MediaId::from_str_lossy(s),
            _ => MediaId::Empty,
        }
    }

    pub fn from_str_lossy(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            MediaId::Empty
        } else if let Ok(id) = trimmed.parse::<u64>() {
            MediaId::Catalog(id)
        } else {
            MediaId::Alternative(raw.to_string())
        }
    }

    /// The physical disc source, which supports menu navigation.
    pub fn is_disc(&self) -> bool {
        matches!(self, MediaId::Alternative(s) if s == "disc")
    }
}

impl<'de> Deserialize<'de> for MediaId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(MediaId::from_value(&value))
    }
}

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaId::Empty => Ok(()),
            MediaId::Catalog(id) => write!(f, "{}", id),
            MediaId::Alternative(s) => f.write_str(s),
        }
    }
}

// ── Tracks ────────────────────────────────────────────────────────────────────

/// An audio or subtitle track offered by the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(i64, String)", into = "(i64, String)")]
pub struct Track {
    pub id: i64,
    pub label: String,
}

impl Track {
    pub fn new(id: i64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }

    /// The "no track" entry shown when the player lists nothing.
    pub fn disabled() -> Self {
        Self::new(DISABLED_TRACK_ID, "Disable")
    }
}

impl From<(i64, String)> for Track {
    fn from((id, label): (i64, String)) -> Self {
        Self { id, label }
    }
}

impl From<Track> for (i64, String) {
    fn from(track: Track) -> Self {
        (track.id, track.label)
    }
}

// ── Status ────────────────────────────────────────────────────────────────────

/// Answer of `GET /status/{session}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportStatus {
    #[serde(default)]
    pub state: PlayerState,
    /// Seconds played; `NaN` when the snake sent nothing usable.
    #[serde(default = "nan", deserialize_with = "lenient_seconds")]
    pub elapsed: f64,
    #[serde(default = "nan", deserialize_with = "lenient_seconds")]
    pub total: f64,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub mute: bool,
    #[serde(default)]
    pub media_id: MediaId,
    /// Display name for alternative media.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_tracks")]
    pub audio: Vec<Track>,
    #[serde(default, deserialize_with = "lenient_tracks")]
    pub subtitles: Vec<Track>,
}

impl Default for TransportStatus {
    fn default() -> Self {
        Self {
            state: PlayerState::default(),
            elapsed: f64::NAN,
            total: f64::NAN,
            mute: false,
            media_id: MediaId::Empty,
            name: None,
            audio: Vec::new(),
            subtitles: Vec::new(),
        }
    }
}

fn nan() -> f64 {
    f64::NAN
}

fn lenient_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(seconds_from_value(&value))
}

fn seconds_from_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64().map(|v| v != 0).unwrap_or(false),
        Value::String(s) => matches!(s.trim(), "1" | "true" | "True"),
        _ => false,
    })
}

fn lenient_tracks<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Track>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items.iter().filter_map(track_from_value).collect())
}

fn track_from_value(value: &Value) -> Option<Track> {
    match value {
        Value::Array(pair) if pair.len() >= 2 => {
            let id = pair[0].as_i64()?;
            let label = match &pair[1] {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some(Track::new(id, label))
        }
        Value::Object(map) => {
            let id = map.get("id")?.as_i64()?;
            let label = map
                .get("label")
                .or_else(|| map.get("name"))
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            Some(Track::new(id, label))
        }
        _ => None,
    }
}

// ── Media metadata ────────────────────────────────────────────────────────────

/// Catalog record as stored by the head: one generic shape for every category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaRecord {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub name_one: Value,
    #[serde(default)]
    pub name_two: Value,
    #[serde(default)]
    pub name_three: Value,
    #[serde(default)]
    pub name_four: Value,
    #[serde(default)]
    pub year: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("media record has no category")]
    MissingCategory,
    #[error("{category} record has unusable field {field}")]
    BadField {
        category: &'static str,
        field: &'static str,
    },
}

/// Catalog metadata, one variant per category with only the fields it shows.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaMetadata {
    Film {
        title: String,
        genres: Vec<String>,
        year: Option<i64>,
    },
    Television {
        show: String,
        season: u32,
        episode: u32,
        episode_title: String,
    },
    Music {
        artist: String,
        album: String,
        track: String,
    },
    Other {
        category: String,
        title: String,
        details: Vec<String>,
        year: Option<i64>,
    },
}

impl TryFrom<MediaRecord> for MediaMetadata {
    type Error = MetadataError;

    fn try_from(record: MediaRecord) -> Result<Self, Self::Error> {
        let category = record.category.trim().to_ascii_lowercase();
        match category.as_str() {
            "" => Err(MetadataError::MissingCategory),
            "film" => Ok(MediaMetadata::Film {
                title: text(&record.name_one),
                genres: text_list(&record.name_two),
                year: number(&record.year),
            }),
            "television" => Ok(MediaMetadata::Television {
                show: text(&record.name_one),
                season: number(&record.name_two)
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or(MetadataError::BadField {
                        category: "television",
                        field: "name_two",
                    })?,
                episode: number(&record.name_three)
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or(MetadataError::BadField {
                        category: "television",
                        field: "name_three",
                    })?,
                episode_title: text(&record.name_four),
            }),
            "music" => Ok(MediaMetadata::Music {
                artist: text(&record.name_one),
                album: text(&record.name_two),
                track: text(&record.name_three),
            }),
            _ => Ok(MediaMetadata::Other {
                category,
                title: text(&record.name_one),
                details: text_list(&record.name_two),
                year: number(&record.year),
            }),
        }
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn text_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(text).filter(|s| !s.is_empty()).collect(),
        Value::Null => Vec::new(),
        other => {
            let s = text(other);
            if s.is_empty() {
                Vec::new()
            } else {
                vec![s]
            }
        }
    }
}

fn number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ── Browse / admin ────────────────────────────────────────────────────────────

/// Answer of `GET /snakes[/queue]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnakeList {
    #[serde(default)]
    pub snakes: Vec<String>,
}

/// Answer of `POST /search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub media: Vec<SearchRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRecord {
    #[serde(default)]
    pub id: MediaId,
    #[serde(flatten)]
    pub record: MediaRecord,
}

/// One search result, ready to list.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: u64,
    pub metadata: MediaMetadata,
}

impl SearchHit {
    /// One-line description, e.g. `Show - S01E02 - Pilot`.
    pub fn display_name(&self) -> String {
        match &self.metadata {
            MediaMetadata::Film { title, year, .. } => match year {
                Some(y) => format!("{} ({})", title, y),
                None => title.clone(),
            },
            MediaMetadata::Television {
                show,
                season,
                episode,
                episode_title,
            } => format!(
                "{} - S{:02}E{:02} - {}",
                show, season, episode, episode_title
            ),
            MediaMetadata::Music {
                artist,
                album,
                track,
            } => format!("{} - {} - {}", artist, album, track),
            MediaMetadata::Other { title, .. } => title.clone(),
        }
    }
}

impl SearchResponse {
    /// Keep the hits that name a catalog id and a category the remote can show.
    pub fn into_hits(self) -> Vec<SearchHit> {
        self.media
            .into_iter()
            .filter_map(|rec| {
                let MediaId::Catalog(id) = rec.id else {
                    return None;
                };
                let metadata = MediaMetadata::try_from(rec.record).ok()?;
                matches!(
                    metadata,
                    MediaMetadata::Film { .. }
                        | MediaMetadata::Television { .. }
                        | MediaMetadata::Music { .. }
                )
                .then_some(SearchHit { id, metadata })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_decodes_snake_update() {
        let status: TransportStatus = serde_json::from_value(json!({
            "media_id": 42,
            "name": "Alien",
            "state": "playing",
            "elapsed": 12,
            "total": 6000,
            "mute": false,
            "queue": [],
            "audio": [[-1, "Disable"], [1, "English"]],
            "subtitles": []
        }))
        .unwrap();

        assert_eq!(status.state, PlayerState::Playing);
        assert_eq!(status.media_id, MediaId::Catalog(42));
        assert_eq!(status.elapsed, 12.0);
        assert_eq!(status.audio, vec![Track::disabled(), Track::new(1, "English")]);
        assert!(status.subtitles.is_empty());
    }

    #[test]
    fn unknown_snake_status_is_all_defaults() {
        let status: TransportStatus = serde_json::from_str("{}").unwrap();
        assert_eq!(status.state, PlayerState::NothingSpecial);
        assert_eq!(status.media_id, MediaId::Empty);
        assert!(status.elapsed.is_nan());
        assert!(status.total.is_nan());
    }

    #[test]
    fn stripped_vlc_state_names() {
        assert_eq!(PlayerState::from("opped".to_string()), PlayerState::Stopped);
        assert_eq!(
            PlayerState::from("NothingSpecial".to_string()),
            PlayerState::NothingSpecial
        );
        assert!(PlayerState::Ended.is_finished());
        assert!(!PlayerState::Paused.is_finished());
        assert_eq!(
            PlayerState::from("weird".to_string()),
            PlayerState::Other("weird".into())
        );
    }

    #[test]
    fn media_id_kinds() {
        assert_eq!(MediaId::from_value(&json!("17")), MediaId::Catalog(17));
        assert_eq!(MediaId::from_value(&json!("")), MediaId::Empty);
        assert_eq!(MediaId::from_value(&json!(null)), MediaId::Empty);
        let disc = MediaId::from_value(&json!("disc"));
        assert!(disc.is_disc());
        assert_eq!(disc.to_string(), "disc");
    }

    #[test]
    fn malformed_elapsed_is_nan() {
        let status: TransportStatus =
            serde_json::from_value(json!({"elapsed": "soon", "total": "90"})).unwrap();
        assert!(status.elapsed.is_nan());
        assert_eq!(status.total, 90.0);
    }

    #[test]
    fn metadata_by_category() {
        let tv = MediaRecord {
            category: "Television".into(),
            name_one: json!("Lost"),
            name_two: json!(1),
            name_three: json!("2"),
            name_four: json!("Pilot"),
            year: json!(2004),
        };
        assert_eq!(
            MediaMetadata::try_from(tv).unwrap(),
            MediaMetadata::Television {
                show: "Lost".into(),
                season: 1,
                episode: 2,
                episode_title: "Pilot".into(),
            }
        );

        let film = MediaRecord {
            category: "film".into(),
            name_one: json!("Alien"),
            name_two: json!(["Horror", "Sci-Fi"]),
            year: json!(1979),
            ..Default::default()
        };
        let MediaMetadata::Film { genres, year, .. } = MediaMetadata::try_from(film).unwrap()
        else {
            panic!("expected film");
        };
        assert_eq!(genres, vec!["Horror", "Sci-Fi"]);
        assert_eq!(year, Some(1979));

        assert!(matches!(
            MediaMetadata::try_from(MediaRecord::default()),
            Err(MetadataError::MissingCategory)
        ));
    }

    #[test]
    fn search_keeps_known_categories() {
        let resp: SearchResponse = serde_json::from_value(json!({
            "media": [
                {"id": 3, "category": "music", "name_one": "Low", "name_two": "Things We Lost", "name_three": "Words"},
                {"id": "x", "category": "film", "name_one": "Nope"},
                {"id": 4, "category": "podcast", "name_one": "Ignored"}
            ]
        }))
        .unwrap();
        let hits = resp.into_hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].display_name(), "Low - Things We Lost - Words");
    }
}
