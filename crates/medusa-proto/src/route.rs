//! Page routes of the web interface, reused as screen addresses by the remote.
//!
//! Paths look like `/medusa/playing/{session}/{advanced|navigation}`: the
//! second segment picks the page, the third the session, and the optional
//! fourth the playing view's mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const LANDING_PATH: &str = "/medusa";
pub const BROWSE_PATH: &str = "/medusa/browse";

/// Which control set the playing view offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiMode {
    /// Transport buttons, progress bar and arrow-key shortcuts.
    #[default]
    Basic,
    /// Audio/subtitle track selection.
    Advanced,
    /// Arrow keys drive disc menu navigation.
    Navigation,
}

impl UiMode {
    pub fn segment(self) -> Option<&'static str> {
        match self {
            UiMode::Basic => None,
            UiMode::Advanced => Some("advanced"),
            UiMode::Navigation => Some("navigation"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UiMode::Basic => "BASIC",
            UiMode::Advanced => "ADVANCED",
            UiMode::Navigation => "NAVIGATION",
        }
    }
}

impl FromStr for UiMode {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "basic" => Ok(UiMode::Basic),
            "advanced" => Ok(UiMode::Advanced),
            "navigation" => Ok(UiMode::Navigation),
            other => Err(RouteError::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("unknown mode {0:?} (expected basic, advanced or navigation)")]
    UnknownMode(String),
    #[error("unsupported route {0:?}")]
    Unsupported(String),
}

/// A screen the remote can show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/medusa`: resolves to whatever is playing, else browse.
    Landing,
    /// `/medusa/browse`: search and start playback.
    Browse,
    /// `/medusa/playing/{session}[/{mode}]`.
    Playing { session: String, mode: UiMode },
}

impl Route {
    pub fn playing(session: impl Into<String>, mode: UiMode) -> Self {
        Route::Playing {
            session: session.into(),
            mode,
        }
    }

    pub fn session(&self) -> Option<&str> {
        match self {
            Route::Playing { session, .. } => Some(session),
            _ => None,
        }
    }

    /// Same page in a different mode; non-playing routes are unchanged.
    pub fn with_mode(&self, mode: UiMode) -> Route {
        match self {
            Route::Playing { session, .. } => Route::playing(session.clone(), mode),
            other => other.clone(),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Landing => LANDING_PATH.to_string(),
            Route::Browse => BROWSE_PATH.to_string(),
            Route::Playing { session, mode } => match mode.segment() {
                Some(seg) => format!("{}/playing/{}/{}", LANDING_PATH, session, seg),
                None => format!("{}/playing/{}", LANDING_PATH, session),
            },
        }
    }

    /// Parse a page path. A bare word is taken as a session name.
    pub fn parse(raw: &str) -> Result<Route, RouteError> {
        let trimmed = raw.trim();
        if !trimmed.contains('/') && !trimmed.is_empty() {
            return Ok(Route::playing(trimmed, UiMode::Basic));
        }

        let bits: Vec<&str> = trimmed
            .trim_matches('/')
            .split('/')
            .filter(|b| !b.is_empty())
            .collect();

        match bits.as_slice() {
            [] | ["medusa"] => Ok(Route::Landing),
            ["medusa", "browse", ..] | ["medusa", "media", ..] => Ok(Route::Browse),
            ["medusa", "playing"] => Ok(Route::Landing),
            ["medusa", "playing", session] => Ok(Route::playing(*session, UiMode::Basic)),
            ["medusa", "playing", session, mode, ..] => {
                Ok(Route::playing(*session, mode.parse()?))
            }
            _ => Err(RouteError::Unsupported(raw.to_string())),
        }
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playing_paths_select_mode() {
        assert_eq!(
            Route::parse("/medusa/playing/lounge").unwrap(),
            Route::playing("lounge", UiMode::Basic)
        );
        assert_eq!(
            Route::parse("/medusa/playing/lounge/advanced").unwrap(),
            Route::playing("lounge", UiMode::Advanced)
        );
        assert_eq!(
            Route::parse("/medusa/playing/lounge/navigation/").unwrap(),
            Route::playing("lounge", UiMode::Navigation)
        );
        assert!(matches!(
            Route::parse("/medusa/playing/lounge/turbo"),
            Err(RouteError::UnknownMode(_))
        ));
    }

    #[test]
    fn landing_browse_and_bare_session() {
        assert_eq!(Route::parse("/medusa").unwrap(), Route::Landing);
        assert_eq!(Route::parse("/medusa/browse/film").unwrap(), Route::Browse);
        assert_eq!(
            Route::parse("bedroom").unwrap(),
            Route::playing("bedroom", UiMode::Basic)
        );
        assert!(Route::parse("/elsewhere/x").is_err());
    }

    #[test]
    fn path_round_trips_through_parse() {
        let route = Route::playing("lounge", UiMode::Navigation);
        assert_eq!(route.path(), "/medusa/playing/lounge/navigation");
        assert_eq!(Route::parse(&route.path()).unwrap(), route);
        assert_eq!(
            route.with_mode(UiMode::Basic).path(),
            "/medusa/playing/lounge"
        );
    }
}
