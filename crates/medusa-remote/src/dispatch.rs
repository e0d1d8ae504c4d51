//! Command Dispatcher: turns user intents into snake commands and decides
//! where the view goes once the head has acknowledged them.

use medusa_proto::protocol::Track;
use medusa_proto::route::{Route, UiMode};
use tracing::{info, warn};

use crate::transport::{Ack, MedusaClient};

/// Disc-menu navigation codes understood by the snake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCode {
    Confirm = 0,
    Up = 1,
    Down = 2,
    Left = 3,
    Right = 4,
}

/// A transport command for one snake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Pause,
    Stop,
    Mute,
    VolumeUp,
    VolumeDown,
    JumpForward,
    JumpBackward,
    /// Seek to an absolute offset in seconds.
    JumpTo(u64),
    Audio(i64),
    Subtitle(i64),
    Navigate(NavCode),
    /// Start a catalog item (or a downloads entry by name), replacing the queue.
    Play(String),
    /// Append to the snake's queue.
    Queue(String),
}

impl Command {
    /// Action segment of `/snake/{session}/{action}`.
    pub fn action(&self) -> &'static str {
        match self {
            Command::Pause => "pause",
            Command::Stop => "stop",
            Command::Mute => "mute",
            Command::VolumeUp => "volume_up",
            Command::VolumeDown => "volume_down",
            Command::JumpForward => "jump_forward",
            Command::JumpBackward => "jump_backward",
            Command::JumpTo(_) => "jump_to",
            Command::Audio(_) => "audio",
            Command::Subtitle(_) => "subtitle",
            Command::Navigate(_) => "navigate",
            Command::Play(_) => "play",
            Command::Queue(_) => "queue",
        }
    }

    /// Value segment, if the action takes one. Zero is a real value and is sent.
    pub fn value(&self) -> Option<String> {
        match self {
            Command::JumpTo(secs) => Some(secs.to_string()),
            Command::Audio(id) | Command::Subtitle(id) => Some(id.to_string()),
            Command::Navigate(code) => Some((*code as u8).to_string()),
            Command::Play(media) | Command::Queue(media) => Some(media.clone()),
            _ => None,
        }
    }

    /// Track changes only take effect in a fresh view.
    pub fn default_post_condition(&self) -> PostCondition {
        match self {
            Command::Audio(_) | Command::Subtitle(_) => PostCondition::Reload,
            _ => PostCondition::None,
        }
    }
}

/// What to do with the view after an acknowledged command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostCondition {
    #[default]
    None,
    Reload,
}

/// Route to follow once `command` was acknowledged while showing `current`.
/// Stopping always leaves for browse, whatever the post-condition.
pub fn route_after(command: &Command, post: PostCondition, current: &Route) -> Option<Route> {
    if *command == Command::Stop {
        return Some(Route::Browse);
    }
    match post {
        PostCondition::Reload => Some(current.clone()),
        PostCondition::None => None,
    }
}

/// Sends commands for one snake on behalf of the playing view.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: MedusaClient,
    route: Route,
}

impl Dispatcher {
    pub fn new(client: MedusaClient, route: Route) -> Self {
        Self { client, route }
    }

    /// Send `command` and return the route to follow, if any.
    /// Failures are logged and yield no route; nothing is retried.
    pub async fn dispatch(&self, command: Command, post: PostCondition) -> Option<Route> {
        let session = self.route.session()?;
        match self.client.send_command(session, &command).await {
            Ok(ack) => {
                match &ack {
                    Ack::Ok => info!("{}: {} acknowledged", session, command.action()),
                    Ack::Failed => warn!("{}: head reported {} failed", session, command.action()),
                    Ack::Unrecognized(body) => {
                        warn!("{}: {} answered {:?}", session, command.action(), body)
                    }
                }
                route_after(&command, post, &self.route)
            }
            Err(e) => {
                warn!("{}: {} not sent: {}", session, command.action(), e);
                None
            }
        }
    }
}

/// Start `media` on `snake` from the browse screen, or append it to the
/// snake's queue. Playing moves to that snake's view; queueing stays put.
pub async fn start_on(
    client: &MedusaClient,
    snake: &str,
    media: String,
    queue: bool,
) -> Option<Route> {
    let command = if queue {
        Command::Queue(media)
    } else {
        Command::Play(media)
    };
    match client.send_command(snake, &command).await {
        Ok(ack) => {
            info!("{}: {} {:?}", snake, command.action(), ack);
            Some(if queue {
                Route::Browse
            } else {
                Route::playing(snake, UiMode::Basic)
            })
        }
        Err(e) => {
            warn!("{}: {} not sent: {}", snake, command.action(), e);
            None
        }
    }
}

/// Seek target for a click `click_x` cells into a bar `bar_width` cells wide.
/// `None` while the total is zero or unknown.
pub fn seek_target(click_x: u16, bar_width: u16, total: f64) -> Option<u64> {
    if bar_width == 0 || !total.is_finite() || total <= 0.0 {
        return None;
    }
    let fraction = (f64::from(click_x) / f64::from(bar_width)).clamp(0.0, 1.0);
    Some((fraction * total).round() as u64)
}

/// Tracks to offer in the picker; an empty list offers only "Disable".
pub fn track_choices(tracks: &[Track]) -> Vec<Track> {
    if tracks.is_empty() {
        vec![Track::disabled()]
    } else {
        tracks.to_vec()
    }
}
