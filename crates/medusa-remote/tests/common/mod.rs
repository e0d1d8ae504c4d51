#![allow(dead_code)]

//! In-process stand-in for a Medusa head, served by axum on 127.0.0.1:0.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use medusa_remote::transport::MedusaClient;

/// What the mock head answers, and what it was asked.
#[derive(Default)]
pub struct HeadState {
    /// Status answers in order; the last one repeats forever.
    pub statuses: Mutex<VecDeque<Value>>,
    pub status_requests: AtomicUsize,
    pub media_requests: AtomicUsize,
    /// Body of every command acknowledgement.
    pub ack_body: Mutex<String>,
    /// `session/action[/value]` of every command received.
    pub commands: Mutex<Vec<String>>,
    pub snakes: Mutex<Vec<String>>,
    pub loaded_snakes: Mutex<Vec<String>>,
    pub search_terms: Mutex<Vec<String>>,
    pub index_requests: AtomicUsize,
}

impl HeadState {
    pub fn script(&self, statuses: impl IntoIterator<Item = Value>) {
        *self.statuses.lock().unwrap() = statuses.into_iter().collect();
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub fn status_requests(&self) -> usize {
        self.status_requests.load(Ordering::SeqCst)
    }

    pub fn media_requests(&self) -> usize {
        self.media_requests.load(Ordering::SeqCst)
    }
}

pub struct MockHead {
    pub base_url: String,
    pub state: Arc<HeadState>,
}

impl MockHead {
    pub async fn start() -> Self {
        let state = Arc::new(HeadState {
            ack_body: Mutex::new("0".into()),
            ..Default::default()
        });
        let app = Router::new()
            .route("/medusa/api/status/:session", get(status))
            .route("/medusa/api/media/:id", get(media))
            .route("/medusa/api/snake/:session/:action", get(command))
            .route("/medusa/api/snake/:session/:action/:value", get(command_with_value))
            .route("/medusa/api/snakes", get(snakes))
            .route("/medusa/api/snakes/queue", get(loaded_snakes))
            .route("/medusa/api/search", post(search))
            .route("/medusa/api/index", get(index))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn client(&self) -> MedusaClient {
        MedusaClient::new(&self.base_url, "/medusa/api").unwrap()
    }

    /// Wait until the head has served at least `n` status polls.
    pub async fn wait_for_polls(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.state.status_requests() < n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("head was not polled in time");
    }
}

pub fn playing_status(media_id: Value, elapsed: f64, total: f64) -> Value {
    json!({
        "media_id": media_id,
        "state": "playing",
        "elapsed": elapsed,
        "total": total,
        "mute": false,
        "audio": [[1, "English"], [2, "French"]],
        "subtitles": []
    })
}

pub fn ended_status() -> Value {
    json!({
        "media_id": 42,
        "state": "ended",
        "elapsed": 100,
        "total": 100,
        "mute": false,
        "audio": [],
        "subtitles": []
    })
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn status(State(head): State<Arc<HeadState>>, Path(session): Path<String>) -> Response {
    head.status_requests.fetch_add(1, Ordering::SeqCst);
    if session == "unknown" {
        return Json(json!({})).into_response();
    }
    let mut statuses = head.statuses.lock().unwrap();
    let answer = if statuses.len() > 1 {
        statuses.pop_front()
    } else {
        statuses.front().cloned()
    };
    match answer {
        Some(value) => Json(value).into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

async fn media(State(head): State<Arc<HeadState>>, Path(id): Path<u64>) -> Response {
    head.media_requests.fetch_add(1, Ordering::SeqCst);
    match id {
        42 => Json(json!({
            "category": "film",
            "name_one": "Alien",
            "name_two": ["Horror", "Science Fiction"],
            "year": 1979
        }))
        .into_response(),
        7 => Json(json!({
            "category": "television",
            "name_one": "Twin Peaks",
            "name_two": "2",
            "name_three": 9,
            "name_four": "Arbitrary Law"
        }))
        .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn command(
    State(head): State<Arc<HeadState>>,
    Path((session, action)): Path<(String, String)>,
) -> String {
    head.commands
        .lock()
        .unwrap()
        .push(format!("{}/{}", session, action));
    head.ack_body.lock().unwrap().clone()
}

async fn command_with_value(
    State(head): State<Arc<HeadState>>,
    Path((session, action, value)): Path<(String, String, String)>,
) -> String {
    head.commands
        .lock()
        .unwrap()
        .push(format!("{}/{}/{}", session, action, value));
    head.ack_body.lock().unwrap().clone()
}

async fn snakes(State(head): State<Arc<HeadState>>) -> Json<Value> {
    Json(json!({ "snakes": head.snakes.lock().unwrap().clone() }))
}

async fn loaded_snakes(State(head): State<Arc<HeadState>>) -> Json<Value> {
    Json(json!({ "snakes": head.loaded_snakes.lock().unwrap().clone() }))
}

async fn search(
    State(head): State<Arc<HeadState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Json<Value> {
    let term = form.get("term").cloned().unwrap_or_default();
    head.search_terms.lock().unwrap().push(term);
    Json(json!({
        "media": [
            { "id": 42, "category": "film", "name_one": "Alien", "name_two": "Horror", "year": 1979 },
            { "id": 7, "category": "television", "name_one": "Twin Peaks",
              "name_two": 2, "name_three": 9, "name_four": "Arbitrary Law" },
            { "id": "disc", "category": "film", "name_one": "Disc" },
            { "id": 9, "category": "podcast", "name_one": "Talk" }
        ]
    }))
}

async fn index(State(head): State<Arc<HeadState>>) -> &'static str {
    head.index_requests.fetch_add(1, Ordering::SeqCst);
    "0"
}
