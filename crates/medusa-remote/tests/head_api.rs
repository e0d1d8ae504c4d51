//! Transport client against a mock head.

mod common;

use common::MockHead;
use serde_json::json;

use medusa_proto::protocol::{MediaId, MediaMetadata, PlayerState, Track};
use medusa_remote::dispatch::{Command, NavCode};
use medusa_remote::transport::{Ack, MedusaClient, TransportError};

#[tokio::test]
async fn status_is_decoded_leniently() {
    let head = MockHead::start().await;
    head.state.script([json!({
        "media_id": "42",
        "state": "paused",
        "elapsed": "12.5",
        "total": 6000,
        "mute": 1,
        "audio": [[1, "English"]],
        "subtitles": null
    })]);

    let status = head.client().fetch_status("lounge").await.unwrap();
    assert_eq!(status.state, PlayerState::Paused);
    assert_eq!(status.media_id, MediaId::Catalog(42));
    assert_eq!(status.elapsed, 12.5);
    assert!(status.mute);
    assert_eq!(status.audio, vec![Track::new(1, "English")]);
    assert!(status.subtitles.is_empty());
}

#[tokio::test]
async fn unknown_snake_answers_defaults() {
    let head = MockHead::start().await;
    let status = head.client().fetch_status("unknown").await.unwrap();
    assert_eq!(status.media_id, MediaId::Empty);
    assert!(status.elapsed.is_nan());
}

#[tokio::test]
async fn metadata_by_category() {
    let head = MockHead::start().await;
    let client = head.client();

    match client.fetch_metadata(7).await.unwrap() {
        MediaMetadata::Television {
            show,
            season,
            episode,
            ..
        } => {
            assert_eq!(show, "Twin Peaks");
            assert_eq!((season, episode), (2, 9));
        }
        other => panic!("expected television, got {:?}", other),
    }

    let missing = client.fetch_metadata(1000).await;
    assert!(matches!(missing, Err(TransportError::Status(s)) if s.as_u16() == 404));
}

#[tokio::test]
async fn commands_carry_their_values() {
    let head = MockHead::start().await;
    let client = head.client();

    client.send_command("lounge", &Command::Pause).await.unwrap();
    client.send_command("lounge", &Command::JumpTo(0)).await.unwrap();
    client
        .send_command("lounge", &Command::Navigate(NavCode::Left))
        .await
        .unwrap();
    client
        .send_command("lounge", &Command::Subtitle(-1))
        .await
        .unwrap();

    assert_eq!(
        head.state.commands(),
        vec![
            "lounge/pause",
            "lounge/jump_to/0",
            "lounge/navigate/3",
            "lounge/subtitle/-1",
        ]
    );
}

#[tokio::test]
async fn ack_body_is_informational() {
    let head = MockHead::start().await;
    let client = head.client();

    *head.state.ack_body.lock().unwrap() = "1".into();
    assert_eq!(
        client.send_command("lounge", &Command::Mute).await.unwrap(),
        Ack::Failed
    );

    *head.state.ack_body.lock().unwrap() = "<html>".into();
    assert_eq!(
        client.send_command("lounge", &Command::Mute).await.unwrap(),
        Ack::Unrecognized("<html>".into())
    );
}

#[tokio::test]
async fn snake_lists() {
    let head = MockHead::start().await;
    *head.state.snakes.lock().unwrap() = vec!["lounge".into(), "bedroom".into()];
    *head.state.loaded_snakes.lock().unwrap() = vec!["bedroom".into()];
    let client = head.client();

    assert_eq!(client.list_snakes(false).await.unwrap(), vec!["lounge", "bedroom"]);
    assert_eq!(client.list_snakes(true).await.unwrap(), vec!["bedroom"]);
}

#[tokio::test]
async fn search_keeps_catalog_hits_it_can_show() {
    let head = MockHead::start().await;
    let hits = head.client().search("al ien").await.unwrap();

    let ids: Vec<u64> = hits.iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![42, 7]);
    assert_eq!(hits[1].display_name(), "Twin Peaks - S02E09 - Arbitrary Law");
    assert_eq!(*head.state.search_terms.lock().unwrap(), vec!["al ien"]);
}

#[tokio::test]
async fn index_refresh() {
    let head = MockHead::start().await;
    assert_eq!(head.client().refresh_index().await.unwrap(), Ack::Ok);
    assert_eq!(
        head.state
            .index_requests
            .load(std::sync::atomic::Ordering::SeqCst),
        1
    );
}

#[tokio::test]
async fn session_names_are_path_encoded() {
    let head = MockHead::start().await;
    head.client()
        .send_command("living room", &Command::Stop)
        .await
        .unwrap();
    assert_eq!(head.state.commands(), vec!["living room/stop"]);
}

#[tokio::test]
async fn unreachable_head_is_an_http_error() {
    let client = MedusaClient::new("http://127.0.0.1:9", "/medusa/api").unwrap();
    let err = client.fetch_status("lounge").await.unwrap_err();
    assert!(matches!(err, TransportError::Http(_)));
}
