//! Scenario tests for the Spotify client against a local mock API.
//!
//! # Invariants under test
//! - Pages are fetched by following `next` and concatenated in order.
//! - A forward move is sent as `insert_before = to + 1`; a backward one as `to`.
//! - 429 answers are retried `max_retries` times, then surface as `RateLimited`;
//!   an over-long `Retry-After` is reported at once.
//! - Other non-2xx answers surface as `ApiError::Api` with the API's message.
//! - The full fetch -> sort -> reconcile flow issues exactly the planned PUTs.

use std::time::Duration;

use greyris_reconcile::{sort_collection, SortOptions};
use greyris_spotify::{ApiError, PlaylistId, SpotifyClient};
use httpmock::prelude::*;
use serde_json::{json, Value};

const ID: &str = "37i9dQZF1DXcBWIGoYBM5M";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn client(server: &MockServer) -> SpotifyClient {
    SpotifyClient::new_with_base_url(
        "tok".to_string(),
        server.base_url(),
        Duration::from_secs(5),
    )
    .expect("client")
}

fn playlist() -> PlaylistId {
    PlaylistId::parse(ID).expect("id")
}

fn tracks_path() -> String {
    format!("/playlists/{ID}/tracks")
}

fn track(uri: &str, artist: &str, date: &str, number: i64) -> Value {
    json!({
        "track": {
            "uri": uri,
            "artists": [{"name": artist}],
            "album": {"release_date": date},
            "disc_number": 1,
            "track_number": number
        }
    })
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_follows_next_and_keeps_order() {
    let server = MockServer::start_async().await;
    let next = format!("{}{}?offset=2&limit=2", server.base_url(), tracks_path());

    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(tracks_path())
                .query_param("offset", "0")
                .query_param("limit", "2")
                .header("authorization", "Bearer tok");
            then.status(200).json_body(json!({
                "items": [
                    track("spotify:track:1", "Queen", "1975-11-21", 1),
                    track("spotify:track:2", "The Beatles", "1969-09-26", 1)
                ],
                "next": next,
                "total": 3
            }));
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(GET).path(tracks_path()).query_param("offset", "2");
            then.status(200).json_body(json!({
                "items": [{"track": null}],
                "next": null,
                "total": 3
            }));
        })
        .await;

    let els = client(&server)
        .with_page_limit(2)
        .fetch_items(&playlist())
        .await
        .expect("fetch");
    first.assert_async().await;
    second.assert_async().await;

    let uris: Vec<&str> = els.iter().map(|e| e.id.uri.as_str()).collect();
    assert_eq!(uris, vec!["spotify:track:1", "spotify:track:2", ""]);
    assert_eq!(els[1].key.group_key(), "beatles");
    assert_eq!(els[1].key.tie_break, 1001);
}

#[tokio::test]
async fn not_found_maps_to_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(tracks_path());
            then.status(404)
                .json_body(json!({"error": {"status": 404, "message": "Not found."}}));
        })
        .await;

    let err = client(&server).fetch_items(&playlist()).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Api {
            status: 404,
            message: "Not found.".to_string(),
        }
    );
}

#[tokio::test]
async fn rate_limit_is_retried_then_reported() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path(tracks_path());
            then.status(429).header("Retry-After", "0");
        })
        .await;

    let err = client(&server)
        .with_max_retries(2)
        .fetch_items(&playlist())
        .await
        .unwrap_err();
    mock.assert_hits_async(3).await;
    assert_eq!(err, ApiError::RateLimited { retry_after_secs: 0 });
}

#[tokio::test]
async fn overlong_retry_after_is_reported_without_waiting() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path(tracks_path());
            then.status(429).header("Retry-After", "86400");
        })
        .await;

    let err = tokio::time::timeout(
        Duration::from_secs(10),
        client(&server).with_max_retries(3).fetch_items(&playlist()),
    )
    .await
    .expect("must not sleep through Retry-After")
    .unwrap_err();
    mock.assert_hits_async(1).await;
    assert_eq!(err, ApiError::RateLimited { retry_after_secs: 86400 });
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

#[tokio::test]
async fn forward_move_inserts_after_target() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(tracks_path())
                .json_body(json!({"range_start": 1, "insert_before": 4, "range_length": 1}));
            then.status(200).json_body(json!({"snapshot_id": "s2"}));
        })
        .await;

    client(&server)
        .move_item(&playlist(), 1, 3)
        .await
        .expect("move");
    mock.assert_async().await;
}

#[tokio::test]
async fn backward_move_inserts_at_target() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(tracks_path())
                .json_body(json!({"range_start": 3, "insert_before": 0, "range_length": 1}));
            then.status(200).json_body(json!({"snapshot_id": "s2"}));
        })
        .await;

    client(&server)
        .move_item(&playlist(), 3, 0)
        .await
        .expect("move");
    mock.assert_async().await;
}

// ---------------------------------------------------------------------------
// Full flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sort_collection_issues_planned_reorder() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(tracks_path());
            then.status(200).json_body(json!({
                "items": [
                    track("spotify:track:b", "The Beatles", "1969-09-26", 1),
                    track("spotify:track:a", "ABBA", "1976-10-11", 1)
                ],
                "next": null
            }));
        })
        .await;
    let put = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(tracks_path())
                .json_body(json!({"range_start": 1, "insert_before": 0, "range_length": 1}));
            then.status(200).json_body(json!({"snapshot_id": "s2"}));
        })
        .await;

    let c = client(&server);
    let report = sort_collection(ID, &c, &c, SortOptions::default())
        .await
        .expect("sort");
    put.assert_hits_async(1).await;

    assert_eq!(report.total, 2);
    assert_eq!(report.moves.len(), 1);
    assert_eq!((report.moves[0].from, report.moves[0].to), (1, 0));
}

#[tokio::test]
async fn dry_run_never_writes() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(tracks_path());
            then.status(200).json_body(json!({
                "items": [
                    track("spotify:track:b", "Zappa", "1969", 1),
                    track("spotify:track:a", "ABBA", "1976", 1)
                ],
                "next": null
            }));
        })
        .await;
    let put = server
        .mock_async(|when, then| {
            when.method(PUT).path(tracks_path());
            then.status(200).json_body(json!({"snapshot_id": "s2"}));
        })
        .await;

    let c = client(&server);
    let report = sort_collection(ID, &c, &c, SortOptions { dry_run: true })
        .await
        .expect("dry run");
    put.assert_hits_async(0).await;
    assert!(report.dry_run);
    assert_eq!(report.moves.len(), 1);
}
