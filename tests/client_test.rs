use std::{collections::HashMap, net::SocketAddr, time::Duration};

use axum::{
    Json, Router,
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use toptracks::config::TimeRange;
use toptracks::error::Error;
use toptracks::spotify::{SpotifyClient, TrackApi};

fn images() -> Value {
    json!([
        { "url": "https://i.scdn.co/image/640", "height": 640, "width": 640 },
        { "url": "https://i.scdn.co/image/300", "height": 300, "width": 300 },
        { "url": "https://i.scdn.co/image/64", "height": 64, "width": 64 }
    ])
}

fn top_track(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "artists": [{ "id": "a1", "name": "Artist One" }, { "id": "a2", "name": "Artist Two" }],
        "album": { "id": "al1", "name": "Top Album", "images": images() },
        "duration_ms": 185_000,
        "external_urls": { "spotify": format!("https://open.spotify.com/track/{id}") },
        "preview_url": null,
        "popularity": 80
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some("Bearer tok123")
}

async fn top_tracks(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "status": 401, "message": "Invalid access token" } })),
        );
    }

    let name = format!(
        "{}-{}",
        params.get("time_range").cloned().unwrap_or_default(),
        params.get("limit").cloned().unwrap_or_default()
    );
    (
        StatusCode::OK,
        Json(json!({
            "items": [top_track("t1", &name), top_track("t2", "second")],
            "total": 2,
            "next": null
        })),
    )
}

async fn album(headers: HeaderMap, Path(id): Path<String>) -> impl IntoResponse {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    if id != "album42" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "status": 404, "message": "Non existing id" } })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "id": "album42",
            "name": "The Album",
            "images": images(),
            "tracks": {
                "items": [
                    {
                        "id": "s1",
                        "name": "Opener",
                        "artists": [{ "id": "a1", "name": "Band" }],
                        "duration_ms": 1000,
                        "external_urls": { "spotify": "https://open.spotify.com/track/s1" },
                        "preview_url": "https://p.scdn.co/mp3-preview/s1"
                    },
                    {
                        "id": "s2",
                        "name": "Closer",
                        "artists": [{ "id": "a1", "name": "Band" }],
                        "duration_ms": 2000,
                        "external_urls": { "spotify": "https://open.spotify.com/track/s2" },
                        "preview_url": null
                    }
                ],
                "total": 2,
                "next": null
            }
        })),
    )
}

async fn spawn_api() -> SocketAddr {
    let app = Router::new()
        .route("/v1/me/top/tracks", get(top_tracks))
        .route("/v1/albums/{id}", get(album))
        .route("/broken/me/top/tracks", get(|| async { "this is not json" }))
        .route(
            "/shape/me/top/tracks",
            get(|| async { Json(json!({ "tracks": [] })) }),
        )
        .route(
            "/slow/me/top/tracks",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({ "items": [] }))
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(base: String, timeout: Duration) -> SpotifyClient {
    let http = reqwest::Client::builder().timeout(timeout).build().unwrap();
    SpotifyClient::with_client(http, base)
}

#[tokio::test]
async fn test_fetch_top_tracks() {
    let addr = spawn_api().await;
    let api = client(format!("http://{addr}/v1/"), Duration::from_secs(5));

    let tracks = api
        .fetch_top_tracks("tok123", TimeRange::ShortTerm, 2)
        .await
        .unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].name, "short_term-2");
    assert_eq!(tracks[1].name, "second");
    assert_eq!(tracks[0].album.images.len(), 3);
    assert_eq!(tracks[0].artists[1].name, "Artist Two");
    assert_eq!(tracks[0].preview_url, None);
}

#[tokio::test]
async fn test_invalid_token_is_http_401() {
    let addr = spawn_api().await;
    let api = client(format!("http://{addr}/v1"), Duration::from_secs(5));

    let err = api
        .fetch_top_tracks("expired", TimeRange::MediumTerm, 20)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Http { status: 401 }));
    assert!(err.needs_reauthentication());
}

#[tokio::test]
async fn test_fetch_album_tracks_attaches_album() {
    let addr = spawn_api().await;
    let api = client(format!("http://{addr}/v1"), Duration::from_secs(5));

    let tracks = api.fetch_album_tracks("album42", "tok123").await.unwrap();

    let names: Vec<_> = tracks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Opener", "Closer"]);
    for track in &tracks {
        assert_eq!(track.album.name, "The Album");
        assert_eq!(track.album.images.len(), 3);
    }
}

#[tokio::test]
async fn test_unknown_album_is_http_404() {
    let addr = spawn_api().await;
    let api = client(format!("http://{addr}/v1"), Duration::from_secs(5));

    let err = api.fetch_album_tracks("missing", "tok123").await.unwrap_err();
    assert!(matches!(err, Error::Http { status: 404 }));
}

#[tokio::test]
async fn test_bad_album_id_is_rejected_before_any_request() {
    let api = client("http://127.0.0.1:9/v1".to_string(), Duration::from_secs(1));

    for id in ["", "   ", "../me", "abc?x=1"] {
        let err = api.fetch_album_tracks(id, "tok123").await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)), "{id:?}: {err:?}");
    }
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let addr = spawn_api().await;

    let broken = client(format!("http://{addr}/broken"), Duration::from_secs(5));
    let err = broken
        .fetch_top_tracks("tok123", TimeRange::MediumTerm, 20)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));

    let wrong_shape = client(format!("http://{addr}/shape"), Duration::from_secs(5));
    let err = wrong_shape
        .fetch_top_tracks("tok123", TimeRange::MediumTerm, 20)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn test_slow_response_is_timeout() {
    let addr = spawn_api().await;
    let api = client(format!("http://{addr}/slow"), Duration::from_millis(200));

    let err = api
        .fetch_top_tracks("tok123", TimeRange::MediumTerm, 20)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client(format!("http://{addr}/v1"), Duration::from_secs(5));
    let err = api
        .fetch_top_tracks("tok123", TimeRange::MediumTerm, 20)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Network(_)), "{err:?}");
}
