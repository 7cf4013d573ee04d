use std::net::SocketAddr;

use axum::extract::Path;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use jjap_media_engine::api::client::MusicClient;
use jjap_media_engine::config::EngineConfig;

async fn login() -> impl IntoResponse {
    ([("X-CSRF-TOKEN", "issued-token")], Json(json!({ "ok": true })))
}

async fn me() -> Json<Value> {
    Json(json!({ "id": 3, "nickname": "listener", "email": "listener@example.com" }))
}

async fn catalog() -> Json<Value> {
    Json(json!([
        { "id": 1, "originalName": "first", "singer": "a", "playTime": 120 },
        { "id": 2, "originalName": "second", "singer": "b", "playTime": 240 }
    ]))
}

/// Upload endpoint: reports whether the CSRF token arrived.
async fn upload(headers: HeaderMap) -> Json<Value> {
    let csrf = headers
        .get("x-csrf-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(json!({ "csrf": csrf }))
}

/// One path, two representations: plain GET returns the details
/// document, a ranged GET returns media bytes.
async fn music_entry(Path(id): Path<u64>, headers: HeaderMap) -> Response {
    if headers.contains_key(header::RANGE) {
        ([(header::CONTENT_TYPE, "audio/mpeg")], vec![1u8; 64]).into_response()
    } else {
        Json(json!({
            "id": id,
            "originalName": "first",
            "singer": "a",
            "playTime": 120
        }))
        .into_response()
    }
}

async fn start_server() -> SocketAddr {
    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/users/me", get(me))
        .route("/musics", get(catalog).post(upload))
        .route("/musics/{id}", get(music_entry));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> MusicClient {
    let config = EngineConfig {
        base_url: format!("http://{}", addr),
        origin: "http://127.0.0.1:3000".to_string(),
        attempt_timeout_secs: 5,
    };
    MusicClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_list_and_user_endpoints() {
    let addr = start_server().await;
    let client = client_for(addr);

    let musics = client.list_musics(None).await.unwrap();
    assert_eq!(musics.len(), 2);
    assert_eq!(musics[1].original_name, "second");

    let user = client.current_user().await.unwrap();
    assert_eq!(user.nickname, "listener");
}

#[tokio::test]
async fn test_login_then_upload_carries_token() {
    let addr = start_server().await;
    let client = client_for(addr);

    client.login("listener@example.com", "pw").await.unwrap();

    let value = client
        .upload_music("song", "artist", "2026-08-28", "song.mp3", vec![0u8; 8])
        .await
        .unwrap();
    assert_eq!(
        value.get("csrf").and_then(Value::as_str),
        Some("issued-token")
    );

    // Explicit logout clears the token; the next upload has none.
    client.logout();
    let value = client
        .upload_music("song", "artist", "2026-08-28", "song.mp3", vec![0u8; 8])
        .await
        .unwrap();
    assert_eq!(value.get("csrf").and_then(Value::as_str), None);
}

#[tokio::test]
async fn test_details_and_stream_share_one_path() {
    let addr = start_server().await;
    let client = client_for(addr);

    let details = client.music_details(1).await.unwrap();
    assert_eq!(details.id, 1);
    assert_eq!(details.original_name, "first");

    // A ranged request to the same URL selects the media
    // representation.
    let resource = client.media_resource(1);
    let response = reqwest::Client::new()
        .get(&resource.url)
        .header("Range", "bytes=0-63")
        .send()
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("audio/mpeg")
    );
}

#[tokio::test]
async fn test_media_resource_points_at_stream_url() {
    let addr = start_server().await;
    let client = client_for(addr);

    let resource = client.media_resource(9);
    assert_eq!(resource.id, 9);
    assert_eq!(resource.url, format!("http://{}/musics/9", addr));
    assert_eq!(resource.probe_path(), "/musics/9");
}
