mod common;

use std::path::Path;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use common::write_patterned;
use simpleaudio::http::{build_router, state::ServerState};
fn make_app(root: &Path) -> axum::Router {
    build_router(ServerState::new(root))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_range(uri: &str, range: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("range", range)
        .body(Body::empty())
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

fn header<'a>(response: &'a axum::response::Response, name: &str) -> &'a str {
    response.headers().get(name).unwrap().to_str().unwrap()
}

/// Library root with a 1000-byte `track.mp3`.
fn library() -> (tempfile::TempDir, Vec<u8>) {
    let dir = tempfile::tempdir().unwrap();
    let bytes = write_patterned(&dir.path().join("track.mp3"), 1000);
    (dir, bytes)
}

// ── Full GET ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn full_get_returns_200_with_whole_body() {
    let (dir, bytes) = library();
    let response = make_app(dir.path()).oneshot(get("/track.mp3")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-length"), "1000");
    assert_eq!(header(&response, "accept-ranges"), "bytes");
    assert_eq!(header(&response, "content-type"), "audio/mpeg");
    assert!(response.headers().get("content-range").is_none());
    assert_eq!(body_bytes(response).await, bytes);
}

#[tokio::test]
async fn head_returns_headers_without_body() {
    let (dir, _) = library();
    let request = Request::builder()
        .method("HEAD")
        .uri("/track.mp3")
        .body(Body::empty())
        .unwrap();
    let response = make_app(dir.path()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-length"), "1000");
    assert_eq!(header(&response, "accept-ranges"), "bytes");
    assert!(body_bytes(response).await.is_empty());
}

// ── Range GET ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn range_first_hundred_bytes() {
    let (dir, bytes) = library();
    let response = make_app(dir.path())
        .oneshot(get_range("/track.mp3", "bytes=0-99"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header(&response, "content-length"), "100");
    assert_eq!(header(&response, "content-range"), "bytes 0-99/1000");
    assert_eq!(header(&response, "accept-ranges"), "bytes");
    assert_eq!(body_bytes(response).await, bytes[..100].to_vec());
}

#[tokio::test]
async fn range_open_ended_runs_to_last_byte() {
    let (dir, bytes) = library();
    let response = make_app(dir.path())
        .oneshot(get_range("/track.mp3", "bytes=900-"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header(&response, "content-length"), "100");
    assert_eq!(header(&response, "content-range"), "bytes 900-999/1000");
    assert_eq!(body_bytes(response).await, bytes[900..].to_vec());
}

#[tokio::test]
async fn range_in_the_middle_seeks() {
    let (dir, bytes) = library();
    let response = make_app(dir.path())
        .oneshot(get_range("/track.mp3", "bytes=250-259"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header(&response, "content-range"), "bytes 250-259/1000");
    assert_eq!(body_bytes(response).await, bytes[250..260].to_vec());
}

#[tokio::test]
async fn range_suffix_serves_tail() {
    let (dir, bytes) = library();
    let response = make_app(dir.path())
        .oneshot(get_range("/track.mp3", "bytes=-10"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header(&response, "content-range"), "bytes 990-999/1000");
    assert_eq!(body_bytes(response).await, bytes[990..].to_vec());
}

#[tokio::test]
async fn range_start_past_end_is_416() {
    let (dir, _) = library();
    let response = make_app(dir.path())
        .oneshot(get_range("/track.mp3", "bytes=5000-"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(header(&response, "content-range"), "bytes */1000");
}

#[tokio::test]
async fn malformed_range_is_416_and_server_keeps_serving() {
    let (dir, _) = library();
    let app = make_app(dir.path());

    let response = app
        .clone()
        .oneshot(get_range("/track.mp3", "pages=1-2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);

    let response = app.oneshot(get("/track.mp3")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn multi_range_serves_first_range_only() {
    let (dir, bytes) = library();
    let response = make_app(dir.path())
        .oneshot(get_range("/track.mp3", "bytes=0-10,20-30"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header(&response, "content-range"), "bytes 0-10/1000");
    assert_eq!(body_bytes(response).await, bytes[..11].to_vec());
}

// ── Resolution ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_file_is_404() {
    let (dir, _) = library();
    let response = make_app(dir.path()).oneshot(get("/missing.mp3")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn directory_is_404() {
    let (dir, _) = library();
    std::fs::create_dir(dir.path().join("album")).unwrap();
    let response = make_app(dir.path()).oneshot(get("/album")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn parent_traversal_is_404() {
    let outer = tempfile::tempdir().unwrap();
    let root = outer.path().join("library");
    std::fs::create_dir(&root).unwrap();
    write_patterned(&outer.path().join("secret.mp3"), 10);

    let response = make_app(&root)
        .oneshot(get("/..%2Fsecret.mp3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn same_base_name_in_two_folders_serves_each_file() {
    let dir = tempfile::tempdir().unwrap();
    for sub in ["a", "b"] {
        std::fs::create_dir(dir.path().join(sub)).unwrap();
    }
    let first = write_patterned(&dir.path().join("a").join("x.mp3"), 64);
    std::fs::write(dir.path().join("b").join("x.mp3"), b"second file").unwrap();
    let app = make_app(dir.path());

    let response = app.clone().oneshot(get("/a/x.mp3")).await.unwrap();
    assert_eq!(body_bytes(response).await, first);

    let response = app.clone().oneshot(get("/b/x.mp3")).await.unwrap();
    assert_eq!(body_bytes(response).await, b"second file".to_vec());

    // No guessing by base name.
    let response = app.oneshot(get("/x.mp3")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn nested_track_is_served_with_its_content_type() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("Artist").join("Album");
    std::fs::create_dir_all(&nested).unwrap();
    let bytes = write_patterned(&nested.join("deep.flac"), 64);

    let response = make_app(dir.path())
        .oneshot(get("/Artist/Album/deep.flac"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), "audio/flac");
    assert_eq!(body_bytes(response).await, bytes);
}

#[tokio::test]
async fn relative_subpath_under_root_is_served() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    let bytes = write_patterned(&dir.path().join("sub").join("x.ogg"), 32);

    let response = make_app(dir.path()).oneshot(get("/sub/x.ogg")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, bytes);
}

#[tokio::test]
async fn percent_encoded_names_are_decoded() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = write_patterned(&dir.path().join("My Song #1.mp3"), 20);

    let response = make_app(dir.path())
        .oneshot(get("/My%20Song%20%231.mp3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, bytes);
}

// ── Listener ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn listener_binds_loopback_only() {
    let listener = simpleaudio::http::bind_loopback(0).await.unwrap();
    let addr = listener.local_addr().unwrap();
    assert!(addr.ip().is_loopback());
}

#[tokio::test]
async fn spawned_server_serves_and_shuts_down() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let (dir, _) = library();
    let listener = simpleaudio::http::bind_loopback(0).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
    let task = simpleaudio::http::spawn_server(
        listener,
        make_app(dir.path()),
        simpleaudio::http::IDLE_TIMEOUT,
        shutdown_rx,
    );

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /track.mp3 HTTP/1.1\r\nHost: localhost\r\nRange: bytes=0-9\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8_lossy(&raw);
    assert!(text.starts_with("HTTP/1.1 206"), "unexpected response:\n{text}");
    assert!(text.to_ascii_lowercase().contains("content-range: bytes 0-9/1000"));

    shutdown_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn idle_connection_is_closed() {
    use tokio::io::AsyncReadExt;

    let (dir, _) = library();
    let listener = simpleaudio::http::bind_loopback(0).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
    let _task = simpleaudio::http::spawn_server(
        listener,
        make_app(dir.path()),
        Duration::from_millis(200),
        shutdown_rx,
    );

    // Connect and never send a request line.
    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    let mut buf = Vec::new();
    let closed = tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buf)).await;
    assert!(closed.is_ok(), "server kept an idle connection open");

    let _ = shutdown_tx.send(());
}
