use std::path::{Component, Path as FsPath, PathBuf};

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use http_range_header::parse_range_header;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::http::state::ServerState;
use crate::media::mime::content_type_for;

/// A request path resolved to a regular file on disk.
#[derive(Debug, Clone)]
struct ServedFile {
    path: PathBuf,
    size: u64,
    mime: &'static str,
}

/// Resolve a decoded request path against the library root.
///
/// Only plain path segments are accepted; `..`, absolute paths and drive
/// prefixes resolve to nothing.
async fn resolve(state: &ServerState, rel: &str) -> Option<ServedFile> {
    let rel = FsPath::new(rel);
    let mut segments = 0usize;
    for component in rel.components() {
        match component {
            Component::Normal(_) => segments += 1,
            Component::CurDir => {}
            _ => return None,
        }
    }
    if segments == 0 {
        return None;
    }
    regular_file(state.root.join(rel)).await
}

async fn regular_file(path: PathBuf) -> Option<ServedFile> {
    let meta = tokio::fs::metadata(&path).await.ok()?;
    if !meta.is_file() {
        return None;
    }
    Some(ServedFile {
        mime: content_type_for(&path),
        size: meta.len(),
        path,
    })
}

/// Headers present on every successful file response (GET + HEAD).
fn file_headers(file: &ServedFile) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(file.mime));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(file.size));
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers
}

fn not_satisfiable(size: u64) -> Response {
    (
        StatusCode::RANGE_NOT_SATISFIABLE,
        [(header::CONTENT_RANGE, format!("bytes */{}", size))],
    )
        .into_response()
}

/// HEAD /{*path} -- headers of a full GET, no body. The file is not opened.
pub async fn serve_file_head(
    State(state): State<ServerState>,
    Path(rel): Path<String>,
) -> Response {
    match resolve(&state, &rel).await {
        Some(file) => (StatusCode::OK, file_headers(&file)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// GET /{*path} -- stream the full file, or one byte range of it when a
/// `Range` header is present.
pub async fn serve_file_get(
    State(state): State<ServerState>,
    Path(rel): Path<String>,
    req_headers: HeaderMap,
) -> Response {
    let Some(file) = resolve(&state, &rel).await else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let mut headers = file_headers(&file);

    let Some(range) = req_headers.get(header::RANGE) else {
        return match open_span(&file, 0, file.size).await {
            Ok(body) => (StatusCode::OK, headers, body).into_response(),
            Err(status) => status.into_response(),
        };
    };

    let Some((start, end)) = range.to_str().ok().and_then(|r| first_range(r, file.size)) else {
        tracing::debug!("Unsatisfiable range {:?} for {}", range, file.path.display());
        return not_satisfiable(file.size);
    };

    let Ok(content_range) = HeaderValue::from_str(&format!("bytes {}-{}/{}", start, end, file.size))
    else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    let length = end - start + 1;
    headers.insert(header::CONTENT_RANGE, content_range);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));

    match open_span(&file, start, length).await {
        Ok(body) => (StatusCode::PARTIAL_CONTENT, headers, body).into_response(),
        Err(status) => status.into_response(),
    }
}

/// Inclusive bounds of the first range in `value`, resolved against `size`.
/// Suffix and open-ended forms are supported; further ranges are ignored.
/// `None` when the header is malformed or nothing of it lies inside the file.
fn first_range(value: &str, size: u64) -> Option<(u64, u64)> {
    let parsed = parse_range_header(value).ok()?;
    let ranges = parsed.validate(size).ok()?;
    let first = ranges.into_iter().next()?;
    Some((*first.start(), *first.end()))
}

/// Body streaming `length` bytes of `file` starting at `start`.
async fn open_span(file: &ServedFile, start: u64, length: u64) -> Result<Body, StatusCode> {
    let mut handle = tokio::fs::File::open(&file.path).await.map_err(|e| {
        tracing::error!("Failed to open {}: {}", file.path.display(), e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    if start > 0 {
        handle
            .seek(std::io::SeekFrom::Start(start))
            .await
            .map_err(|e| {
                tracing::error!("Failed to seek to {} in {}: {}", start, file.path.display(), e);
                StatusCode::INTERNAL_SERVER_ERROR
            })?;
    }
    Ok(Body::from_stream(ReaderStream::new(handle.take(length))))
}
