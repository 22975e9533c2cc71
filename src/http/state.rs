use std::path::PathBuf;

/// Shared state injected into the file handlers via axum::extract::State.
/// Read-only after startup; the server never touches the cache or config.
#[derive(Clone, Debug)]
pub struct ServerState {
    /// Library root every request path is resolved against.
    pub root: PathBuf,
}

impl ServerState {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}
