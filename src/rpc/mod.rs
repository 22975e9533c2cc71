//! Request/response surface for the host runtime.

pub mod backend;
pub mod bridge;

/// Errors a caller can see. Extraction and persistence failures never appear
/// here; they degrade inside the stores.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("track index {index} out of range (playlist has {len} tracks)")]
    IndexOutOfRange { index: i64, len: usize },
    #[error("unknown method: {0}")]
    UnknownMethod(String),
    #[error("invalid params for {method}: {source}")]
    InvalidParams {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RpcError {
    /// Stable machine-readable name sent in error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            RpcError::IndexOutOfRange { .. } => "index_out_of_range",
            RpcError::UnknownMethod(_) => "unknown_method",
            RpcError::InvalidParams { .. } => "invalid_params",
        }
    }
}
