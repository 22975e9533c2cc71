//! Line-delimited JSON transport between the host runtime and [`Backend`].
//!
//! Request:  `{"id": 7, "method": "load_track", "params": 3}`
//! Success:  `{"id": 7, "result": {...}}`
//! Failure:  `{"id": 7, "error": {"kind": "index_out_of_range", "message": "..."}}`
//!
//! `params` may also be a one-element array, which is how the host passes
//! positional arguments.

use std::io::{BufRead, Write};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::rpc::backend::Backend;
use crate::rpc::RpcError;

#[derive(Debug, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Response {
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    fn ok(id: Value, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Value, kind: &str, message: String) -> Self {
        Self {
            id,
            result: None,
            error: Some(ErrorBody {
                kind: kind.to_string(),
                message,
            }),
        }
    }
}

/// Decode the params of `method`, unwrapping a one-element positional array.
fn params<T: DeserializeOwned>(method: &str, params: Value) -> Result<T, RpcError> {
    let value = match params {
        Value::Array(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    };
    serde_json::from_value(value).map_err(|source| RpcError::InvalidParams {
        method: method.to_string(),
        source,
    })
}

/// Run one call against the backend.
pub fn dispatch(backend: &Backend, method: &str, raw: Value) -> Result<Value, RpcError> {
    let result = match method {
        "get_playlist" => json!(backend.get_playlist()),
        "get_initial_track" => json!(backend.get_initial_track()),
        "load_track" => json!(backend.load_track(params(method, raw)?)?),
        "get_volume" => json!(backend.get_volume()),
        "set_volume" => json!(backend.set_volume(params(method, raw)?)),
        "get_repeat" => json!(backend.get_repeat()),
        "set_repeat" => json!(backend.set_repeat(params(method, raw)?)),
        other => return Err(RpcError::UnknownMethod(other.to_string())),
    };
    Ok(result)
}

/// Handle one request line. Never fails: every problem becomes an error response.
pub fn handle_line(backend: &Backend, line: &str) -> Response {
    let request: Request = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => return Response::err(Value::Null, "parse_error", e.to_string()),
    };

    tracing::debug!("rpc call {}", request.method);
    match dispatch(backend, &request.method, request.params) {
        Ok(result) => Response::ok(request.id, result),
        Err(e) => {
            tracing::warn!("rpc {} rejected: {}", request.method, e);
            Response::err(request.id, e.kind(), e.to_string())
        }
    }
}

/// Serve requests from `input` until it closes, one at a time, writing each
/// response as a single line to `output`.
pub fn run(backend: &Backend, input: impl BufRead, mut output: impl Write) -> std::io::Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(backend, &line);
        serde_json::to_writer(&mut output, &response)?;
        output.write_all(b"\n")?;
        output.flush()?;
    }
    Ok(())
}
