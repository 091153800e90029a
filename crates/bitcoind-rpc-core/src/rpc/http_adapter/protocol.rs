use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{ConnectionError, CoreError, DaemonError};
use crate::rpc::types::{DaemonResponse, DaemonResponseError};

const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

#[derive(serde::Serialize)]
pub(super) struct JsonRpcRequest<'a> {
    pub(super) jsonrpc: &'static str,
    pub(super) id: &'a str,
    pub(super) method: &'a str,
    pub(super) params: &'a [serde_json::Value],
}

#[derive(serde::Deserialize)]
pub(super) struct JsonRpcResponse {
    #[serde(default)]
    pub(super) id: serde_json::Value,
    pub(super) result: Option<serde_json::Value>,
    pub(super) error: Option<serde_json::Value>,
}

/// Request id generator: `[nonce-]<method>-<unix micros>-<sequence>`.
pub(super) struct RequestIds {
    nonce: Option<String>,
    sequence: AtomicU64,
}

impl RequestIds {
    pub(super) fn new(nonce: Option<String>) -> Self {
        Self {
            nonce: nonce.filter(|n| !n.is_empty()),
            sequence: AtomicU64::new(0),
        }
    }

    pub(super) fn next(&self, method: &str) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros())
            .unwrap_or(0);
        let method = method.to_ascii_lowercase();
        match &self.nonce {
            Some(nonce) => format!("{nonce}-{method}-{micros}-{seq}"),
            None => format!("{method}-{micros}-{seq}"),
        }
    }
}

/// Decode a daemon reply body and validate it against the sent request id.
///
/// The id check runs before the error check: a reply that belongs to some
/// other request is rejected even when it carries an error.
pub(super) fn decode_response(
    sent_id: &str,
    http_status: u16,
    headers: HashMap<String, String>,
    body: &str,
) -> Result<DaemonResponse, CoreError> {
    let decoded: JsonRpcResponse =
        serde_json::from_str(body).map_err(|e| ConnectionError::NotJson {
            status: http_status,
            reason: e.to_string(),
        })?;

    let received = match &decoded.id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if received != sent_id {
        return Err(DaemonError::IdMismatch {
            sent: sent_id.to_owned(),
            received,
        }
        .into());
    }

    if let Some(err) = decoded.error {
        return Err(parse_jsonrpc_error(err));
    }

    Ok(DaemonResponse {
        http_status,
        id: received,
        result: decoded.result.unwrap_or(serde_json::Value::Null),
        headers,
    })
}

/// Turn a JSON-RPC `error` member into a [`DaemonError`].
///
/// A missing code reads as `0` and a missing message as a generic one.
/// Non-object errors keep their text as the message.
pub(super) fn parse_jsonrpc_error(err: serde_json::Value) -> CoreError {
    let error = match err {
        serde_json::Value::Object(map) => DaemonResponseError {
            code: map
                .get("code")
                .and_then(serde_json::Value::as_i64)
                .unwrap_or(0),
            message: map
                .get("message")
                .and_then(serde_json::Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or(DEFAULT_ERROR_MESSAGE)
                .to_owned(),
            data: map.get("data").filter(|d| !d.is_null()).cloned(),
        },
        serde_json::Value::String(message) if !message.is_empty() => DaemonResponseError {
            code: 0,
            message,
            data: None,
        },
        other => DaemonResponseError {
            code: 0,
            message: format!("{DEFAULT_ERROR_MESSAGE}: {other}"),
            data: None,
        },
    };
    DaemonError::Response(error).into()
}
