//! The normalized result of a single JSON-RPC exchange.

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{CoreError, DaemonError, ResponseParseError};
use crate::response::json_type;
use crate::validator::is_hash;

// ==============================================================================
// HTTP Method
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Delete,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

// ==============================================================================
// Daemon Response
// ==============================================================================

/// A successful JSON-RPC reply. Failed replies never become a
/// `DaemonResponse`; they surface as [`CoreError`] from the transport.
#[derive(Debug, Clone)]
pub struct DaemonResponse {
    pub http_status: u16,
    pub id: String,
    /// The `result` member verbatim. `Null` is legal for some methods.
    pub result: serde_json::Value,
    /// Response headers, names lower-cased.
    pub headers: HashMap<String, String>,
}

impl DaemonResponse {
    /// The result, or `MissingResult` when the daemon returned `null`.
    pub fn require_result(self, method: &str) -> Result<serde_json::Value, CoreError> {
        if self.result.is_null() {
            return Err(DaemonError::MissingResult {
                method: method.to_owned(),
            }
            .into());
        }
        Ok(self.result)
    }

    pub fn into_string(self, method: &str) -> Result<String, CoreError> {
        match self.require_result(method)? {
            serde_json::Value::String(s) => Ok(s),
            other => Err(unexpected_result(method, "string", &other)),
        }
    }

    pub fn into_object(
        self,
        method: &str,
    ) -> Result<serde_json::Map<String, serde_json::Value>, CoreError> {
        match self.require_result(method)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(unexpected_result(method, "object", &other)),
        }
    }

    pub fn into_array(self, method: &str) -> Result<Vec<serde_json::Value>, CoreError> {
        match self.require_result(method)? {
            serde_json::Value::Array(items) => Ok(items),
            other => Err(unexpected_result(method, "array", &other)),
        }
    }

    pub fn into_u64(self, method: &str) -> Result<u64, CoreError> {
        let value = self.require_result(method)?;
        value
            .as_u64()
            .ok_or_else(|| unexpected_result(method, "int", &value))
    }

    /// A 64-character lowercase hex result parsed into a typed hash.
    pub fn into_hash<H: FromStr>(self, method: &str) -> Result<H, CoreError> {
        let value = self.require_result(method)?;
        value
            .as_str()
            .filter(|s| is_hash(s, 64))
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| unexpected_result(method, "hash", &value))
    }

    /// Fail unless the daemon answered with HTTP 200.
    pub fn ensure_ok_status(&self, method: &str) -> Result<(), CoreError> {
        if self.http_status != 200 {
            return Err(DaemonError::HttpStatus {
                method: method.to_owned(),
                status: self.http_status,
            }
            .into());
        }
        Ok(())
    }
}

pub(crate) fn unexpected_result(
    method: &str,
    expected: &'static str,
    got: &serde_json::Value,
) -> CoreError {
    ResponseParseError {
        context: format!("Method [{method}]"),
        field: "result".to_owned(),
        expected,
        got: json_type(got),
    }
    .into()
}

// ==============================================================================
// Daemon Response Error
// ==============================================================================

/// The `error` member of a JSON-RPC reply.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct DaemonResponseError {
    pub code: i64,
    pub message: String,
    pub data: Option<serde_json::Value>,
}
