//! JSON-RPC transport layer.
//!
//! Defines the [`JsonRpcTransport`] trait and provides an HTTP
//! implementation ([`HttpRpcClient`]) plus a scripted test double
//! (`mock::MockTransport`).

mod http_adapter;
#[cfg(test)]
pub mod mock;
pub mod types;

pub use http_adapter::HttpRpcClient;
pub use types::{DaemonResponse, DaemonResponseError, HttpMethod};

use async_trait::async_trait;

use crate::error::CoreError;

/// One JSON-RPC round trip against the daemon.
///
/// Implementations build the envelope, authenticate, check the echoed id
/// and turn a JSON-RPC `error` member into [`CoreError::Daemon`]. They never
/// retry.
#[async_trait]
pub trait JsonRpcTransport: Send + Sync {
    /// Issue `method` with positional `params`.
    ///
    /// `endpoint` is a path relative to the daemon root, e.g. `wallet/hot`;
    /// `None` targets the default context.
    async fn call(
        &self,
        method: &str,
        endpoint: Option<&str>,
        params: Vec<serde_json::Value>,
        http_method: HttpMethod,
    ) -> Result<DaemonResponse, CoreError>;

    async fn post(
        &self,
        method: &str,
        endpoint: Option<&str>,
        params: Vec<serde_json::Value>,
    ) -> Result<DaemonResponse, CoreError> {
        self.call(method, endpoint, params, HttpMethod::Post).await
    }
}
