use std::collections::HashMap;
use std::num::NonZeroU32;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{header, Url};
use tracing::{debug, trace};

use crate::config::RpcConfig;
use crate::error::{ConnectionError, CoreError};
use crate::rpc::types::{DaemonResponse, HttpMethod};
use crate::rpc::JsonRpcTransport;

use super::connection::{base_url, endpoint_url, resolve_auth};
use super::protocol::{decode_response, JsonRpcRequest, RequestIds};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// JSON-RPC 1.0 client for a Bitcoin-protocol daemon over HTTP(S).
pub struct HttpRpcClient {
    client: reqwest::Client,
    base_url: Url,
    auth: Option<(String, String)>,
    limiter: Option<DirectRateLimiter>,
    ids: RequestIds,
}

impl HttpRpcClient {
    /// Build a client from `config`.
    ///
    /// Authentication precedence:
    /// 1. explicit `username` + `password`
    /// 2. cookie file (`username:password`)
    /// 3. no auth
    ///
    /// With `tls` set, the optional PEM `ca_bundle` is trusted on top of the
    /// built-in roots.
    pub fn new(config: &RpcConfig) -> Result<Self, CoreError> {
        config.check()?;
        let auth = resolve_auth(
            config.username.as_deref(),
            config.password.as_deref(),
            config.cookie_file.as_deref(),
        )?;
        let base_url = base_url(config.tls, &config.host, config.port)?;

        let mut builder = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .tcp_nodelay(true);
        if config.tls {
            if let Some(path) = &config.ca_bundle {
                let pem = std::fs::read(path).map_err(|e| {
                    CoreError::Config(format!("failed to read CA bundle {}: {e}", path.display()))
                })?;
                let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                    CoreError::Config(format!("invalid CA bundle {}: {e}", path.display()))
                })?;
                builder = builder.add_root_certificate(cert);
            }
        }
        let client = builder.build().map_err(ConnectionError::Transport)?;

        let limiter = match config.requests_per_second {
            None => None,
            Some(limit) => {
                let limit = NonZeroU32::new(limit).ok_or_else(|| {
                    CoreError::Config("requests_per_second must be at least 1".to_owned())
                })?;
                Some(RateLimiter::direct(Quota::per_second(limit)))
            }
        };

        Ok(Self {
            client,
            base_url,
            auth,
            limiter,
            ids: RequestIds::new(config.request_id_nonce.clone()),
        })
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

#[async_trait]
impl JsonRpcTransport for HttpRpcClient {
    async fn call(
        &self,
        method: &str,
        endpoint: Option<&str>,
        params: Vec<serde_json::Value>,
        http_method: HttpMethod,
    ) -> Result<DaemonResponse, CoreError> {
        let url = endpoint_url(&self.base_url, endpoint)?;
        self.wait_for_rate_limit().await;
        let id = self.ids.next(method);
        debug!(
            rpc.id = %id,
            rpc.method = method,
            rpc.endpoint = endpoint.unwrap_or(""),
            rpc.params = params.len(),
            %http_method,
            "rpc call"
        );
        let req = JsonRpcRequest {
            jsonrpc: "1.0",
            id: &id,
            method,
            params: &params,
        };

        let mut builder = self
            .client
            .request(to_reqwest_method(http_method), url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&req);
        if let Some((ref user, ref pass)) = self.auth {
            builder = builder.basic_auth(user, Some(pass));
        }

        let response = builder.send().await.map_err(ConnectionError::Transport)?;
        let status = response.status();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_owned(), v.to_owned()))
            })
            .collect();

        let body = response.text().await.map_err(ConnectionError::Transport)?;
        debug!(rpc.id = %id, rpc.method = method, %status, body_len = body.len(), "rpc response");
        trace!(rpc.id = %id, rpc.method = method, body = %body, "rpc response body");

        decode_response(&id, status.as_u16(), headers, &body)
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}
