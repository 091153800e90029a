//! Native JSON-RPC 1.0 client for Bitcoin-protocol daemons.
//!
//! Implements [`JsonRpcTransport`](super::JsonRpcTransport) over HTTP(S)
//! using `reqwest`, with basic auth (explicit or cookie file), optional
//! custom CA bundle and optional outbound rate limiting.

mod client;
mod connection;
mod protocol;

pub use client::HttpRpcClient;
