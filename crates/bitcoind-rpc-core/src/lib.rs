//! Typed JSON-RPC client for Bitcoin-protocol daemons.
//!
//! [`BitcoindClient`] is the entry point: it owns the transport, the node
//! capability cache and the wallet registry. Wallet handles issue
//! wallet-scoped calls and build transactions through
//! [`PrepareTransaction`].

pub mod amount;
pub mod blockchain;
pub mod capability;
pub mod client;
pub mod config;
pub mod error;
pub mod mempool;
pub mod prepare;
pub mod response;
pub mod rpc;
pub mod validator;
pub mod wallet;
pub mod wallets;

#[cfg(test)]
pub(crate) mod test_util;

pub use amount::Amount;
pub use capability::{Coin, CorePrivileges};
pub use client::BitcoindClient;
pub use config::RpcConfig;
pub use error::{ConnectionError, CoreError, DaemonError, ResponseParseError};
pub use prepare::{ChangeAddressResolver, Fee, PrepareTransaction};
pub use wallet::Wallet;
pub use wallets::Wallets;
