//! Node facade: owns the transport, the capability cache and the wallet
//! registry.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;
use tracing::debug;

use crate::blockchain::BlockChain;
use crate::capability::CorePrivileges;
use crate::config::RpcConfig;
use crate::error::{CoreError, ResponseParseError};
use crate::mempool::MemPool;
use crate::response::{json_type, NetworkInfo};
use crate::rpc::{DaemonResponse, HttpRpcClient, JsonRpcTransport};
use crate::wallet::Wallet;
use crate::wallets::Wallets;

const SIGN_WITH_WALLET: &str = "signrawtransactionwithwallet";
const SIGN_LEGACY: &str = "signrawtransaction";

/// Typed client for one daemon.
///
/// Network info and the derived [`CorePrivileges`] are fetched at most once
/// per client and never refreshed.
pub struct BitcoindClient {
    ctx: Arc<NodeContext>,
    wallets: Wallets,
    blockchain: BlockChain,
    mempool: MemPool,
}

impl BitcoindClient {
    /// Connect over HTTP(S) using `config`. No request is made until the
    /// first call.
    pub fn new(config: RpcConfig) -> Result<Self, CoreError> {
        let transport = HttpRpcClient::new(&config)?;
        Self::with_transport(Arc::new(transport), config)
    }

    /// Use a caller-provided transport, e.g. a test double.
    pub fn with_transport(
        transport: Arc<dyn JsonRpcTransport>,
        config: RpcConfig,
    ) -> Result<Self, CoreError> {
        config.check()?;
        let ctx = Arc::new(NodeContext {
            transport,
            config,
            network_info: OnceCell::new(),
            privileges: OnceCell::new(),
            loaded_wallets: Mutex::new(None),
        });
        Ok(Self {
            wallets: Wallets::new(Arc::clone(&ctx)),
            blockchain: BlockChain::new(Arc::clone(&ctx)),
            mempool: MemPool::new(Arc::clone(&ctx)),
            ctx,
        })
    }

    pub fn config(&self) -> &RpcConfig {
        &self.ctx.config
    }

    /// Issue an arbitrary call against the default context.
    pub async fn call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<DaemonResponse, CoreError> {
        self.ctx.call(method, None, params).await
    }

    pub async fn get_network_info(&self) -> Result<&NetworkInfo, CoreError> {
        self.ctx.network_info().await
    }

    pub async fn core_privileges(&self) -> Result<&CorePrivileges, CoreError> {
        self.ctx.core_privileges().await
    }

    pub fn wallets(&self) -> &Wallets {
        &self.wallets
    }

    /// Shorthand for `wallets().get(name)`.
    pub fn wallet(&self, name: Option<&str>) -> Result<Arc<Wallet>, CoreError> {
        self.wallets.get(name)
    }

    pub fn blockchain(&self) -> &BlockChain {
        &self.blockchain
    }

    pub fn mempool(&self) -> &MemPool {
        &self.mempool
    }
}

impl fmt::Debug for BitcoindClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitcoindClient")
            .field("config", &self.ctx.config)
            .finish_non_exhaustive()
    }
}

/// State shared by the client and every handle it hands out.
pub(crate) struct NodeContext {
    transport: Arc<dyn JsonRpcTransport>,
    config: RpcConfig,
    network_info: OnceCell<NetworkInfo>,
    privileges: OnceCell<CorePrivileges>,
    loaded_wallets: Mutex<Option<Vec<String>>>,
}

impl NodeContext {
    pub(crate) async fn call(
        &self,
        method: &str,
        endpoint: Option<&str>,
        params: Vec<serde_json::Value>,
    ) -> Result<DaemonResponse, CoreError> {
        self.transport.post(method, endpoint, params).await
    }

    pub(crate) fn scale(&self) -> u32 {
        self.config.scale
    }

    pub(crate) async fn network_info(&self) -> Result<&NetworkInfo, CoreError> {
        self.network_info
            .get_or_try_init(|| async {
                let result = self
                    .call("getnetworkinfo", None, Vec::new())
                    .await?
                    .require_result("getnetworkinfo")?;
                let info = NetworkInfo::from_value(&result)?;
                debug!(
                    version = info.version,
                    subversion = %info.subversion,
                    "network info cached"
                );
                Ok::<_, CoreError>(info)
            })
            .await
    }

    pub(crate) async fn core_privileges(&self) -> Result<&CorePrivileges, CoreError> {
        self.privileges
            .get_or_try_init(|| async {
                let info = self.network_info().await?;
                Ok::<_, CoreError>(CorePrivileges::from_network_info(info))
            })
            .await
    }

    /// Fail locally when capability checks are on and the node cannot
    /// load or unload wallets at runtime.
    pub(crate) async fn require_dynamic_wallets(&self, operation: &str) -> Result<(), CoreError> {
        if !self.config.validate_core_privileges {
            return Ok(());
        }
        let privileges = self.core_privileges().await?;
        if privileges.has_dynamic_wallets {
            return Ok(());
        }
        Err(CoreError::Capability(format!(
            "`{operation}` needs dynamic wallet support, node reports {} {}",
            privileges.name, privileges.agent_version
        )))
    }

    /// RPC used to sign with wallet keys on this node.
    pub(crate) async fn signing_method(&self) -> Result<&'static str, CoreError> {
        if !self.config.validate_core_privileges {
            return Ok(SIGN_LEGACY);
        }
        if self.core_privileges().await?.has_dynamic_wallets {
            Ok(SIGN_WITH_WALLET)
        } else {
            Ok(SIGN_LEGACY)
        }
    }

    /// Names from `listwallets`, cached until `force` or a load/unload.
    pub(crate) async fn loaded_wallets(&self, force: bool) -> Result<Vec<String>, CoreError> {
        if !force {
            let cached = self
                .loaded_wallets
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            if let Some(names) = cached {
                return Ok(names);
            }
        }

        let items = self
            .call("listwallets", None, Vec::new())
            .await?
            .into_array("listwallets")?;
        let names = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str().map(str::to_owned).ok_or_else(|| ResponseParseError {
                    context: "Method [listwallets]".to_owned(),
                    field: format!("result[{i}]"),
                    expected: "string",
                    got: json_type(item),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        *self
            .loaded_wallets
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(names.clone());
        Ok(names)
    }

    pub(crate) fn forget_loaded_wallets(&self) {
        *self
            .loaded_wallets
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}
