//! Per-client wallet registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use crate::client::NodeContext;
use crate::error::CoreError;
use crate::validator::{is_new_wallet_name, is_wallet_name};
use crate::wallet::{check_created_or_loaded, Wallet};

/// Hands out one shared [`Wallet`] per name, matched case-insensitively.
pub struct Wallets {
    ctx: Arc<NodeContext>,
    wallets: Mutex<HashMap<String, Arc<Wallet>>>,
}

impl Wallets {
    pub(crate) fn new(ctx: Arc<NodeContext>) -> Self {
        Self {
            ctx,
            wallets: Mutex::new(HashMap::new()),
        }
    }

    /// The handle for `name`, `None` meaning the node's default wallet.
    pub fn get(&self, name: Option<&str>) -> Result<Arc<Wallet>, CoreError> {
        if let Some(name) = name {
            if !is_wallet_name(name) {
                return Err(CoreError::Validation(format!("invalid wallet name `{name}`")));
            }
        }
        let key = name.map(str::to_lowercase).unwrap_or_default();

        let mut wallets = self.wallets.lock().unwrap_or_else(PoisonError::into_inner);
        let wallet = wallets.entry(key).or_insert_with(|| {
            Arc::new(Wallet::new(Arc::clone(&self.ctx), name.map(str::to_owned)))
        });
        Ok(Arc::clone(wallet))
    }

    /// `createwallet`, returning the registered handle marked as loaded.
    pub async fn create(&self, name: &str, suppress_warning: bool) -> Result<Arc<Wallet>, CoreError> {
        if !is_new_wallet_name(name) {
            return Err(CoreError::Validation(format!(
                "wallet name `{name}` must be 3-40 word characters or dashes"
            )));
        }
        self.ctx.require_dynamic_wallets("createwallet").await?;

        let result = self
            .ctx
            .call("createwallet", None, vec![serde_json::json!(name)])
            .await?
            .into_object("createwallet")?;
        check_created_or_loaded("createwallet", name, &result, suppress_warning)?;

        let wallet = self.get(Some(name))?;
        wallet.mark_loaded(true);
        self.ctx.forget_loaded_wallets();
        info!(wallet = name, "wallet created");
        Ok(wallet)
    }

    /// Names the node reports as loaded (`listwallets`), cached until `force`.
    pub async fn loaded_wallets(&self, force: bool) -> Result<Vec<String>, CoreError> {
        self.ctx.loaded_wallets(force).await
    }

    pub async fn is_loaded(&self, name: Option<&str>, force: bool) -> Result<bool, CoreError> {
        self.get(name)?.is_loaded(true, force).await
    }
}
