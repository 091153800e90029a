//! Wallet-scoped RPC calls.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use bitcoin::{OutPoint, Txid};
use tracing::{info, warn};

use crate::amount::Amount;
use crate::client::NodeContext;
use crate::error::{CoreError, DaemonError};
use crate::prepare::PrepareTransaction;
use crate::response::parsing::is_hex;
use crate::response::{SignedRawTransaction, UnspentOutputs};
use crate::rpc::types::unexpected_result;
use crate::rpc::DaemonResponse;
use crate::validator::{is_address, is_wallet_passphrase};

/// `listunspent` upper bound used when only addresses are given.
const MAX_CONFIRMATIONS: u32 = 9_999_999;

/// Longest unlock `walletpassphrase` accepts; larger values are capped.
const MAX_UNLOCK_SECONDS: u64 = 100_000_000;

/// Handle to one wallet on the node.
///
/// Obtained from [`Wallets`](crate::Wallets); there is exactly one handle
/// per wallet name per client.
pub struct Wallet {
    ctx: Arc<NodeContext>,
    name: Option<String>,
    state: Mutex<WalletState>,
}

#[derive(Default)]
struct WalletState {
    passphrase: Option<String>,
    is_loaded: bool,
    unlocked_until: Option<Instant>,
}

impl Wallet {
    pub(crate) fn new(ctx: Arc<NodeContext>, name: Option<String>) -> Self {
        Self {
            ctx,
            name,
            state: Mutex::new(WalletState::default()),
        }
    }

    /// `None` for the daemon's default wallet.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn scale(&self) -> u32 {
        self.ctx.scale()
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<default>")
    }

    fn endpoint(&self) -> Option<String> {
        self.name.as_ref().map(|name| format!("wallet/{name}"))
    }

    fn state(&self) -> MutexGuard<'_, WalletState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn mark_loaded(&self, loaded: bool) {
        self.state().is_loaded = loaded;
    }

    async fn call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<DaemonResponse, CoreError> {
        let endpoint = self.endpoint();
        self.ctx.call(method, endpoint.as_deref(), params).await
    }

    // ==========================================================================
    // Balances & addresses
    // ==========================================================================

    /// Wallet balance, or the amount received by `address` when given.
    pub async fn get_balance(
        &self,
        address: Option<&str>,
        confirmations: Option<u32>,
    ) -> Result<Amount, CoreError> {
        let mut params = Vec::new();
        match address {
            Some(address) => {
                check_address(address)?;
                params.push(serde_json::json!(address));
                if let Some(conf) = confirmations.filter(|c| *c > 0) {
                    params.push(serde_json::json!(conf));
                }
            }
            None => {
                if let Some(conf) = confirmations {
                    params.push(serde_json::json!("*"));
                    params.push(serde_json::json!(conf));
                }
            }
        }
        let result = self.call("getbalance", params).await?.require_result("getbalance")?;
        Amount::from_json(&result, self.scale())
            .ok_or_else(|| unexpected_result("getbalance", "amount", &result))
    }

    pub async fn get_new_address(&self) -> Result<String, CoreError> {
        self.call("getnewaddress", Vec::new())
            .await?
            .into_string("getnewaddress")
    }

    /// Wallet view of a transaction (`gettransaction`), returned as sent.
    pub async fn get_transaction(
        &self,
        txid: &Txid,
    ) -> Result<serde_json::Map<String, serde_json::Value>, CoreError> {
        self.call("gettransaction", vec![serde_json::json!(txid.to_string())])
            .await?
            .into_object("gettransaction")
    }

    pub async fn send_to_address(&self, address: &str, amount: Amount) -> Result<Txid, CoreError> {
        check_address(address)?;
        if !amount.is_positive() {
            return Err(CoreError::Validation(format!(
                "amount to send must be positive, got {amount}"
            )));
        }
        let txid = self
            .call(
                "sendtoaddress",
                vec![serde_json::json!(address), serde_json::json!(amount.to_string())],
            )
            .await?
            .into_hash("sendtoaddress")?;
        info!(wallet = self.label(), %txid, %amount, "sent to address");
        Ok(txid)
    }

    pub async fn list_unspent(
        &self,
        min_conf: u32,
        max_conf: Option<u32>,
        addresses: Option<&[String]>,
    ) -> Result<UnspentOutputs, CoreError> {
        if let Some(addresses) = addresses {
            for address in addresses {
                check_address(address)?;
            }
        }

        let mut params = vec![serde_json::json!(min_conf)];
        if max_conf.is_some() || addresses.is_some() {
            params.push(serde_json::json!(max_conf.unwrap_or(MAX_CONFIRMATIONS)));
        }
        if let Some(addresses) = addresses {
            params.push(serde_json::json!(addresses));
        }

        let result = self.call("listunspent", params).await?.require_result("listunspent")?;
        Ok(UnspentOutputs::from_value(&result, self.scale())?)
    }

    // ==========================================================================
    // Raw transactions
    // ==========================================================================

    /// Unsigned transaction hex spending `inputs` to `outputs` (in order).
    pub async fn create_raw_transaction(
        &self,
        inputs: &[OutPoint],
        outputs: &[(String, Amount)],
    ) -> Result<String, CoreError> {
        let inputs: Vec<serde_json::Value> = inputs
            .iter()
            .map(|outpoint| {
                serde_json::json!({
                    "txid": outpoint.txid.to_string(),
                    "vout": outpoint.vout,
                })
            })
            .collect();
        let mut output_map = serde_json::Map::with_capacity(outputs.len());
        for (address, amount) in outputs {
            output_map.insert(address.clone(), serde_json::json!(amount.to_string()));
        }

        let hex = self
            .call(
                "createrawtransaction",
                vec![
                    serde_json::Value::Array(inputs),
                    serde_json::Value::Object(output_map),
                ],
            )
            .await?
            .into_string("createrawtransaction")?;
        if !is_hex(&hex) {
            return Err(unexpected_result(
                "createrawtransaction",
                "hex string",
                &serde_json::Value::String(hex),
            ));
        }
        Ok(hex)
    }

    /// Sign with wallet keys, via `signrawtransactionwithwallet` when the
    /// node supports it and `signrawtransaction` otherwise.
    pub async fn sign_raw_transaction(&self, hex: &str) -> Result<SignedRawTransaction, CoreError> {
        let method = self.ctx.signing_method().await?;
        let result = self
            .call(method, vec![serde_json::json!(hex)])
            .await?
            .require_result(method)?;
        Ok(SignedRawTransaction::from_value(&result)?)
    }

    pub async fn send_raw_transaction(&self, hex: &str) -> Result<Txid, CoreError> {
        self.call("sendrawtransaction", vec![serde_json::json!(hex)])
            .await?
            .into_hash("sendrawtransaction")
    }

    /// Start building a transaction funded by this wallet.
    pub fn prepare_transaction(&self) -> PrepareTransaction<'_> {
        PrepareTransaction::new(self)
    }

    // ==========================================================================
    // Encryption & unlocking
    // ==========================================================================

    /// Store the passphrase used by [`unlock`](Self::unlock). Nothing is sent.
    pub fn set_passphrase(&self, passphrase: impl Into<String>) {
        self.state().passphrase = Some(passphrase.into());
    }

    /// `walletpassphrase` for `seconds` (capped like the daemon caps it),
    /// then remember when it expires.
    pub async fn unlock(&self, seconds: u64) -> Result<(), CoreError> {
        let seconds = seconds.min(MAX_UNLOCK_SECONDS);
        let passphrase = self
            .state()
            .passphrase
            .clone()
            .ok_or_else(|| CoreError::Wallet(format!("no passphrase set for wallet {}", self.label())))?;

        let response = self
            .call(
                "walletpassphrase",
                vec![serde_json::json!(passphrase), serde_json::json!(seconds)],
            )
            .await?;
        response.ensure_ok_status("walletpassphrase")?;

        self.state().unlocked_until = Some(Instant::now() + Duration::from_secs(seconds));
        info!(wallet = self.label(), seconds, "wallet unlocked");
        Ok(())
    }

    pub async fn lock(&self) -> Result<(), CoreError> {
        self.call("walletlock", Vec::new()).await?;
        self.state().unlocked_until = None;
        info!(wallet = self.label(), "wallet locked");
        Ok(())
    }

    /// Whether the last [`unlock`](Self::unlock) is still in effect, by
    /// local clock.
    pub fn is_unlocked(&self) -> bool {
        self.state()
            .unlocked_until
            .is_some_and(|until| Instant::now() <= until)
    }

    /// `encryptwallet`. The daemon may shut down afterwards.
    pub async fn encrypt(&self, passphrase: &str) -> Result<String, CoreError> {
        if !is_wallet_passphrase(passphrase) {
            return Err(CoreError::Validation(
                "wallet passphrase must be 3-64 characters of [a-zA-Z0-9._-]".to_owned(),
            ));
        }
        self.ctx.require_dynamic_wallets("encryptwallet").await?;

        let message = self
            .call("encryptwallet", vec![serde_json::json!(passphrase)])
            .await?
            .into_string("encryptwallet")?;
        self.set_passphrase(passphrase);
        warn!(wallet = self.label(), "wallet encrypted");
        Ok(message)
    }

    // ==========================================================================
    // Loading
    // ==========================================================================

    /// Local loaded flag, or the node's `listwallets` answer when
    /// `check_at_node` is set (cached by the client unless `force`).
    pub async fn is_loaded(&self, check_at_node: bool, force: bool) -> Result<bool, CoreError> {
        if !check_at_node {
            return Ok(self.state().is_loaded);
        }
        let loaded = self.ctx.loaded_wallets(force).await?;
        let wanted = self.name.as_deref().unwrap_or("");
        let is_loaded = loaded.iter().any(|name| name.eq_ignore_ascii_case(wanted));
        self.mark_loaded(is_loaded);
        Ok(is_loaded)
    }

    /// `loadwallet`. A wallet the node already has loaded counts as success.
    pub async fn load(&self, suppress_warning: bool) -> Result<(), CoreError> {
        self.ctx.require_dynamic_wallets("loadwallet").await?;
        let wanted = self.name.clone().unwrap_or_default();

        let response = match self.ctx.call("loadwallet", None, vec![serde_json::json!(wanted)]).await {
            Ok(response) => response,
            Err(CoreError::Daemon(DaemonError::Response(err))) if is_already_loaded(&err.message) => {
                info!(wallet = self.label(), "wallet already loaded");
                self.mark_loaded(true);
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let result = response.into_object("loadwallet")?;
        check_created_or_loaded("loadwallet", &wanted, &result, suppress_warning)?;

        self.mark_loaded(true);
        self.ctx.forget_loaded_wallets();
        info!(wallet = self.label(), "wallet loaded");
        Ok(())
    }

    /// `unloadwallet`. Refused while the wallet is unlocked.
    pub async fn unload(&self) -> Result<(), CoreError> {
        self.ctx.require_dynamic_wallets("unloadwallet").await?;
        if self.is_unlocked() {
            return Err(CoreError::Wallet(format!(
                "wallet {} is unlocked; lock it or wait for the unlock to expire before unloading",
                self.label()
            )));
        }

        let wanted = self.name.clone().unwrap_or_default();
        let response = self
            .ctx
            .call("unloadwallet", None, vec![serde_json::json!(wanted)])
            .await?;
        response.ensure_ok_status("unloadwallet")?;

        self.mark_loaded(false);
        self.ctx.forget_loaded_wallets();
        info!(wallet = self.label(), "wallet unloaded");
        Ok(())
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Wallet")
            .field("name", &self.name)
            .field("passphrase", &state.passphrase.as_ref().map(|_| "<redacted>"))
            .field("is_loaded", &state.is_loaded)
            .field("unlocked_until", &state.unlocked_until)
            .finish()
    }
}

fn check_address(address: &str) -> Result<(), CoreError> {
    if is_address(address) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("invalid address `{address}`")))
    }
}

fn is_already_loaded(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("duplicate -wallet filename") || message.contains("already loaded")
}

/// Shared result check for `loadwallet` and `createwallet`: the echoed name
/// must match and a warning fails unless suppressed.
pub(crate) fn check_created_or_loaded(
    method: &str,
    wanted: &str,
    result: &serde_json::Map<String, serde_json::Value>,
    suppress_warning: bool,
) -> Result<(), CoreError> {
    let name = result.get("name").and_then(serde_json::Value::as_str);
    if name != Some(wanted) {
        return Err(CoreError::Wallet(format!(
            "`{method}` answered for wallet {:?}, expected {wanted:?}",
            name.unwrap_or_default()
        )));
    }

    let mut warnings: Vec<&str> = Vec::new();
    if let Some(warning) = result.get("warning").and_then(serde_json::Value::as_str) {
        warnings.push(warning);
    }
    if let Some(list) = result.get("warnings").and_then(serde_json::Value::as_array) {
        warnings.extend(list.iter().filter_map(serde_json::Value::as_str));
    }
    warnings.retain(|w| !w.trim().is_empty());

    if warnings.is_empty() {
        return Ok(());
    }
    let joined = warnings.join("; ");
    if suppress_warning {
        warn!(method, warning = %joined, "daemon warning suppressed");
        Ok(())
    } else {
        Err(CoreError::Wallet(format!("`{method}` warning: {joined}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::mock::MockTransport;
    use crate::test_util::*;

    const BTC_018: &str = "/Satoshi:0.18.0/";

    #[tokio::test]
    async fn named_wallet_calls_go_to_wallet_endpoint() {
        let (client, mock) = client_with(
            MockTransport::builder().reply("getnewaddress", serde_json::json!(ADDR_1)),
        );
        let wallet = client.wallet(Some("Hot")).unwrap();
        assert_eq!(wallet.get_new_address().await.unwrap(), ADDR_1);
        let call = mock.last_call("getnewaddress").unwrap();
        assert_eq!(call.endpoint.as_deref(), Some("wallet/Hot"));
        assert!(call.params.is_empty());

        let default = client.wallet(None).unwrap();
        default.get_new_address().await.unwrap();
        assert_eq!(mock.last_call("getnewaddress").unwrap().endpoint, None);
    }

    #[tokio::test]
    async fn balance_is_normalized_to_scale() {
        let (client, mock) =
            client_with(MockTransport::builder().reply("getbalance", number("1.5E-3")));
        let wallet = client.wallet(None).unwrap();
        let balance = wallet.get_balance(None, None).await.unwrap();
        assert_eq!(balance.to_string(), "0.00150000");
        assert!(mock.last_call("getbalance").unwrap().params.is_empty());

        wallet.get_balance(Some(ADDR_1), Some(0)).await.unwrap();
        assert_eq!(
            mock.last_call("getbalance").unwrap().params,
            vec![serde_json::json!(ADDR_1)]
        );

        wallet.get_balance(Some(ADDR_1), Some(3)).await.unwrap();
        assert_eq!(
            mock.last_call("getbalance").unwrap().params,
            vec![serde_json::json!(ADDR_1), serde_json::json!(3)]
        );
    }

    #[tokio::test]
    async fn balance_rejects_non_decimal() {
        let (client, _) =
            client_with(MockTransport::builder().reply("getbalance", serde_json::json!("lots")));
        let err = client
            .wallet(None)
            .unwrap()
            .get_balance(None, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("expected amount"), "{err}");
    }

    #[tokio::test]
    async fn invalid_address_fails_before_any_call() {
        let (client, mock) = client_with(MockTransport::builder());
        let wallet = client.wallet(None).unwrap();
        let amount = Amount::parse("0.1", 8).unwrap();
        let err = wallet.send_to_address("nope", amount).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn send_to_address_sends_decimal_string() {
        let (client, mock) = client_with(
            MockTransport::builder().reply("sendtoaddress", serde_json::json!(hash_hex(0xee))),
        );
        let wallet = client.wallet(None).unwrap();
        let txid = wallet
            .send_to_address(ADDR_1, Amount::parse("0.1", 8).unwrap())
            .await
            .unwrap();
        assert_eq!(txid, txid_from_byte(0xee));
        assert_eq!(
            mock.last_call("sendtoaddress").unwrap().params,
            vec![serde_json::json!(ADDR_1), serde_json::json!("0.10000000")]
        );
    }

    #[tokio::test]
    async fn list_unspent_params() {
        let (client, mock) = client_with(MockTransport::builder().reply(
            "listunspent",
            serde_json::json!([unspent_json(0xc1, 0, "0.5")]),
        ));
        let wallet = client.wallet(None).unwrap();
        assert_eq!(wallet.list_unspent(1, None, None).await.unwrap().len(), 1);
        assert_eq!(
            mock.last_call("listunspent").unwrap().params,
            vec![serde_json::json!(1)]
        );

        let addresses = vec![ADDR_1.to_owned()];
        wallet.list_unspent(0, None, Some(&addresses)).await.unwrap();
        assert_eq!(
            mock.last_call("listunspent").unwrap().params,
            vec![
                serde_json::json!(0),
                serde_json::json!(9_999_999),
                serde_json::json!([ADDR_1])
            ]
        );
    }

    #[tokio::test]
    async fn create_raw_transaction_keeps_output_order() {
        let (client, mock) = client_with(
            MockTransport::builder().reply("createrawtransaction", serde_json::json!("0200")),
        );
        let wallet = client.wallet(None).unwrap();
        let outputs = vec![
            (ADDR_2.to_owned(), Amount::parse("0.2", 8).unwrap()),
            (ADDR_1.to_owned(), Amount::parse("0.1", 8).unwrap()),
        ];
        let hex = wallet
            .create_raw_transaction(&[OutPoint::new(txid_from_byte(0xc1), 2)], &outputs)
            .await
            .unwrap();
        assert_eq!(hex, "0200");

        let params = mock.last_call("createrawtransaction").unwrap().params;
        let keys: Vec<&String> = params[1].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec![ADDR_2, ADDR_1]);
        assert_eq!(params[0][0]["vout"], serde_json::json!(2));
    }

    #[tokio::test]
    async fn send_raw_transaction_requires_hash() {
        let (client, _) = client_with(
            MockTransport::builder().reply("sendrawtransaction", serde_json::json!("ABC")),
        );
        let err = client
            .wallet(None)
            .unwrap()
            .send_raw_transaction("0200")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ResponseParse(_)), "{err}");
    }

    #[tokio::test]
    async fn unlock_requires_passphrase_and_records_expiry() {
        let (client, mock) =
            client_with(MockTransport::builder().reply("walletpassphrase", serde_json::Value::Null));
        let wallet = client.wallet(Some("hot")).unwrap();

        let err = wallet.unlock(60).await.unwrap_err();
        assert!(matches!(err, CoreError::Wallet(_)));
        assert!(mock.calls().is_empty());

        wallet.set_passphrase("secret");
        wallet.unlock(60).await.unwrap();
        assert!(wallet.is_unlocked());
        assert_eq!(
            mock.last_call("walletpassphrase").unwrap().params,
            vec![serde_json::json!("secret"), serde_json::json!(60)]
        );
        assert!(!format!("{wallet:?}").contains("secret"));
    }

    #[tokio::test]
    async fn unlock_fails_on_non_200() {
        let (client, _) = client_with(MockTransport::builder().reply_status(
            "walletpassphrase",
            500,
            serde_json::Value::Null,
        ));
        let wallet = client.wallet(Some("hot")).unwrap();
        wallet.set_passphrase("secret");
        assert!(wallet.unlock(60).await.is_err());
        assert!(!wallet.is_unlocked());
    }

    #[tokio::test]
    async fn unload_refused_while_unlocked() {
        let (client, mock) = client_with(
            MockTransport::builder()
                .reply("getnetworkinfo", network_info_json(BTC_018, 180000))
                .reply("walletpassphrase", serde_json::Value::Null)
                .reply("walletlock", serde_json::Value::Null)
                .reply("unloadwallet", serde_json::Value::Null),
        );
        let wallet = client.wallet(Some("hot")).unwrap();
        wallet.set_passphrase("secret");
        wallet.unlock(600).await.unwrap();

        let err = wallet.unload().await.unwrap_err();
        assert!(matches!(err, CoreError::Wallet(_)));
        assert_eq!(mock.call_count("unloadwallet"), 0);

        wallet.lock().await.unwrap();
        wallet.unload().await.unwrap();
        assert_eq!(
            mock.last_call("unloadwallet").unwrap().params,
            vec![serde_json::json!("hot")]
        );
        assert!(!wallet.is_loaded(false, false).await.unwrap());
    }

    #[tokio::test]
    async fn oversized_unlock_is_capped_and_still_blocks_unload() {
        let (client, mock) = client_with(
            MockTransport::builder()
                .reply("getnetworkinfo", network_info_json(BTC_018, 180000))
                .reply("walletpassphrase", serde_json::Value::Null)
                .reply("unloadwallet", serde_json::Value::Null),
        );
        let wallet = client.wallet(Some("hot")).unwrap();
        wallet.set_passphrase("secret");
        wallet.unlock(u64::MAX).await.unwrap();

        assert!(wallet.is_unlocked());
        assert_eq!(
            mock.last_call("walletpassphrase").unwrap().params,
            vec![serde_json::json!("secret"), serde_json::json!(100_000_000)]
        );
        let err = wallet.unload().await.unwrap_err();
        assert!(matches!(err, CoreError::Wallet(_)));
        assert_eq!(mock.call_count("unloadwallet"), 0);
    }

    #[tokio::test]
    async fn dynamic_operations_need_capability() {
        let (client, mock) = client_with(
            MockTransport::builder().reply("getnetworkinfo", network_info_json(BTC_018, 160000)),
        );
        let wallet = client.wallet(Some("hot")).unwrap();
        assert!(matches!(wallet.load(false).await, Err(CoreError::Capability(_))));
        assert!(matches!(wallet.unload().await, Err(CoreError::Capability(_))));
        assert!(matches!(
            wallet.encrypt("good-pass").await,
            Err(CoreError::Capability(_))
        ));
        assert_eq!(mock.methods(), vec!["getnetworkinfo"]);
    }

    #[tokio::test]
    async fn load_checks_name_and_warning() {
        let (client, _) = client_with(
            MockTransport::builder()
                .reply("getnetworkinfo", network_info_json(BTC_018, 180000))
                .reply(
                    "loadwallet",
                    serde_json::json!({"name": "hot", "warning": "wallet is old"}),
                ),
        );
        let wallet = client.wallet(Some("hot")).unwrap();
        let err = wallet.load(false).await.unwrap_err();
        assert!(err.to_string().contains("wallet is old"), "{err}");
        assert!(!wallet.is_loaded(false, false).await.unwrap());

        wallet.load(true).await.unwrap();
        assert!(wallet.is_loaded(false, false).await.unwrap());
    }

    #[tokio::test]
    async fn load_rejects_mismatched_name() {
        let (client, _) = client_with(
            MockTransport::builder()
                .reply("getnetworkinfo", network_info_json(BTC_018, 180000))
                .reply("loadwallet", serde_json::json!({"name": "other", "warning": ""})),
        );
        let err = client.wallet(Some("hot")).unwrap().load(false).await.unwrap_err();
        assert!(matches!(err, CoreError::Wallet(_)));
    }

    #[tokio::test]
    async fn load_treats_duplicate_as_loaded() {
        let (client, _) = client_with(
            MockTransport::builder()
                .reply("getnetworkinfo", network_info_json(BTC_018, 180000))
                .reply_error(
                    "loadwallet",
                    -4,
                    "Wallet file verification failed: Error loading wallet hot. Duplicate -wallet filename specified.",
                ),
        );
        let wallet = client.wallet(Some("hot")).unwrap();
        wallet.load(false).await.unwrap();
        assert!(wallet.is_loaded(false, false).await.unwrap());
    }

    #[tokio::test]
    async fn encrypt_validates_passphrase_locally() {
        let (client, mock) = client_with(MockTransport::builder());
        let err = client
            .wallet(None)
            .unwrap()
            .encrypt("has spaces")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn is_loaded_asks_node_when_requested() {
        let (client, _) = client_with(
            MockTransport::builder().reply("listwallets", serde_json::json!(["", "hot"])),
        );
        assert!(client.wallet(Some("HOT")).unwrap().is_loaded(true, false).await.unwrap());
        assert!(client.wallet(None).unwrap().is_loaded(true, false).await.unwrap());
        assert!(!client.wallet(Some("cold")).unwrap().is_loaded(true, false).await.unwrap());
    }
}
