mod cli;

use std::time::Duration;

use bitcoin::{BlockHash, Txid};
use clap::Parser;
use eyre::{eyre, WrapErr};
use serde_json::Value;

use bitcoind_rpc_core::validator::is_amount;
use bitcoind_rpc_core::{
    Amount, BitcoindClient, ChangeAddressResolver, CoreError, RpcConfig,
};

use cli::{Cli, Command, ConnectionArgs, SendArgs};

/// Seconds a `send --passphrase` keeps the wallet unlocked.
const SEND_UNLOCK_SECS: u64 = 60;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let config = build_config(&args.connection);
    let endpoint = format!("{}:{}", config.host, config.port);
    let client = BitcoindClient::new(config).context("configure RPC client")?;

    let output = run(&client, args.wallet.as_deref(), args.command)
        .await
        .map_err(|err| match err.downcast_ref::<CoreError>() {
            Some(CoreError::Connection(source)) => {
                let message = format_rpc_connect_error(&endpoint, &source.to_string());
                eyre!(message).wrap_err("while talking to the daemon RPC")
            }
            _ => err,
        })?;

    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("render output")?
    );
    Ok(())
}

fn build_config(args: &ConnectionArgs) -> RpcConfig {
    let mut config = RpcConfig::new(args.host.clone(), args.port)
        .with_scale(args.scale)
        .with_timeouts(
            Duration::from_secs(10).min(Duration::from_secs(args.timeout)),
            Duration::from_secs(args.timeout),
        )
        .validate_core_privileges(!args.no_capability_check);
    config.username = args.user.clone();
    config.password = args.pass.clone();
    config.cookie_file = args.cookie.clone();
    config.requests_per_second = args.rate_limit;
    if args.tls || args.ca_bundle.is_some() {
        config = config.with_tls(args.ca_bundle.clone());
    }
    config
}

async fn run(client: &BitcoindClient, wallet: Option<&str>, command: Command) -> eyre::Result<Value> {
    let value = match command {
        Command::NetworkInfo => serde_json::to_value(client.get_network_info().await?)?,
        Command::Privileges => serde_json::to_value(client.core_privileges().await?)?,
        Command::BlockCount => serde_json::json!(client.blockchain().get_block_count().await?),
        Command::Block { id } => {
            let block = match id.parse::<u64>() {
                Ok(height) => client.blockchain().get_block_by_height(height).await?,
                Err(_) => {
                    let hash: BlockHash = id
                        .parse()
                        .map_err(|_| eyre!("`{id}` is neither a block height nor a block hash"))?;
                    client.blockchain().get_block(&hash).await?
                }
            };
            serde_json::to_value(block)?
        }
        Command::Tx { txid } => {
            let txid: Txid = txid.parse().wrap_err("parse txid")?;
            serde_json::to_value(client.blockchain().get_raw_transaction(&txid).await?)?
        }
        Command::Mempool => serde_json::to_value(client.mempool().get_raw().await?)?,
        Command::Balance {
            address,
            confirmations,
        } => {
            let balance = client
                .wallet(wallet)?
                .get_balance(address.as_deref(), confirmations)
                .await?;
            serde_json::to_value(balance)?
        }
        Command::NewAddress => serde_json::json!(client.wallet(wallet)?.get_new_address().await?),
        Command::Unspent {
            min_conf,
            max_conf,
            address,
        } => {
            let addresses = (!address.is_empty()).then_some(address);
            let unspent = client
                .wallet(wallet)?
                .list_unspent(min_conf, max_conf, addresses.as_deref())
                .await?;
            serde_json::to_value(unspent)?
        }
        Command::Send(send) => {
            let txid = run_send(client, wallet, send).await?;
            serde_json::json!({ "txid": txid.to_string() })
        }
        Command::Load { ignore_warning } => {
            client.wallet(wallet)?.load(ignore_warning).await?;
            serde_json::json!({ "loaded": wallet.unwrap_or_default() })
        }
        Command::Unload => {
            client.wallet(wallet)?.unload().await?;
            serde_json::json!({ "unloaded": wallet.unwrap_or_default() })
        }
        Command::CreateWallet {
            name,
            ignore_warning,
        } => {
            client.wallets().create(&name, ignore_warning).await?;
            serde_json::json!({ "created": name })
        }
    };
    Ok(value)
}

async fn run_send(client: &BitcoindClient, wallet: Option<&str>, args: SendArgs) -> eyre::Result<Txid> {
    let scale = client.config().scale;
    let wallet = client.wallet(wallet)?;

    let mut tx = wallet.prepare_transaction();
    for (address, amount) in &args.payments {
        let amount =
            parse_amount(amount, scale).wrap_err_with(|| format!("amount for {address}"))?;
        tx = tx.output(address, amount)?;
    }
    tx = match (&args.fee, args.fee_per_byte) {
        (Some(fee), _) => tx.fee(parse_amount(fee, scale).wrap_err("fee")?)?,
        (None, Some(rate)) => tx.fee_per_byte(rate)?,
        (None, None) => return Err(eyre!("one of --fee or --fee-per-byte is required")),
    };
    if let Some(address) = &args.change_address {
        tx = tx.change_address(address)?;
    }
    if args.new_change_address {
        tx = tx.change_resolver(ChangeAddressResolver::NewAddress);
    }

    if let Some(passphrase) = args.passphrase {
        wallet.set_passphrase(passphrase);
        wallet.unlock(SEND_UNLOCK_SECS).await.wrap_err("unlock wallet")?;
    }
    let result = tx.send().await;
    if wallet.is_unlocked() {
        if let Err(err) = wallet.lock().await {
            tracing::warn!(error = %err, "could not re-lock wallet after send");
        }
    }
    Ok(result?)
}

/// Plain decimal text only; exponent forms are refused on the command line.
fn parse_amount(text: &str, scale: u32) -> eyre::Result<Amount> {
    if !is_amount(text, false) {
        return Err(eyre!("`{text}` is not a plain decimal amount"));
    }
    Ok(Amount::parse(text, scale)?)
}

fn format_rpc_connect_error(endpoint: &str, source_error: &str) -> String {
    let mut lines = vec![
        format!("could not reach RPC endpoint `{endpoint}`"),
        format!("RPC error: {source_error}"),
    ];

    if source_error.contains("dns error") || source_error.contains("failed to lookup address") {
        lines.push(
            "hint: hostname resolution failed; verify --host and your DNS/network".into(),
        );
    } else if source_error.contains("tls")
        || source_error.contains("certificate")
        || source_error.contains("SSL")
    {
        lines.push(
            "hint: TLS handshake failed; verify --ca-bundle and that the daemon serves HTTPS"
                .into(),
        );
    } else if source_error.contains("HTTP 401") || source_error.contains("HTTP 403") {
        lines.push("hint: authentication failed; verify --user/--pass or --cookie".into());
    } else if source_error.contains("HTTP 404") {
        lines.push("hint: endpoint not found; verify --port and the --wallet name".into());
    } else if source_error.contains("error sending request for url") {
        lines.push(
            "hint: request could not be sent; verify the daemon is running with -server and rpcbind/rpcallowip cover this host"
                .into(),
        );
    }

    lines.join("\n")
}
