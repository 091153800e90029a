use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// bitcoind-rpc: query and drive a Bitcoin-protocol daemon over JSON-RPC.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Wallet to scope wallet commands to (default wallet when omitted).
    #[arg(long, global = true, env = "BITCOIND_RPC_WALLET")]
    pub wallet: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct ConnectionArgs {
    /// Daemon RPC host.
    #[arg(long, default_value = "127.0.0.1", env = "BITCOIND_RPC_HOST")]
    pub host: String,

    /// Daemon RPC port.
    #[arg(long, default_value = "8332", env = "BITCOIND_RPC_PORT")]
    pub port: u16,

    /// RPC username.
    #[arg(long, env = "BITCOIND_RPC_USER")]
    pub user: Option<String>,

    /// RPC password.
    #[arg(long, env = "BITCOIND_RPC_PASS")]
    pub pass: Option<String>,

    /// Cookie file, used when no username/password is given.
    #[arg(long, env = "BITCOIND_RPC_COOKIE")]
    pub cookie: Option<PathBuf>,

    /// Connect over HTTPS.
    #[arg(long)]
    pub tls: bool,

    /// Extra PEM CA bundle to trust (implies --tls).
    #[arg(long)]
    pub ca_bundle: Option<PathBuf>,

    /// Total request timeout in seconds.
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Cap outbound requests per second.
    #[arg(long)]
    pub rate_limit: Option<u32>,

    /// Fractional digits for amounts.
    #[arg(long, default_value = "8")]
    pub scale: u32,

    /// Skip node capability checks (assume a legacy node).
    #[arg(long)]
    pub no_capability_check: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print `getnetworkinfo`.
    NetworkInfo,
    /// Print what the node's version allows.
    Privileges,
    /// Print the current block height.
    BlockCount,
    /// Print a block by hash or height.
    Block {
        /// Block hash (64 hex) or height.
        id: String,
    },
    /// Print a decoded transaction.
    Tx { txid: String },
    /// List mempool txids.
    Mempool,
    /// Print the wallet balance.
    Balance {
        /// Amount received by this address instead of the wallet total.
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        confirmations: Option<u32>,
    },
    /// Generate a new receiving address.
    NewAddress,
    /// List spendable outputs.
    Unspent {
        #[arg(long, default_value = "1")]
        min_conf: u32,
        #[arg(long)]
        max_conf: Option<u32>,
        /// Restrict to these addresses (repeatable).
        #[arg(long)]
        address: Vec<String>,
    },
    /// Build, sign and broadcast a transaction from the wallet.
    Send(SendArgs),
    /// Load the wallet on the node.
    Load {
        /// Do not fail on a daemon warning.
        #[arg(long)]
        ignore_warning: bool,
    },
    /// Unload the wallet from the node.
    Unload,
    /// Create and load a new wallet.
    CreateWallet {
        name: String,
        #[arg(long)]
        ignore_warning: bool,
    },
}

#[derive(Args)]
pub struct SendArgs {
    /// Payee as ADDRESS=AMOUNT (repeatable).
    #[arg(long = "to", required = true, value_parser = parse_payment)]
    pub payments: Vec<(String, String)>,

    /// Absolute fee.
    #[arg(long, conflicts_with = "fee_per_byte", required_unless_present = "fee_per_byte")]
    pub fee: Option<String>,

    /// Fee rate in satoshis per byte.
    #[arg(long)]
    pub fee_per_byte: Option<u64>,

    /// Address for change.
    #[arg(long, conflicts_with = "new_change_address")]
    pub change_address: Option<String>,

    /// Ask the wallet for a fresh change address.
    #[arg(long)]
    pub new_change_address: bool,

    /// Unlock the wallet with this passphrase for the duration of the send.
    #[arg(long, env = "BITCOIND_WALLET_PASSPHRASE")]
    pub passphrase: Option<String>,
}

fn parse_payment(raw: &str) -> Result<(String, String), String> {
    let (address, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ADDRESS=AMOUNT, got `{raw}`"))?;
    let (address, amount) = (address.trim(), amount.trim());
    if address.is_empty() || amount.is_empty() {
        return Err(format!("expected ADDRESS=AMOUNT, got `{raw}`"));
    }
    Ok((address.to_owned(), amount.to_owned()))
}
