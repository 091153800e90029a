//! Node capability detection from the daemon's self-reported user agent.

use std::fmt;

use serde::Serialize;

use crate::response::NetworkInfo;

/// First Bitcoin Core release with `loadwallet`/`unloadwallet` and
/// `signrawtransactionwithwallet` (0.17.0).
pub const DYNAMIC_WALLETS_MIN_VERSION: u64 = 170_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Coin {
    #[serde(rename = "BTC")]
    Btc,
    #[serde(rename = "BCH")]
    Bch,
    #[serde(rename = "DASH")]
    Dash,
    #[serde(rename = "LTC")]
    Ltc,
}

impl Coin {
    /// Map a daemon user-agent name to a coin, case-insensitively.
    pub fn from_agent_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "satoshi" => Some(Self::Btc),
            "bitcoin abc" => Some(Self::Bch),
            "dash core" => Some(Self::Dash),
            "litecoin core" => Some(Self::Ltc),
            _ => None,
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ticker = match self {
            Self::Btc => "BTC",
            Self::Bch => "BCH",
            Self::Dash => "DASH",
            Self::Ltc => "LTC",
        };
        f.write_str(ticker)
    }
}

/// What the connected node is and which RPC families it supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorePrivileges {
    /// Agent name as reported, e.g. `Satoshi`.
    pub name: String,
    /// Agent version text, e.g. `0.18.0`.
    pub agent_version: String,
    /// Numeric daemon version, e.g. `180000`.
    pub version: u64,
    pub coin: Option<Coin>,
    pub has_dynamic_wallets: bool,
}

impl CorePrivileges {
    pub fn from_network_info(info: &NetworkInfo) -> Self {
        let (name, agent_version) = info.agent();
        let coin = Coin::from_agent_name(name);
        Self {
            name: name.to_owned(),
            agent_version: agent_version.to_owned(),
            version: info.version,
            coin,
            has_dynamic_wallets: coin == Some(Coin::Btc)
                && info.version >= DYNAMIC_WALLETS_MIN_VERSION,
        }
    }
}
