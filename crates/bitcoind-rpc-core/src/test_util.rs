//! Shared fixtures for unit tests: daemon-shaped JSON payloads and a client
//! wired to a [`MockTransport`].

use std::sync::Arc;

use bitcoin::{BlockHash, Txid};

use crate::client::BitcoindClient;
use crate::config::RpcConfig;
use crate::rpc::mock::{MockTransport, MockTransportBuilder};

pub const ADDR_1: &str = "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq";
pub const ADDR_2: &str = "1BoatSLRHtKNngkdXEeobR76b53LETtpyT";
pub const ADDR_3: &str = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";

// ==============================================================================
// Hash Helpers
// ==============================================================================

/// 64 hex characters made of one repeated byte. Byte order reversal leaves
/// it unchanged, so it parses to the same hash either way.
pub fn hash_hex(b: u8) -> String {
    format!("{b:02x}").repeat(32)
}

pub fn txid_from_byte(b: u8) -> Txid {
    hash_hex(b).parse().expect("valid txid hex")
}

pub fn block_hash_from_byte(b: u8) -> BlockHash {
    hash_hex(b).parse().expect("valid block hash hex")
}

/// A JSON number kept in its exact textual form.
pub fn number(text: &str) -> serde_json::Value {
    serde_json::from_str(text).expect("valid JSON number")
}

// ==============================================================================
// Daemon Payloads
// ==============================================================================

pub fn network_info_json(subversion: &str, version: u64) -> serde_json::Value {
    serde_json::json!({
        "version": version,
        "subversion": subversion,
        "protocolversion": 70015,
        "localservices": "0000000000000409",
        "localrelay": true,
        "timeoffset": 0,
        "networkactive": true,
        "connections": 8,
        "relayfee": number("0.00001"),
        "incrementalfee": number("0.00001"),
        "warnings": "",
    })
}

/// Verbose `getblock` result for height 120.
pub fn block_json() -> serde_json::Value {
    serde_json::json!({
        "hash": hash_hex(0x22),
        "confirmations": 3,
        "strippedsize": 215,
        "size": 251,
        "weight": 896,
        "height": 120,
        "version": 536870912,
        "versionHex": "20000000",
        "merkleroot": hash_hex(0x33),
        "tx": [hash_hex(0xa1), hash_hex(0xa2)],
        "time": 1_700_000_000,
        "mediantime": 1_699_999_000,
        "nonce": 2,
        "bits": "207fffff",
        "difficulty": number("4.656542373906925e-10"),
        "chainwork": "00000000000000000000000000000000000000000000000000000000000000f2",
        "nTx": 2,
        "previousblockhash": hash_hex(0x11),
    })
}

/// Verbose `getrawtransaction` result: a coinbase input, a regular input and
/// two outputs, one with `address` and one with the older `addresses` list.
pub fn raw_tx_json(confirmed: bool) -> serde_json::Value {
    let mut tx = serde_json::json!({
        "txid": hash_hex(0xa1),
        "hash": hash_hex(0xa9),
        "version": 2,
        "size": 225,
        "vsize": 144,
        "weight": 573,
        "locktime": 0,
        "vin": [
            {
                "coinbase": "03780000",
                "sequence": 4294967295u64,
            },
            {
                "txid": hash_hex(0xb0),
                "vout": 3,
                "scriptSig": {"asm": "", "hex": ""},
                "sequence": 4294967293u64,
            },
        ],
        "vout": [
            {
                "value": number("0.0015"),
                "n": 0,
                "scriptPubKey": {
                    "asm": "0 e8df018c7e326cc253faac7e46cdc51e68542c42",
                    "hex": "0014e8df018c7e326cc253faac7e46cdc51e68542c42",
                    "type": "witness_v0_keyhash",
                    "address": ADDR_1,
                },
            },
            {
                "value": number("1.2"),
                "n": 1,
                "scriptPubKey": {
                    "asm": "OP_DUP OP_HASH160 6f7cf9580ff85e28d0d1b0c1e5e4a2b3c4d5e6f7 OP_EQUALVERIFY OP_CHECKSIG",
                    "hex": "76a9146f7cf9580ff85e28d0d1b0c1e5e4a2b3c4d5e6f788ac",
                    "reqSigs": 1,
                    "type": "pubkeyhash",
                    "addresses": [ADDR_2],
                },
            },
        ],
        "hex": "02000000000101",
    });
    if confirmed {
        let map = tx.as_object_mut().expect("fixture is an object");
        map.insert("blockhash".into(), serde_json::json!(hash_hex(0x22)));
        map.insert("confirmations".into(), serde_json::json!(6));
        map.insert("time".into(), serde_json::json!(1_700_000_000));
        map.insert("blocktime".into(), serde_json::json!(1_700_000_000));
    }
    tx
}

/// One `listunspent` entry; `amount` is given as JSON number text.
pub fn unspent_json(txid_byte: u8, vout: u32, amount: &str) -> serde_json::Value {
    serde_json::json!({
        "txid": hash_hex(txid_byte),
        "vout": vout,
        "address": ADDR_1,
        "label": "",
        "scriptPubKey": "0014e8df018c7e326cc253faac7e46cdc51e68542c42",
        "amount": number(amount),
        "confirmations": 10,
        "spendable": true,
        "solvable": true,
        "safe": true,
    })
}

pub fn signed_json(hex: &str, complete: bool) -> serde_json::Value {
    if complete {
        serde_json::json!({"hex": hex, "complete": true})
    } else {
        serde_json::json!({
            "hex": hex,
            "complete": false,
            "errors": [{
                "txid": hash_hex(0xc1),
                "vout": 0,
                "scriptSig": "",
                "sequence": 4294967295u64,
                "error": "Input not found or already spent",
            }],
        })
    }
}

// ==============================================================================
// Client
// ==============================================================================

/// A client over a scripted transport with default configuration.
pub fn client_with(builder: MockTransportBuilder) -> (BitcoindClient, Arc<MockTransport>) {
    let mock = Arc::new(builder.build());
    let client = BitcoindClient::with_transport(mock.clone(), RpcConfig::default())
        .expect("default config is valid");
    (client, mock)
}
