use bitcoin::{BlockHash, Txid};
use serde::Serialize;

use crate::error::ResponseParseError;

use super::parsing::FieldReader;

/// A block as returned by `getblock <hash> 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub hash: BlockHash,
    /// `-1` when the block is not on the main chain.
    pub confirmations: i64,
    pub stripped_size: Option<u64>,
    pub size: u64,
    pub weight: u64,
    pub height: u64,
    pub version: i32,
    pub version_hex: Option<String>,
    pub merkle_root: String,
    pub tx: Vec<Txid>,
    pub time: u64,
    pub median_time: u64,
    pub nonce: u64,
    pub bits: String,
    /// Exact decimal text as sent by the daemon.
    pub difficulty: String,
    pub chainwork: Option<String>,
    pub previous_block_hash: Option<BlockHash>,
    pub next_block_hash: Option<BlockHash>,
}

impl Block {
    pub fn from_value(value: &serde_json::Value) -> Result<Self, ResponseParseError> {
        let context = match value.get("height").and_then(serde_json::Value::as_u64) {
            Some(height) => format!("Block [{height}]"),
            None => "Block [unknown]".to_owned(),
        };
        let r = FieldReader::new(&context, value)?;

        let tx = r
            .array("tx")?
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str()
                    .filter(|s| crate::validator::is_hash(s, 64))
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| r.error(&format!("tx[{i}]"), "hash", item))
            })
            .collect::<Result<Vec<Txid>, _>>()?;

        Ok(Self {
            hash: r.block_hash("hash")?,
            confirmations: r.integer("confirmations")?,
            stripped_size: r.opt_integer("strippedsize")?,
            size: r.integer("size")?,
            weight: r.integer("weight")?,
            height: r.integer("height")?,
            version: r.integer("version")?,
            version_hex: r.opt_string("versionHex")?,
            merkle_root: r.hash("merkleroot")?,
            tx,
            time: r.integer("time")?,
            median_time: r.integer("mediantime")?,
            nonce: r.integer("nonce")?,
            bits: r.string("bits")?,
            difficulty: r.number_text("difficulty")?,
            chainwork: r.opt_string("chainwork")?,
            previous_block_hash: r.opt_block_hash("previousblockhash")?,
            next_block_hash: r.opt_block_hash("nextblockhash")?,
        })
    }
}
