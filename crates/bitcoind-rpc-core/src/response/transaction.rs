use bitcoin::{BlockHash, OutPoint, Txid, Wtxid};
use serde::Serialize;

use crate::amount::Amount;
use crate::error::ResponseParseError;

use super::parsing::{short_id, FieldReader, NULL};

const CHAIN_FIELDS: [&str; 4] = ["blockhash", "confirmations", "time", "blocktime"];

/// A decoded transaction as returned by `getrawtransaction <txid> true`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawTransaction {
    pub txid: Txid,
    pub hash: Wtxid,
    pub version: i32,
    pub size: u64,
    pub vsize: u64,
    pub weight: Option<u64>,
    pub locktime: u32,
    pub vin: Vec<RawTxInput>,
    pub vout: Vec<RawTxOutput>,
    pub hex: Option<String>,
    /// `None` for mempool transactions.
    pub chain: Option<ChainPosition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawTxInput {
    /// `None` for coinbase inputs.
    pub prevout: Option<OutPoint>,
    pub coinbase: Option<String>,
    pub sequence: u32,
}

impl RawTxInput {
    pub fn is_coinbase(&self) -> bool {
        self.coinbase.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawTxOutput {
    pub value: Amount,
    pub n: u32,
    pub script_pub_key: String,
    pub script_type: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainPosition {
    pub block_hash: BlockHash,
    pub confirmations: u64,
    pub time: u64,
    pub block_time: u64,
}

impl RawTransaction {
    pub fn from_value(value: &serde_json::Value, scale: u32) -> Result<Self, ResponseParseError> {
        let context = format!(
            "Transaction {}",
            short_id(value.get("txid").and_then(serde_json::Value::as_str))
        );
        let r = FieldReader::new(&context, value)?;

        let txid = r.txid("txid")?;
        let hash = r.wtxid("hash")?;
        let version = r.integer("version")?;
        let size = r.integer("size")?;
        let vsize = r.integer("vsize")?;
        let weight = r.opt_integer("weight")?;
        let locktime = r.integer("locktime")?;

        let vin = r
            .array("vin")?
            .iter()
            .enumerate()
            .map(|(i, item)| parse_input(&r.nested(&format!("vin[{i}]"), item)?))
            .collect::<Result<Vec<_>, _>>()?;
        let vout = r
            .array("vout")?
            .iter()
            .enumerate()
            .map(|(i, item)| parse_output(&r.nested(&format!("vout[{i}]"), item)?, scale))
            .collect::<Result<Vec<_>, _>>()?;

        let hex = match r.raw("hex") {
            Some(_) => Some(r.hex("hex")?),
            None => None,
        };

        let chain = if CHAIN_FIELDS.iter().any(|f| r.raw(f).is_some()) {
            Some(ChainPosition {
                block_hash: r.block_hash("blockhash")?,
                confirmations: r.integer("confirmations")?,
                time: r.integer("time")?,
                block_time: r.integer("blocktime")?,
            })
        } else {
            None
        };

        Ok(Self {
            txid,
            hash,
            version,
            size,
            vsize,
            weight,
            locktime,
            vin,
            vout,
            hex,
            chain,
        })
    }

    pub fn is_confirmed(&self) -> bool {
        self.chain.as_ref().is_some_and(|c| c.confirmations > 0)
    }
}

fn parse_input(r: &FieldReader<'_>) -> Result<RawTxInput, ResponseParseError> {
    let sequence = r.integer("sequence")?;
    if let Some(coinbase) = r.opt_string("coinbase")? {
        return Ok(RawTxInput {
            prevout: None,
            coinbase: Some(coinbase),
            sequence,
        });
    }
    Ok(RawTxInput {
        prevout: Some(OutPoint::new(r.txid("txid")?, r.integer("vout")?)),
        coinbase: None,
        sequence,
    })
}

fn parse_output(r: &FieldReader<'_>, scale: u32) -> Result<RawTxOutput, ResponseParseError> {
    let value = r.amount("value", scale)?;
    let n = r.integer("n")?;
    let script = r.nested("scriptPubKey", r.raw("scriptPubKey").unwrap_or(&NULL))?;

    // older daemons list addresses, newer ones a single address
    let address = match script.opt_string("address")? {
        Some(address) => Some(address),
        None => script
            .raw("addresses")
            .and_then(serde_json::Value::as_array)
            .and_then(|list| list.first())
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned),
    };

    Ok(RawTxOutput {
        value,
        n,
        script_pub_key: script.string("hex")?,
        script_type: script.opt_string("type")?,
        address,
    })
}

/// Result of `signrawtransaction` / `signrawtransactionwithwallet`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignedRawTransaction {
    pub hex: String,
    pub complete: bool,
    /// Per-input signing errors, verbatim.
    pub errors: Vec<serde_json::Value>,
}

impl SignedRawTransaction {
    pub fn from_value(value: &serde_json::Value) -> Result<Self, ResponseParseError> {
        let r = FieldReader::new("Signed transaction", value)?;
        let errors = match r.raw("errors") {
            Some(_) => r.array("errors")?.clone(),
            None => Vec::new(),
        };
        Ok(Self {
            hex: r.hex("hex")?,
            complete: r.bool("complete")?,
            errors,
        })
    }

    /// Serialized size in bytes.
    pub fn size(&self) -> usize {
        self.hex.len() / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;

    #[test]
    fn parses_confirmed_transaction() {
        let tx = RawTransaction::from_value(&raw_tx_json(true), 8).expect("fixture must parse");
        assert_eq!(tx.txid, txid_from_byte(0xa1));
        assert_eq!(tx.vin.len(), 2);
        assert!(tx.vin[0].is_coinbase());
        assert_eq!(
            tx.vin[1].prevout,
            Some(OutPoint::new(txid_from_byte(0xb0), 3))
        );
        assert_eq!(tx.vout[0].value.to_string(), "0.00150000");
        assert_eq!(tx.vout[0].address.as_deref(), Some(ADDR_1));
        assert_eq!(tx.vout[1].address.as_deref(), Some(ADDR_2));
        let chain = tx.chain.expect("confirmed tx has chain position");
        assert_eq!(chain.confirmations, 6);
        assert!(tx.weight.is_some());
    }

    #[test]
    fn mempool_transaction_has_no_chain_position() {
        let tx = RawTransaction::from_value(&raw_tx_json(false), 8).expect("fixture must parse");
        assert!(tx.chain.is_none());
        assert!(!tx.is_confirmed());
    }

    #[test]
    fn partial_chain_position_is_rejected() {
        let mut json = raw_tx_json(true);
        json.as_object_mut().unwrap().remove("blocktime");
        let err = RawTransaction::from_value(&json, 8).expect_err("partial chain data");
        assert_eq!(err.field, "blocktime");
    }

    #[test]
    fn error_context_uses_short_txid() {
        let mut json = raw_tx_json(true);
        json["vout"][0]["value"] = serde_json::json!("lots");
        let err = RawTransaction::from_value(&json, 8).expect_err("bad value");
        assert_eq!(err.context, "Transaction [\"a1a1a1a1...\"]");
        assert_eq!(err.field, "vout[0].value");
        assert!(err.to_string().contains("expected amount, got string"));
    }

    #[test]
    fn signed_transaction_fields() {
        let signed = SignedRawTransaction::from_value(&signed_json("0200ab", false)).unwrap();
        assert!(!signed.complete);
        assert_eq!(signed.size(), 3);

        let err = SignedRawTransaction::from_value(&serde_json::json!({"hex": "zz", "complete": true}))
            .expect_err("non-hex must fail");
        assert_eq!(err.field, "hex");

        let err = SignedRawTransaction::from_value(&serde_json::json!({"hex": "00"}))
            .expect_err("missing complete");
        assert_eq!(err.field, "complete");
    }
}
