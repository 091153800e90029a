use bitcoin::{OutPoint, Txid};
use serde::Serialize;

use crate::amount::Amount;
use crate::error::ResponseParseError;

use super::json_type;
use super::parsing::FieldReader;

/// One `listunspent` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Output {
    pub txid: Txid,
    pub vout: u32,
    pub address: Option<String>,
    pub label: Option<String>,
    pub script_pub_key: Option<String>,
    pub redeem_script: Option<String>,
    /// `None` when the daemon value is not a valid decimal amount.
    pub amount: Option<Amount>,
    pub confirmations: Option<u64>,
    pub spendable: Option<bool>,
    pub solvable: Option<bool>,
    pub safe: Option<bool>,
}

impl Output {
    pub fn from_value(value: &serde_json::Value, scale: u32) -> Result<Self, ResponseParseError> {
        Self::parse("Unspent output", value, scale)
    }

    fn parse(context: &str, value: &serde_json::Value, scale: u32) -> Result<Self, ResponseParseError> {
        let r = FieldReader::new(context, value)?;
        Ok(Self {
            txid: r.txid("txid")?,
            vout: r.integer("vout")?,
            address: r.opt_string("address")?,
            label: r.opt_string("label")?,
            script_pub_key: r.opt_string("scriptPubKey")?,
            redeem_script: r.opt_string("redeemScript")?,
            amount: r
                .raw("amount")
                .and_then(|v| Amount::from_json(v, scale)),
            confirmations: r.opt_integer("confirmations")?,
            spendable: r.opt_bool("spendable")?,
            solvable: r.opt_bool("solvable")?,
            safe: r.opt_bool("safe")?,
        })
    }

    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(self.txid, self.vout)
    }
}

/// The ordered result of `listunspent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UnspentOutputs {
    outputs: Vec<Output>,
}

impl UnspentOutputs {
    pub fn from_value(value: &serde_json::Value, scale: u32) -> Result<Self, ResponseParseError> {
        let items = value.as_array().ok_or_else(|| ResponseParseError {
            context: "Unspent outputs".to_owned(),
            field: "result".to_owned(),
            expected: "array",
            got: json_type(value),
        })?;
        let outputs = items
            .iter()
            .enumerate()
            .map(|(i, item)| Output::parse(&format!("Unspent output [{i}]"), item, scale))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { outputs })
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Output> {
        self.outputs.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Output> {
        self.outputs.iter()
    }
}

impl From<Vec<Output>> for UnspentOutputs {
    fn from(outputs: Vec<Output>) -> Self {
        Self { outputs }
    }
}

impl IntoIterator for UnspentOutputs {
    type Item = Output;
    type IntoIter = std::vec::IntoIter<Output>;

    fn into_iter(self) -> Self::IntoIter {
        self.outputs.into_iter()
    }
}

impl<'a> IntoIterator for &'a UnspentOutputs {
    type Item = &'a Output;
    type IntoIter = std::slice::Iter<'a, Output>;

    fn into_iter(self) -> Self::IntoIter {
        self.outputs.iter()
    }
}
