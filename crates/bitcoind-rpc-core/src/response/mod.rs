//! Typed views of daemon results.
//!
//! Each parser validates field by field and stops at the first violation;
//! no partially populated value is ever returned.

mod block;
pub(crate) mod parsing;
mod network;
mod transaction;
mod unspent;

pub use block::Block;
pub use network::NetworkInfo;
pub use transaction::{ChainPosition, RawTransaction, RawTxInput, RawTxOutput, SignedRawTransaction};
pub use unspent::{Output, UnspentOutputs};

/// Short JSON type name used in parse error messages.
pub fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        serde_json::Value::Number(_) => "float",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
