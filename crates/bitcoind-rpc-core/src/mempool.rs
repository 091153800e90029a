use std::sync::Arc;

use bitcoin::Txid;

use crate::client::NodeContext;
use crate::error::{CoreError, ResponseParseError};
use crate::response::json_type;
use crate::validator::is_hash;

pub struct MemPool {
    ctx: Arc<NodeContext>,
}

impl MemPool {
    pub(crate) fn new(ctx: Arc<NodeContext>) -> Self {
        Self { ctx }
    }

    /// Txids currently in the node's mempool (`getrawmempool`).
    pub async fn get_raw(&self) -> Result<Vec<Txid>, CoreError> {
        let items = self
            .ctx
            .call("getrawmempool", None, Vec::new())
            .await?
            .into_array("getrawmempool")?;
        let txids = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str()
                    .filter(|s| is_hash(s, 64))
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| ResponseParseError {
                        context: "Method [getrawmempool]".to_owned(),
                        field: format!("result[{i}]"),
                        expected: "hash",
                        got: json_type(item),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(txids)
    }
}
