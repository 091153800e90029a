//! Chain queries: block count, blocks and confirmed transactions.

use std::sync::Arc;

use bitcoin::{BlockHash, Txid};

use crate::client::NodeContext;
use crate::error::CoreError;
use crate::response::{Block, RawTransaction};

pub struct BlockChain {
    ctx: Arc<NodeContext>,
}

impl BlockChain {
    pub(crate) fn new(ctx: Arc<NodeContext>) -> Self {
        Self { ctx }
    }

    pub async fn get_block_count(&self) -> Result<u64, CoreError> {
        self.ctx
            .call("getblockcount", None, Vec::new())
            .await?
            .into_u64("getblockcount")
    }

    pub async fn get_block_hash(&self, height: u64) -> Result<BlockHash, CoreError> {
        self.ctx
            .call("getblockhash", None, vec![serde_json::json!(height)])
            .await?
            .into_hash("getblockhash")
    }

    pub async fn get_block(&self, hash: &BlockHash) -> Result<Block, CoreError> {
        let result = self
            .ctx
            .call(
                "getblock",
                None,
                vec![serde_json::json!(hash.to_string()), serde_json::json!(1)],
            )
            .await?
            .require_result("getblock")?;
        Ok(Block::from_value(&result)?)
    }

    pub async fn get_block_by_height(&self, height: u64) -> Result<Block, CoreError> {
        let hash = self.get_block_hash(height).await?;
        self.get_block(&hash).await
    }

    /// Verbose `getrawtransaction`. Outside the mempool this needs
    /// `-txindex` on the node.
    pub async fn get_raw_transaction(&self, txid: &Txid) -> Result<RawTransaction, CoreError> {
        let result = self
            .ctx
            .call(
                "getrawtransaction",
                None,
                vec![serde_json::json!(txid.to_string()), serde_json::json!(true)],
            )
            .await?
            .require_result("getrawtransaction")?;
        Ok(RawTransaction::from_value(&result, self.ctx.scale())?)
    }
}
