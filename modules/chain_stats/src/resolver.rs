use anyhow::{Context, Result};
use std::sync::Arc;
use tezstat_common::{BlockHash, BlockInfo};
use tezstat_module_block_cache::BlockCache;
use tezstat_module_node_rpc::{BlockRef, NodeRpc};
use tracing::{debug, info};

/// Read-through resolution of [`BlockInfo`]: cache first, then the node.
pub struct BlockInfoResolver {
    rpc: Arc<dyn NodeRpc>,
    cache: Arc<dyn BlockCache>,
}

impl BlockInfoResolver {
    pub fn new(rpc: Arc<dyn NodeRpc>, cache: Arc<dyn BlockCache>) -> Self {
        Self { rpc, cache }
    }

    pub async fn resolve(&self, hash: &BlockHash) -> Result<BlockInfo> {
        if let Some(info) = self.cache.get(hash)? {
            debug!(%hash, "Block info cache hit");
            return Ok(info);
        }

        let block = self
            .rpc
            .get_block(&BlockRef::from(hash))
            .await
            .with_context(|| format!("fetching block {hash}"))?;
        let stat = block.statistics();
        let minimal_valid_time = self
            .rpc
            .get_minimal_valid_time(
                &BlockRef::from(&block.header.predecessor),
                block.header.priority,
                stat.slots,
            )
            .await
            .with_context(|| format!("fetching minimal valid time for {hash}"))?;

        let info = BlockInfo::with_statistics(&block, stat, minimal_valid_time);
        self.cache.put(&info)?;
        info!(
            level = info.header.level,
            %hash,
            ops = info.stat.num_ops.total,
            slots = info.stat.slots,
            "Block info cached"
        );
        Ok(info)
    }
}
