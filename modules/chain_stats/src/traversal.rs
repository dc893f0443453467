use crate::ChainStats;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tezstat_common::{BlockInfo, BlockSummary};
use tezstat_module_node_rpc::BlockRef;
use tracing::{debug, info};

impl ChainStats {
    /// Summaries of every block with `start <= timestamp < end`, oldest
    /// first.
    ///
    /// Walks predecessors from the current head and stops at the first block
    /// older than `start`, or at genesis. A failure at any step aborts the
    /// whole call.
    pub async fn get_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BlockSummary>> {
        if start >= end {
            return Ok(Vec::new());
        }

        let head = self.rpc.get_header(&BlockRef::Head).await.context("fetching head header")?;
        info!(level = head.level, hash = %head.hash, %start, %end, "Walking back from head");

        let mut next = head.hash;
        // In-window block still waiting for its predecessor
        let mut pending: Option<BlockInfo> = None;
        let mut summaries = Vec::new();
        loop {
            let info = self.resolver.resolve(&next).await?;
            if let Some(successor) = pending.take() {
                summaries.push(BlockSummary::new(successor, &info));
            }

            let timestamp = info.timestamp();
            if timestamp < start {
                break;
            }
            if info.is_genesis() {
                if timestamp < end {
                    summaries.push(BlockSummary::new(info.clone(), &info));
                }
                debug!("Reached genesis");
                break;
            }

            next = info.predecessor().clone();
            if timestamp < end {
                pending = Some(info);
            }
        }

        summaries.reverse();
        info!(blocks = summaries.len(), "Range collected");
        Ok(summaries)
    }
}
