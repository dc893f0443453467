//! Tezstat chain statistics module
//! Walks the chain backward from the head to summarise a time window, and
//! follows new heads live. Block info is resolved through the block cache so
//! each block is fetched from the node at most once.

use std::sync::Arc;
use tezstat_module_block_cache::BlockCache;
use tezstat_module_node_rpc::NodeRpc;

mod configuration;
mod monitor;
mod resolver;
mod traversal;

pub use configuration::ChainStatsConfig;
pub use monitor::{MonitorError, MonitorHandle};
pub use resolver::BlockInfoResolver;

/// Block statistics over a node and a cache.
pub struct ChainStats {
    rpc: Arc<dyn NodeRpc>,
    resolver: Arc<BlockInfoResolver>,
    config: ChainStatsConfig,
}

impl ChainStats {
    pub fn new(rpc: Arc<dyn NodeRpc>, cache: Arc<dyn BlockCache>, config: ChainStatsConfig) -> Self {
        let resolver = Arc::new(BlockInfoResolver::new(rpc.clone(), cache));
        Self {
            rpc,
            resolver,
            config,
        }
    }

    pub fn resolver(&self) -> &BlockInfoResolver {
        &self.resolver
    }
}
