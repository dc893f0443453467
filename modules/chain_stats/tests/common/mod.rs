#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tezstat_common::{Block, BlockHash, FullHeader, OperationGroups, ShellHeader};
use tezstat_module_block_cache::{BlockCache, MemoryBlockCache};
use tezstat_module_chain_stats::{ChainStats, ChainStatsConfig};
use tezstat_module_node_rpc::{BlockRef, HeadStream, NodeRpc, RpcError};
use tezstat_test_utils::SyntheticChain;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Seconds added to the predecessor timestamp for the minimal valid time.
pub const MINIMAL_DELAY: i64 = 30;

pub fn genesis_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2021-08-06T12:00:00Z").unwrap().to_utc()
}

/// Node backed by a [`SyntheticChain`] at one-minute spacing.
pub struct MockNode {
    pub chain: SyntheticChain,
    block_fetches: AtomicUsize,
    failing: Mutex<Option<BlockHash>>,
    feed: Mutex<Option<HeadStream>>,
    minimal_valid_time_calls: Mutex<Vec<(BlockRef, u64, u64)>>,
}

/// Test side of a mocked head feed.
pub struct FeedControl {
    pub headers: mpsc::Sender<ShellHeader>,
    pub errors: oneshot::Sender<RpcError>,
}

impl MockNode {
    pub fn new(len: usize) -> Arc<Self> {
        Arc::new(Self {
            chain: SyntheticChain::new(len, genesis_time(), Duration::minutes(1)),
            block_fetches: AtomicUsize::new(0),
            failing: Mutex::new(None),
            feed: Mutex::new(None),
            minimal_valid_time_calls: Mutex::new(Vec::new()),
        })
    }

    pub fn block_fetches(&self) -> usize {
        self.block_fetches.load(Ordering::SeqCst)
    }

    /// Every `(block, priority, endorsing_power)` asked for so far.
    pub fn minimal_valid_time_calls(&self) -> Vec<(BlockRef, u64, u64)> {
        self.minimal_valid_time_calls.lock().unwrap().clone()
    }

    pub fn fail_block(&self, hash: &BlockHash) {
        *self.failing.lock().unwrap() = Some(hash.clone());
    }

    /// Arms the next `stream_heads` call.
    pub fn feed(&self, buffer: usize) -> FeedControl {
        let (headers_tx, headers) = mpsc::channel(buffer);
        let (errors_tx, errors) = oneshot::channel();
        *self.feed.lock().unwrap() = Some(HeadStream { headers, errors });
        FeedControl {
            headers: headers_tx,
            errors: errors_tx,
        }
    }

    fn lookup(&self, block: &BlockRef) -> Result<&Block, RpcError> {
        let found = match block {
            BlockRef::Head => Some(self.chain.head()),
            BlockRef::Hash(hash) => self.chain.get(hash),
            BlockRef::Level(level) => self.chain.blocks.get(*level as usize),
        };
        found.ok_or(RpcError::Truncated {
            endpoint: "unknown_block",
        })
    }
}

#[async_trait]
impl NodeRpc for MockNode {
    async fn get_header(&self, block: &BlockRef) -> Result<FullHeader, RpcError> {
        Ok(self.lookup(block)?.full_header())
    }

    async fn get_block(&self, block: &BlockRef) -> Result<Block, RpcError> {
        self.block_fetches.fetch_add(1, Ordering::SeqCst);
        let found = self.lookup(block)?;
        if self.failing.lock().unwrap().as_ref() == Some(&found.hash) {
            return Err(RpcError::Truncated {
                endpoint: "get_block",
            });
        }
        Ok(found.clone())
    }

    async fn get_operations(&self, block: &BlockRef) -> Result<OperationGroups, RpcError> {
        Ok(self.lookup(block)?.operations.clone())
    }

    async fn get_minimal_valid_time(
        &self,
        block: &BlockRef,
        priority: u64,
        endorsing_power: u64,
    ) -> Result<DateTime<Utc>, RpcError> {
        self.minimal_valid_time_calls.lock().unwrap().push((block.clone(), priority, endorsing_power));
        Ok(self.lookup(block)?.header.timestamp + Duration::seconds(MINIMAL_DELAY))
    }

    async fn stream_heads(&self, _token: CancellationToken) -> Result<HeadStream, RpcError> {
        self.feed.lock().unwrap().take().ok_or(RpcError::Truncated {
            endpoint: "monitor_heads",
        })
    }
}

pub fn stats(node: &Arc<MockNode>, config: ChainStatsConfig) -> (ChainStats, Arc<MemoryBlockCache>) {
    let cache = Arc::new(MemoryBlockCache::new());
    let stats = ChainStats::new(node.clone(), cache.clone() as Arc<dyn BlockCache>, config);
    (stats, cache)
}
