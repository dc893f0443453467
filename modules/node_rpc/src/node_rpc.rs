//! Tezstat node RPC module
//! Typed access to a Tezos node's block, operation and timing endpoints,
//! and the streaming feed of new heads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use tezstat_common::{Block, BlockHash, FullHeader, OperationGroups, ShellHeader};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

mod client;
mod configuration;
mod error;
mod heads;

pub use client::HttpNodeRpc;
pub use configuration::NodeRpcConfig;
pub use error::RpcError;

/// Block selector in RPC paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockRef {
    Head,
    Hash(BlockHash),
    Level(i64),
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockRef::Head => f.write_str("head"),
            BlockRef::Hash(hash) => write!(f, "{hash}"),
            BlockRef::Level(level) => write!(f, "{level}"),
        }
    }
}

impl From<BlockHash> for BlockRef {
    fn from(hash: BlockHash) -> Self {
        BlockRef::Hash(hash)
    }
}

impl From<&BlockHash> for BlockRef {
    fn from(hash: &BlockHash) -> Self {
        BlockRef::Hash(hash.clone())
    }
}

/// Live feed of new heads.
///
/// `headers` closes when the feed ends. A feed that ends abnormally reports
/// exactly one error on `errors` first; a clean end drops the sender.
pub struct HeadStream {
    pub headers: mpsc::Receiver<ShellHeader>,
    pub errors: oneshot::Receiver<RpcError>,
}

#[async_trait]
pub trait NodeRpc: Send + Sync {
    async fn get_header(&self, block: &BlockRef) -> Result<FullHeader, RpcError>;

    async fn get_block(&self, block: &BlockRef) -> Result<Block, RpcError>;

    async fn get_operations(&self, block: &BlockRef) -> Result<OperationGroups, RpcError>;

    /// Earliest time a successor of `block` could be baked at `priority`
    /// with `endorsing_power` endorsement slots.
    async fn get_minimal_valid_time(
        &self,
        block: &BlockRef,
        priority: u64,
        endorsing_power: u64,
    ) -> Result<DateTime<Utc>, RpcError>;

    /// Subscribes to new heads until `token` is cancelled.
    async fn stream_heads(&self, token: CancellationToken) -> Result<HeadStream, RpcError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tezstat_test_utils::block_hash;

    #[test]
    fn block_refs_render_as_path_segments() {
        assert_eq!(BlockRef::Head.to_string(), "head");
        assert_eq!(BlockRef::Level(42).to_string(), "42");
        let hash = block_hash(1);
        assert_eq!(BlockRef::from(&hash).to_string(), hash.to_string());
    }
}
