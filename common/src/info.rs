use crate::block::{Block, FullHeader, MetadataInfo};
use crate::hash::BlockHash;
use crate::stats::Statistics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-block derived data, the unit of caching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub header: FullHeader,
    pub stat: Statistics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataInfo>,
    pub minimal_valid_time: DateTime<Utc>,
}

impl BlockInfo {
    pub fn from_block(block: &Block, minimal_valid_time: DateTime<Utc>) -> Self {
        Self::with_statistics(block, block.statistics(), minimal_valid_time)
    }

    /// Builds the info from statistics already aggregated for `block`.
    pub fn with_statistics(block: &Block, stat: Statistics, minimal_valid_time: DateTime<Utc>) -> Self {
        Self {
            header: block.full_header(),
            stat,
            metadata: block.metadata_info(),
            minimal_valid_time,
        }
    }

    pub fn hash(&self) -> &BlockHash {
        &self.header.hash
    }

    pub fn predecessor(&self) -> &BlockHash {
        &self.header.predecessor
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.header.timestamp
    }

    /// Genesis is recorded as its own predecessor.
    pub fn is_genesis(&self) -> bool {
        self.header.predecessor == self.header.hash
    }
}

/// [`BlockInfo`] with the delays measured from its predecessor, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSummary {
    #[serde(flatten)]
    pub info: BlockInfo,
    pub predecessor_timestamp: DateTime<Utc>,
    pub delay: i64,
    pub minimal_delay: i64,
}

impl BlockSummary {
    pub fn new(info: BlockInfo, predecessor: &BlockInfo) -> Self {
        let predecessor_timestamp = predecessor.timestamp();
        let delay = (info.timestamp() - predecessor_timestamp).num_seconds();
        let minimal_delay = (info.minimal_valid_time - predecessor_timestamp).num_seconds();
        Self {
            info,
            predecessor_timestamp,
            delay,
            minimal_delay,
        }
    }
}
