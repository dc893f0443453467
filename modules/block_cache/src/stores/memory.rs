//! In-memory block info cache using DashMap

use anyhow::Result;
use dashmap::{mapref::entry::Entry, DashMap};
use tezstat_common::{BlockHash, BlockInfo};

use crate::BlockCache;

/// Holds encoded block info, so reads behave exactly like the on-disk store.
#[derive(Default)]
pub struct MemoryBlockCache {
    blocks: DashMap<Vec<u8>, Vec<u8>>,
}

impl MemoryBlockCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl BlockCache for MemoryBlockCache {
    fn get(&self, hash: &BlockHash) -> Result<Option<BlockInfo>> {
        // Clone out of the shard guard before decoding
        let Some(bytes) = self.blocks.get(&super::key(hash)?).map(|v| v.clone()) else {
            return Ok(None);
        };
        super::decode(hash, &bytes).map(Some)
    }

    fn put(&self, info: &BlockInfo) -> Result<()> {
        let key = super::key(info.hash())?;
        if let Entry::Vacant(entry) = self.blocks.entry(key) {
            entry.insert(super::encode(info)?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use std::sync::Arc;
    use tezstat_test_utils::SyntheticChain;

    fn info(level: usize) -> BlockInfo {
        let chain = SyntheticChain::new(level + 1, DateTime::<Utc>::UNIX_EPOCH, Duration::minutes(1));
        let block = &chain.blocks[level];
        BlockInfo::from_block(block, block.header.timestamp)
    }

    #[test]
    fn put_then_get() {
        let cache = MemoryBlockCache::new();
        let info = info(3);
        assert!(cache.get(info.hash()).unwrap().is_none());
        cache.put(&info).unwrap();
        assert_eq!(cache.get(info.hash()).unwrap(), Some(info));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_fills_leave_one_entry() {
        let cache = Arc::new(MemoryBlockCache::new());
        let info = info(2);
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let info = info.clone();
                tokio::spawn(async move { cache.put(&info) })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(info.hash()).unwrap(), Some(info));
    }
}
