//! On-disk block info cache using Fjall

use std::{fs, path::PathBuf};

use anyhow::Result;
use fjall::{Database, Keyspace, KeyspaceCreateOptions};
use tezstat_common::{BlockHash, BlockInfo};
use tracing::{debug, info, warn};

use crate::{BlockCache, BlockCacheConfig};

pub struct FjallBlockCache {
    database: Database,
    blocks: Keyspace,
}

impl FjallBlockCache {
    pub fn new(config: &BlockCacheConfig) -> Result<Self> {
        let path = PathBuf::from(&config.database_path);
        if config.clear_on_start && path.exists() {
            fs::remove_dir_all(&path)?;
        }
        info!(
            "Caching block info with Fjall on disk ({}, keyspace {})",
            path.display(),
            config.keyspace
        );
        let database = Database::builder(&path).open()?;
        let blocks = database.keyspace(&config.keyspace, KeyspaceCreateOptions::default)?;
        Ok(Self { database, blocks })
    }
}

impl BlockCache for FjallBlockCache {
    fn get(&self, hash: &BlockHash) -> Result<Option<BlockInfo>> {
        let Some(bytes) = self.blocks.get(super::key(hash)?)? else {
            return Ok(None);
        };
        super::decode(hash, &bytes).map(Some)
    }

    fn put(&self, info: &BlockInfo) -> Result<()> {
        let key = super::key(info.hash())?;
        let value = super::encode(info)?;
        if let Some(existing) = self.blocks.get(&key)? {
            if &*existing != value.as_slice() {
                warn!(hash = %info.hash(), "Cached block info differs from refetch, keeping original");
            }
            return Ok(());
        }

        let mut batch = self.database.batch();
        batch.insert(&self.blocks, key, value);
        batch.commit()?;
        debug!(hash = %info.hash(), level = info.header.level, "Cached block info");
        Ok(())
    }
}
