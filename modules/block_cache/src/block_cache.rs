//! Tezstat block cache module
//! Maps block hashes to their derived [`BlockInfo`], so each historical
//! block is fetched and decoded at most once.

use anyhow::Result;
use config::Config;
use serde::Deserialize;
use std::sync::Arc;
use tezstat_common::{BlockHash, BlockInfo};
use tracing::info;

mod stores;

pub use stores::{fjall::FjallBlockCache, memory::MemoryBlockCache};

/// Lookup and idempotent insert of block info.
///
/// Implementations never fetch; read-through composition belongs to the
/// caller. A hash, once written, keeps its first content.
pub trait BlockCache: Send + Sync {
    fn get(&self, hash: &BlockHash) -> Result<Option<BlockInfo>>;

    /// Inserts `info` under its own header hash.
    fn put(&self, info: &BlockInfo) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Fjall,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BlockCacheConfig {
    pub store: StoreKind,
    pub database_path: String,
    pub keyspace: String,
    #[serde(default)]
    pub clear_on_start: bool,
}

impl BlockCacheConfig {
    pub fn try_load(config: &Config) -> Result<Self> {
        let full = Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config.default.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(config.clone())
            .build()?;
        Ok(full.try_deserialize()?)
    }
}

/// Opens the store selected by `config`.
pub fn open(config: &BlockCacheConfig) -> Result<Arc<dyn BlockCache>> {
    Ok(match config.store {
        StoreKind::Fjall => Arc::new(FjallBlockCache::new(config)?),
        StoreKind::Memory => {
            info!("Caching block info in memory");
            Arc::new(MemoryBlockCache::new())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_select_fjall() {
        let cfg = BlockCacheConfig::try_load(&Config::default()).unwrap();
        assert_eq!(cfg.store, StoreKind::Fjall);
        assert_eq!(cfg.keyspace, "block_info");
        assert!(!cfg.clear_on_start);
    }

    #[test]
    fn overrides_apply() {
        let config = Config::builder()
            .set_override("store", "memory")
            .unwrap()
            .set_override("database-path", "/tmp/elsewhere")
            .unwrap()
            .build()
            .unwrap();
        let cfg = BlockCacheConfig::try_load(&config).unwrap();
        assert_eq!(cfg.store, StoreKind::Memory);
        assert_eq!(cfg.database_path, "/tmp/elsewhere");
    }
}
