use anyhow::{Context, Result};
use tezstat_codec::ValueCodec;
use tezstat_common::{BlockHash, BlockInfo};

pub mod fjall;
pub mod memory;

pub(crate) fn key(hash: &BlockHash) -> Result<Vec<u8>> {
    Ok(hash.encode()?)
}

pub(crate) fn encode(info: &BlockInfo) -> Result<Vec<u8>> {
    info.encode().with_context(|| format!("could not encode block info {}", info.hash()))
}

pub(crate) fn decode(hash: &BlockHash, bytes: &[u8]) -> Result<BlockInfo> {
    BlockInfo::decode(bytes).with_context(|| format!("could not decode cached block info {hash}"))
}
