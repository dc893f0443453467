//! Block headers, block metadata and the full block as served by the node.

use crate::balance::BalanceUpdate;
use crate::hash::{Base58Hash, BlockHash, ChainId, ProtocolHash};
use crate::internal::ImplicitOperationResult;
use crate::operation::OperationGroups;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as, DisplayFromStr};

/// Protocol-independent header, as pushed by the head monitor.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShellHeader {
    pub hash: BlockHash,
    pub level: i64,
    pub proto: u64,
    pub predecessor: BlockHash,
    pub timestamp: DateTime<Utc>,
    pub validation_pass: u64,
    pub operations_hash: Base58Hash,
    #[serde_as(as = "Vec<Hex>")]
    pub fitness: Vec<Vec<u8>>,
    pub context: Base58Hash,
    #[serde_as(as = "Hex")]
    pub protocol_data: Vec<u8>,
}

/// Header as embedded in a block, without the block's own identity.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawHeader {
    pub level: i64,
    pub proto: u64,
    pub predecessor: BlockHash,
    pub timestamp: DateTime<Utc>,
    pub validation_pass: u64,
    pub operations_hash: Base58Hash,
    #[serde_as(as = "Vec<Hex>")]
    pub fitness: Vec<Vec<u8>>,
    pub context: Base58Hash,
    pub priority: u64,
    #[serde_as(as = "Hex")]
    pub proof_of_work_nonce: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_nonce_hash: Option<Base58Hash>,
    pub liquidity_baking_escape_vote: bool,
    pub signature: Base58Hash,
}

/// Header with the block's protocol, chain and identity.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FullHeader {
    pub protocol: ProtocolHash,
    pub chain_id: ChainId,
    pub hash: BlockHash,
    pub level: i64,
    pub proto: u64,
    pub predecessor: BlockHash,
    pub timestamp: DateTime<Utc>,
    pub validation_pass: u64,
    pub operations_hash: Base58Hash,
    #[serde_as(as = "Vec<Hex>")]
    pub fitness: Vec<Vec<u8>>,
    pub context: Base58Hash,
    pub priority: u64,
    #[serde_as(as = "Hex")]
    pub proof_of_work_nonce: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_nonce_hash: Option<Base58Hash>,
    pub liquidity_baking_escape_vote: bool,
    pub signature: Base58Hash,
}

impl FullHeader {
    pub fn new(protocol: ProtocolHash, chain_id: ChainId, hash: BlockHash, raw: RawHeader) -> Self {
        Self {
            protocol,
            chain_id,
            hash,
            level: raw.level,
            proto: raw.proto,
            predecessor: raw.predecessor,
            timestamp: raw.timestamp,
            validation_pass: raw.validation_pass,
            operations_hash: raw.operations_hash,
            fitness: raw.fitness,
            context: raw.context,
            priority: raw.priority,
            proof_of_work_nonce: raw.proof_of_work_nonce,
            seed_nonce_hash: raw.seed_nonce_hash,
            liquidity_baking_escape_vote: raw.liquidity_baking_escape_vote,
            signature: raw.signature,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestChainStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<ProtocolHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genesis: Option<BlockHash>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaxOperationListLength {
    pub max_size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_op: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelInfo {
    pub level: i64,
    pub level_position: i64,
    pub cycle: i64,
    pub cycle_position: i64,
    pub expected_commitment: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VotingPeriod {
    pub index: i64,
    pub kind: String,
    pub start_position: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VotingPeriodInfo {
    pub voting_period: VotingPeriod,
    pub position: i64,
    pub remaining: i64,
}

/// Block metadata attached by the node once the block is applied.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderMetadata {
    pub protocol: ProtocolHash,
    pub next_protocol: ProtocolHash,
    pub test_chain_status: TestChainStatus,
    pub max_operations_ttl: i64,
    pub max_operation_data_length: i64,
    pub max_block_header_length: i64,
    pub max_operation_list_length: Vec<MaxOperationListLength>,
    pub baker: Base58Hash,
    pub level_info: LevelInfo,
    pub voting_period_info: VotingPeriodInfo,
    #[serde(default)]
    pub nonce_hash: Option<Base58Hash>,
    #[serde_as(as = "DisplayFromStr")]
    pub consumed_gas: u64,
    #[serde(default)]
    pub deactivated: Vec<Base58Hash>,
    #[serde(default)]
    pub balance_updates: Vec<BalanceUpdate>,
    pub liquidity_baking_escape_ema: i64,
    #[serde(default)]
    pub implicit_operations_results: Vec<ImplicitOperationResult>,
}

/// Summary of [`HeaderMetadata`] kept with cached block info.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataInfo {
    pub protocol: ProtocolHash,
    pub next_protocol: ProtocolHash,
    pub max_operations_ttl: i64,
    pub max_operation_data_length: i64,
    pub max_block_header_length: i64,
    pub baker: Base58Hash,
    pub level_info: LevelInfo,
    pub voting_period_info: VotingPeriodInfo,
    #[serde(default)]
    pub nonce_hash: Option<Base58Hash>,
    #[serde_as(as = "DisplayFromStr")]
    pub consumed_gas: u64,
    pub liquidity_baking_escape_ema: i64,
}

impl From<&HeaderMetadata> for MetadataInfo {
    fn from(m: &HeaderMetadata) -> Self {
        Self {
            protocol: m.protocol.clone(),
            next_protocol: m.next_protocol.clone(),
            max_operations_ttl: m.max_operations_ttl,
            max_operation_data_length: m.max_operation_data_length,
            max_block_header_length: m.max_block_header_length,
            baker: m.baker.clone(),
            level_info: m.level_info.clone(),
            voting_period_info: m.voting_period_info.clone(),
            nonce_hash: m.nonce_hash.clone(),
            consumed_gas: m.consumed_gas,
            liquidity_baking_escape_ema: m.liquidity_baking_escape_ema,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Block {
    pub protocol: ProtocolHash,
    pub chain_id: ChainId,
    pub hash: BlockHash,
    pub header: RawHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HeaderMetadata>,
    pub operations: OperationGroups,
}

impl Block {
    pub fn full_header(&self) -> FullHeader {
        FullHeader::new(
            self.protocol.clone(),
            self.chain_id.clone(),
            self.hash.clone(),
            self.header.clone(),
        )
    }

    pub fn metadata_info(&self) -> Option<MetadataInfo> {
        self.metadata.as_ref().map(MetadataInfo::from)
    }
}
