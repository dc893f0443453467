//! Block fixtures shared by module tests.
//!
//! Fixtures are built as node-shaped JSON and decoded through the same
//! strict path as RPC responses, so they stay valid for the decoder.

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use tezstat_common::{Base58Hash, Block, BlockHash, ShellHeader};

pub mod operations;

/// A valid KT1 address.
pub const KT1: &str = "KT1MruMYHugk6x7qWQGeFKoV4fuarhTfoV6t";

/// Deterministic 32-byte identifier.
pub fn hash(seed: u8) -> Base58Hash {
    Base58Hash::new(vec![seed; 32])
}

/// Identity of the block at `level` in synthetic chains.
pub fn block_hash(level: i64) -> BlockHash {
    let mut bytes = vec![0x01, 0x34];
    bytes.extend_from_slice(&level.to_be_bytes());
    bytes.resize(34, 0xb1);
    Base58Hash::new(bytes)
}

pub fn raw_header_json(level: i64, timestamp: DateTime<Utc>, predecessor: &BlockHash) -> Value {
    json!({
        "level": level,
        "proto": 10,
        "predecessor": predecessor.to_string(),
        "timestamp": timestamp.to_rfc3339(),
        "validation_pass": 4,
        "operations_hash": hash(0x21).to_string(),
        "fitness": ["01", "0000a1b2"],
        "context": hash(0x22).to_string(),
        "priority": level % 5,
        "proof_of_work_nonce": "0de5f1f5a6ab0000",
        "seed_nonce_hash": hash(0x23).to_string(),
        "liquidity_baking_escape_vote": false,
        "signature": hash(0x24).to_string()
    })
}

pub fn metadata_json(level: i64) -> Value {
    json!({
        "protocol": hash(0x31).to_string(),
        "next_protocol": hash(0x31).to_string(),
        "test_chain_status": {"status": "not_running"},
        "max_operations_ttl": 120,
        "max_operation_data_length": 32768,
        "max_block_header_length": 239,
        "max_operation_list_length": [
            {"max_size": 4194304, "max_op": 2048},
            {"max_size": 32768},
            {"max_size": 135168, "max_op": 132},
            {"max_size": 524288}
        ],
        "baker": KT1,
        "level_info": {
            "level": level,
            "level_position": level - 1,
            "cycle": level / 8192,
            "cycle_position": level % 8192,
            "expected_commitment": false
        },
        "voting_period_info": {
            "voting_period": {"index": 50, "kind": "proposal", "start_position": 1589248},
            "position": 100,
            "remaining": 40859
        },
        "nonce_hash": null,
        "consumed_gas": "1042000",
        "deactivated": [],
        "balance_updates": [
            {"kind": "contract", "contract": KT1, "change": "-640000000", "origin": "block"},
            {"kind": "freezer", "category": "deposits", "delegate": KT1, "cycle": 5, "change": "640000000", "origin": "block"}
        ],
        "liquidity_baking_escape_ema": 243180,
        "implicit_operations_results": []
    })
}

/// Applied block carrying `operations` as its operation groups.
pub fn block_json(
    level: i64,
    timestamp: DateTime<Utc>,
    hash: &BlockHash,
    predecessor: &BlockHash,
    operations: Value,
) -> Value {
    json!({
        "protocol": self::hash(0x31).to_string(),
        "chain_id": self::hash(0x32).to_string(),
        "hash": hash.to_string(),
        "header": raw_header_json(level, timestamp, predecessor),
        "metadata": metadata_json(level),
        "operations": operations
    })
}

pub fn shell_header(block: &Block) -> ShellHeader {
    ShellHeader {
        hash: block.hash.clone(),
        level: block.header.level,
        proto: block.header.proto,
        predecessor: block.header.predecessor.clone(),
        timestamp: block.header.timestamp,
        validation_pass: block.header.validation_pass,
        operations_hash: block.header.operations_hash.clone(),
        fitness: block.header.fitness.clone(),
        context: block.header.context.clone(),
        protocol_data: vec![0; 8],
    }
}

/// Linear chain of applied blocks at fixed spacing.
///
/// Level 0 is genesis and is recorded as its own predecessor. Every block is
/// baked at priority `level % 5` and carries one endorsement with
/// `level % 4 + 1` slots and one transaction consuming `level * 1000`
/// milligas.
#[derive(Debug, Clone)]
pub struct SyntheticChain {
    pub blocks: Vec<Block>,
}

impl SyntheticChain {
    pub fn new(len: usize, genesis_time: DateTime<Utc>, spacing: Duration) -> Self {
        let blocks = (0..len as i64)
            .map(|level| {
                let hash = block_hash(level);
                let predecessor = if level == 0 { hash.clone() } else { block_hash(level - 1) };
                let timestamp = genesis_time + spacing * level as i32;
                let operations = json!([
                    [operations::endorsement(level, level as usize % 4 + 1)],
                    [],
                    [],
                    [operations::transaction(level as u64 * 1000)]
                ]);
                let raw = block_json(level, timestamp, &hash, &predecessor, operations);
                serde_json::from_value(raw).unwrap_or_else(|e| panic!("fixture block {level}: {e}"))
            })
            .collect();
        Self { blocks }
    }

    pub fn head(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn get(&self, hash: &BlockHash) -> Option<&Block> {
        self.blocks.iter().find(|b| &b.hash == hash)
    }

    pub fn at_level(&self, level: i64) -> &Block {
        &self.blocks[level as usize]
    }
}
