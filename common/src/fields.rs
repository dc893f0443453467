//! Enumeration of the primitive leaves of a serialisable value, used by
//! query front-ends to offer field selection over block summaries.

use crate::block::{FullHeader, LevelInfo, MetadataInfo, VotingPeriod, VotingPeriodInfo};
use crate::hash::Base58Hash;
use crate::info::{BlockInfo, BlockSummary};
use crate::stats::Statistics;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Bool,
    Int,
    Float,
    String,
    Time,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Bool => "bool",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::String => "string",
            FieldType::Time => "time",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub selector: Vec<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl Field {
    pub fn path(&self) -> String {
        self.selector.join(".")
    }
}

/// Lists every primitive leaf of `value`, ordered by selector.
///
/// Sequences and nulls are not leaves. Strings that parse as RFC 3339
/// timestamps are typed as time.
pub fn leaf_fields_of<T: Serialize>(value: &T) -> Result<Vec<Field>, serde_json::Error> {
    let mut fields = Vec::new();
    walk(&serde_json::to_value(value)?, &mut Vec::new(), &mut fields);
    Ok(fields)
}

/// Leaves of a [`BlockSummary`].
pub fn leaf_fields() -> Result<Vec<Field>, serde_json::Error> {
    leaf_fields_of(&template())
}

fn walk(value: &Value, selector: &mut Vec<String>, out: &mut Vec<Field>) {
    let field_type = match value {
        Value::Object(map) => {
            for (key, child) in map {
                selector.push(key.clone());
                walk(child, selector, out);
                selector.pop();
            }
            return;
        }
        Value::Null | Value::Array(_) => return,
        Value::Bool(_) => FieldType::Bool,
        Value::Number(n) if n.is_f64() => FieldType::Float,
        Value::Number(_) => FieldType::Int,
        Value::String(s) if DateTime::parse_from_rfc3339(s).is_ok() => FieldType::Time,
        Value::String(_) => FieldType::String,
    };
    out.push(Field {
        selector: selector.clone(),
        field_type,
    });
}

/// Summary with every optional member populated.
fn template() -> BlockSummary {
    let hash = Base58Hash::new(vec![0; 32]);
    let epoch = DateTime::<Utc>::UNIX_EPOCH;
    BlockSummary {
        info: BlockInfo {
            header: FullHeader {
                protocol: hash.clone(),
                chain_id: hash.clone(),
                hash: hash.clone(),
                level: 0,
                proto: 0,
                predecessor: hash.clone(),
                timestamp: epoch,
                validation_pass: 0,
                operations_hash: hash.clone(),
                fitness: Vec::new(),
                context: hash.clone(),
                priority: 0,
                proof_of_work_nonce: vec![0; 8],
                seed_nonce_hash: Some(hash.clone()),
                liquidity_baking_escape_vote: false,
                signature: hash.clone(),
            },
            stat: Statistics::default(),
            metadata: Some(MetadataInfo {
                protocol: hash.clone(),
                next_protocol: hash.clone(),
                max_operations_ttl: 0,
                max_operation_data_length: 0,
                max_block_header_length: 0,
                baker: hash.clone(),
                level_info: LevelInfo::default(),
                voting_period_info: VotingPeriodInfo {
                    voting_period: VotingPeriod {
                        kind: "proposal".to_string(),
                        ..VotingPeriod::default()
                    },
                    ..VotingPeriodInfo::default()
                },
                nonce_hash: Some(hash),
                consumed_gas: 0,
                liquidity_baking_escape_ema: 0,
            }),
            minimal_valid_time: epoch,
        },
        predecessor_timestamp: epoch,
        delay: 0,
        minimal_delay: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(fields: &'a [Field], path: &str) -> Option<&'a Field> {
        fields.iter().find(|f| f.path() == path)
    }

    #[test]
    fn lists_nested_leaves_with_types() {
        let fields = leaf_fields().unwrap();
        let expect = [
            ("header.level", FieldType::Int),
            ("header.hash", FieldType::String),
            ("header.timestamp", FieldType::Time),
            ("header.liquidity_baking_escape_vote", FieldType::Bool),
            ("header.seed_nonce_hash", FieldType::String),
            ("stat.n_ops.transaction", FieldType::Int),
            ("stat.n_slots", FieldType::Int),
            ("stat.consumed_milligas.register_global_constant", FieldType::Int),
            ("stat.storage_size.total", FieldType::Int),
            ("metadata.level_info.cycle", FieldType::Int),
            ("metadata.voting_period_info.voting_period.kind", FieldType::String),
            ("metadata.nonce_hash", FieldType::String),
            ("minimal_valid_time", FieldType::Time),
            ("predecessor_timestamp", FieldType::Time),
            ("delay", FieldType::Int),
            ("minimal_delay", FieldType::Int),
        ];
        for (path, field_type) in expect {
            let field = find(&fields, path).unwrap_or_else(|| panic!("missing {path}"));
            assert_eq!(field.field_type, field_type, "{path}");
        }
    }

    #[test]
    fn sequences_are_not_leaves() {
        let fields = leaf_fields().unwrap();
        assert!(find(&fields, "header.fitness").is_none());
    }

    #[test]
    fn floats_are_distinguished() {
        #[derive(Serialize)]
        struct Sample {
            ratio: f64,
            count: u32,
        }
        let fields = leaf_fields_of(&Sample { ratio: 0.5, count: 1 }).unwrap();
        assert_eq!(find(&fields, "ratio").unwrap().field_type, FieldType::Float);
        assert_eq!(find(&fields, "count").unwrap().field_type, FieldType::Int);
    }
}
