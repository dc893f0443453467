use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use tezstat_codec::ValueCodec;
use tezstat_common::{
    Block, BlockInfo, BlockSummary, OperationContent, OperationKind, OperationStatus,
    operation::OPERATION_KINDS,
};
use tezstat_test_utils::{block_hash, block_json, operations};

fn every_variant_block() -> Block {
    let mut raw = block_json(
        7,
        DateTime::<Utc>::UNIX_EPOCH + Duration::minutes(7),
        &block_hash(7),
        &block_hash(6),
        operations::every_variant(),
    );
    raw["metadata"]["implicit_operations_results"] = operations::implicit_results();
    serde_json::from_value(raw).unwrap()
}

#[test]
fn fixture_covers_every_kind() {
    let block = every_variant_block();
    let contents: Vec<&OperationContent> =
        block.operations.iter().flatten().flat_map(|op| &op.contents).collect();
    let kinds: HashSet<OperationKind> = contents.iter().filter_map(|c| c.kind()).collect();
    assert_eq!(kinds.len(), OPERATION_KINDS.len());
    assert!(contents.iter().any(|c| matches!(c, OperationContent::Opaque(_))));

    let statuses: HashSet<OperationStatus> = contents
        .iter()
        .filter_map(|c| match c {
            OperationContent::Reveal(c) => c.metadata.as_ref().map(|m| m.operation_result.status()),
            OperationContent::Transaction(c) => c.metadata.as_ref().map(|m| m.operation_result.status()),
            OperationContent::Origination(c) => c.metadata.as_ref().map(|m| m.operation_result.status()),
            OperationContent::Delegation(c) => c.metadata.as_ref().map(|m| m.operation_result.status()),
            OperationContent::RegisterGlobalConstant(c) => {
                c.metadata.as_ref().map(|m| m.operation_result.status())
            }
            _ => None,
        })
        .collect();
    assert_eq!(statuses.len(), 4);
}

#[test]
fn block_round_trips() {
    let block = every_variant_block();
    let bytes = block.encode().unwrap();
    assert_eq!(Block::decode(&bytes).unwrap(), block);
}

#[test]
fn block_info_round_trips() {
    let block = every_variant_block();
    let info = BlockInfo::from_block(&block, block.header.timestamp - Duration::seconds(5));
    assert!(info.metadata.is_some());
    let decoded = BlockInfo::decode(&info.encode().unwrap()).unwrap();
    assert_eq!(decoded, info);
}

#[test]
fn summary_round_trips() {
    let block = every_variant_block();
    let info = BlockInfo::from_block(&block, block.header.timestamp);
    let mut predecessor = info.clone();
    predecessor.header.timestamp -= Duration::seconds(30);
    let summary = BlockSummary::new(info, &predecessor);
    assert_eq!(summary.delay, 30);
    let decoded = BlockSummary::decode(&summary.encode().unwrap()).unwrap();
    assert_eq!(decoded, summary);
}

#[test]
fn operations_round_trip_individually() {
    for op in every_variant_block().operations.into_iter().flatten() {
        let decoded = tezstat_common::Operation::decode(&op.encode().unwrap()).unwrap();
        assert_eq!(decoded, op);
    }
}
