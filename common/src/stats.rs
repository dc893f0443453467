//! Per-block statistics accumulated over decoded operation trees.

use crate::block::Block;
use crate::internal::{ImplicitOperationResult, InternalOperationResult, WithInternalResults};
use crate::operation::{ManagerMetadata, OperationContent, OperationKind};
use crate::result::{OperationResult, WithConsumedMilligas, WithStorage};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumOps {
    pub total: u64,
    pub endorsement: u64,
    pub seed_nonce_revelation: u64,
    pub double_endorsement_evidence: u64,
    pub double_baking_evidence: u64,
    pub activate_account: u64,
    pub proposals: u64,
    pub ballot: u64,
    pub reveal: u64,
    pub transaction: u64,
    pub origination: u64,
    pub delegation: u64,
    pub register_global_constant: u64,
}

impl NumOps {
    pub fn sum_of_kinds(&self) -> u64 {
        self.endorsement
            + self.seed_nonce_revelation
            + self.double_endorsement_evidence
            + self.double_baking_evidence
            + self.activate_account
            + self.proposals
            + self.ballot
            + self.reveal
            + self.transaction
            + self.origination
            + self.delegation
            + self.register_global_constant
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumedMilligas {
    pub total: u64,
    pub reveal: u64,
    pub transaction: u64,
    pub origination: u64,
    pub delegation: u64,
    pub register_global_constant: u64,
}

impl ConsumedMilligas {
    pub fn sum_of_kinds(&self) -> u64 {
        self.reveal + self.transaction + self.origination + self.delegation + self.register_global_constant
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSize {
    pub total: u64,
    pub transaction: u64,
    pub origination: u64,
    pub register_global_constant: u64,
}

impl StorageSize {
    pub fn sum_of_kinds(&self) -> u64 {
        self.transaction + self.origination + self.register_global_constant
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(rename = "n_ops")]
    pub num_ops: NumOps,
    #[serde(rename = "n_slots")]
    pub slots: u64,
    pub consumed_milligas: ConsumedMilligas,
    pub storage_size: StorageSize,
}

impl Statistics {
    /// Adds one top-level operation content, recursing into internal results.
    ///
    /// Opaque contents are not counted. Contents without metadata only
    /// contribute to the operation counters.
    pub fn aggregate(&mut self, content: &OperationContent) {
        let Some(kind) = content.kind() else {
            return;
        };
        self.count(kind);

        match content {
            OperationContent::Endorsement(c) => {
                if let Some(m) = &c.metadata {
                    self.slots = self.slots.saturating_add(m.slots.len() as u64);
                }
            }
            OperationContent::EndorsementWithSlot(c) => {
                if let Some(m) = &c.metadata {
                    self.slots = self.slots.saturating_add(m.slots.len() as u64);
                }
            }
            OperationContent::Reveal(c) => self.record_manager(kind, &c.metadata),
            OperationContent::Delegation(c) => self.record_manager(kind, &c.metadata),
            OperationContent::Transaction(c) => {
                self.record_manager(kind, &c.metadata);
                if let Some(m) = &c.metadata {
                    self.record_storage(kind, &m.operation_result);
                }
            }
            OperationContent::Origination(c) => {
                self.record_manager(kind, &c.metadata);
                if let Some(m) = &c.metadata {
                    self.record_storage(kind, &m.operation_result);
                }
            }
            OperationContent::RegisterGlobalConstant(c) => {
                self.record_manager(kind, &c.metadata);
                if let Some(m) = &c.metadata {
                    self.record_storage(kind, &m.operation_result);
                }
            }
            OperationContent::SeedNonceRevelation(_)
            | OperationContent::DoubleEndorsementEvidence(_)
            | OperationContent::DoubleBakingEvidence(_)
            | OperationContent::ActivateAccount(_)
            | OperationContent::Proposals(_)
            | OperationContent::Ballot(_)
            | OperationContent::Opaque(_) => {}
        }
    }

    /// Adds a result triggered by another operation.
    pub fn aggregate_internal(&mut self, result: &InternalOperationResult) {
        let kind = result.kind();
        self.count(kind);
        match result {
            InternalOperationResult::Reveal(r) => self.record_cost(kind, &r.result),
            InternalOperationResult::Delegation(r) => self.record_cost(kind, &r.result),
            InternalOperationResult::Transaction(r) => {
                self.record_cost(kind, &r.result);
                self.record_storage(kind, &r.result);
            }
            InternalOperationResult::Origination(r) => {
                self.record_cost(kind, &r.result);
                self.record_storage(kind, &r.result);
            }
            InternalOperationResult::RegisterGlobalConstant(r) => {
                self.record_cost(kind, &r.result);
                self.record_storage(kind, &r.result);
            }
        }
    }

    /// Adds a result synthesised by the protocol for the whole block.
    pub fn aggregate_implicit(&mut self, result: &ImplicitOperationResult) {
        let kind = result.kind();
        self.count(kind);
        match result {
            ImplicitOperationResult::Reveal(r) => self.record_cost(kind, r),
            ImplicitOperationResult::Delegation(r) => self.record_cost(kind, r),
            ImplicitOperationResult::Transaction(r) => {
                self.record_cost(kind, r);
                self.record_storage(kind, r);
            }
            ImplicitOperationResult::Origination(r) => {
                self.record_cost(kind, r);
                self.record_storage(kind, r);
            }
            ImplicitOperationResult::RegisterGlobalConstant(r) => {
                self.record_cost(kind, r);
                self.record_storage(kind, r);
            }
        }
    }

    fn record_manager<R>(&mut self, kind: OperationKind, metadata: &Option<ManagerMetadata<R>>)
    where
        OperationResult<R>: WithConsumedMilligas,
    {
        let Some(metadata) = metadata else {
            return;
        };
        self.record_cost(kind, &metadata.operation_result);
        for internal in metadata.internal_results() {
            self.aggregate_internal(internal);
        }
    }

    fn record_cost<R: WithConsumedMilligas>(&mut self, kind: OperationKind, result: &R) {
        let Some(milligas) = result.consumed_milligas() else {
            return;
        };
        if let Some(bucket) = self.cost_bucket(kind) {
            *bucket = bucket.saturating_add(milligas);
        }
        self.consumed_milligas.total = self.consumed_milligas.total.saturating_add(milligas);
    }

    fn record_storage<R: WithStorage>(&mut self, kind: OperationKind, result: &R) {
        let Some(size) = result.storage_size() else {
            return;
        };
        if let Some(bucket) = self.storage_bucket(kind) {
            *bucket = bucket.saturating_add(size);
        }
        self.storage_size.total = self.storage_size.total.saturating_add(size);
    }

    fn count(&mut self, kind: OperationKind) {
        let n = &mut self.num_ops;
        let counter = match kind {
            OperationKind::Endorsement | OperationKind::EndorsementWithSlot => &mut n.endorsement,
            OperationKind::SeedNonceRevelation => &mut n.seed_nonce_revelation,
            OperationKind::DoubleEndorsementEvidence => &mut n.double_endorsement_evidence,
            OperationKind::DoubleBakingEvidence => &mut n.double_baking_evidence,
            OperationKind::ActivateAccount => &mut n.activate_account,
            OperationKind::Proposals => &mut n.proposals,
            OperationKind::Ballot => &mut n.ballot,
            OperationKind::Reveal => &mut n.reveal,
            OperationKind::Transaction => &mut n.transaction,
            OperationKind::Origination => &mut n.origination,
            OperationKind::Delegation => &mut n.delegation,
            OperationKind::RegisterGlobalConstant => &mut n.register_global_constant,
        };
        *counter = counter.saturating_add(1);
        n.total = n.total.saturating_add(1);
    }

    fn cost_bucket(&mut self, kind: OperationKind) -> Option<&mut u64> {
        let c = &mut self.consumed_milligas;
        match kind {
            OperationKind::Reveal => Some(&mut c.reveal),
            OperationKind::Transaction => Some(&mut c.transaction),
            OperationKind::Origination => Some(&mut c.origination),
            OperationKind::Delegation => Some(&mut c.delegation),
            OperationKind::RegisterGlobalConstant => Some(&mut c.register_global_constant),
            _ => None,
        }
    }

    fn storage_bucket(&mut self, kind: OperationKind) -> Option<&mut u64> {
        let s = &mut self.storage_size;
        match kind {
            OperationKind::Transaction => Some(&mut s.transaction),
            OperationKind::Origination => Some(&mut s.origination),
            OperationKind::RegisterGlobalConstant => Some(&mut s.register_global_constant),
            _ => None,
        }
    }
}

impl Block {
    /// Aggregates every operation content and every implicit result.
    pub fn statistics(&self) -> Statistics {
        let mut stats = Statistics::default();
        for content in self.operations.iter().flatten().flat_map(|op| op.contents.iter()) {
            stats.aggregate(content);
        }
        if let Some(metadata) = &self.metadata {
            for result in &metadata.implicit_operations_results {
                stats.aggregate_implicit(result);
            }
        }
        stats
    }
}
