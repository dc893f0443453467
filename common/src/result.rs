//! Operation results, discriminated by `status`, and the capability traits
//! the statistics aggregator reads them through.

use crate::balance::BalanceUpdate;
use crate::decode::{decode_body, discriminated_serde, unknown, DecodeError, Discriminated};
use crate::hash::Base58Hash;
use crate::micheline::Micheline;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, DisplayFromStr};

/// Execution cost units per coarse gas unit.
pub const MILLIGAS_PER_GAS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationStatus {
    Applied,
    Failed,
    Skipped,
    Backtracked,
}

pub const OPERATION_STATUSES: [(&str, OperationStatus); 4] = [
    ("applied", OperationStatus::Applied),
    ("failed", OperationStatus::Failed),
    ("skipped", OperationStatus::Skipped),
    ("backtracked", OperationStatus::Backtracked),
];

impl OperationStatus {
    pub fn from_tag(tag: &str) -> Option<Self> {
        OPERATION_STATUSES.iter().find(|(name, _)| *name == tag).map(|(_, status)| *status)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationStatus::Applied => "applied",
            OperationStatus::Failed => "failed",
            OperationStatus::Skipped => "skipped",
            OperationStatus::Backtracked => "backtracked",
        }
    }
}

/// Structured error reported by the node for failed or backtracked results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeError {
    pub kind: String,
    pub id: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Result of applying one operation, generic over the kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult<B> {
    Applied(B),
    Failed(Vec<NodeError>),
    Skipped,
    Backtracked { errors: Vec<NodeError>, base: B },
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct FailedBody {
    errors: Vec<NodeError>,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SkippedBody {}

impl<B> OperationResult<B> {
    pub fn status(&self) -> OperationStatus {
        match self {
            OperationResult::Applied(_) => OperationStatus::Applied,
            OperationResult::Failed(_) => OperationStatus::Failed,
            OperationResult::Skipped => OperationStatus::Skipped,
            OperationResult::Backtracked { .. } => OperationStatus::Backtracked,
        }
    }

    /// The payload carried by applied and backtracked results.
    pub fn base(&self) -> Option<&B> {
        match self {
            OperationResult::Applied(base) | OperationResult::Backtracked { base, .. } => Some(base),
            _ => None,
        }
    }
}

impl<B: Serialize + DeserializeOwned> Discriminated for OperationResult<B> {
    const FIELD: &'static str = "status";
    const WHAT: &'static str = "operation result";

    fn tag(&self) -> &str {
        self.status().as_str()
    }

    fn from_tagged(tag: &str, mut body: Map<String, Value>) -> Result<Self, DecodeError> {
        let status = OperationStatus::from_tag(tag).ok_or_else(|| unknown(Self::WHAT, Self::FIELD, tag))?;
        match status {
            OperationStatus::Applied => decode_body(Self::WHAT, tag, body).map(OperationResult::Applied),
            OperationStatus::Failed => {
                decode_body::<FailedBody>(Self::WHAT, tag, body).map(|b| OperationResult::Failed(b.errors))
            }
            OperationStatus::Skipped => {
                decode_body::<SkippedBody>(Self::WHAT, tag, body).map(|_| OperationResult::Skipped)
            }
            OperationStatus::Backtracked => {
                let errors = match body.remove("errors") {
                    Some(raw) => serde_json::from_value(raw).map_err(|source| DecodeError::Malformed {
                        what: Self::WHAT,
                        tag: tag.to_string(),
                        source,
                    })?,
                    None => Vec::new(),
                };
                let base = decode_body(Self::WHAT, tag, body)?;
                Ok(OperationResult::Backtracked { errors, base })
            }
        }
    }

    fn body(&self) -> Result<Value, serde_json::Error> {
        match self {
            OperationResult::Applied(base) => serde_json::to_value(base),
            OperationResult::Failed(errors) => serde_json::to_value(FailedBody {
                errors: errors.clone(),
            }),
            OperationResult::Skipped => Ok(Value::Null),
            OperationResult::Backtracked { errors, base } => {
                let mut value = serde_json::to_value(base)?;
                if let (Value::Object(map), false) = (&mut value, errors.is_empty()) {
                    map.insert("errors".to_string(), serde_json::to_value(errors)?);
                }
                Ok(value)
            }
        }
    }
}

discriminated_serde!(OperationResult<B>);

/// Payload of reveal and delegation results.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GasResult {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumed_gas: Option<u64>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumed_milligas: Option<u64>,
}

pub type RevealResult = GasResult;
pub type DelegationResult = GasResult;

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<Micheline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub big_map_diff: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub balance_updates: Vec<BalanceUpdate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub originated_contracts: Vec<Base58Hash>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumed_gas: Option<u64>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumed_milligas: Option<u64>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_size: Option<u64>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_storage_size_diff: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocated_destination_contract: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lazy_storage_diff: Option<Value>,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OriginationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub big_map_diff: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub balance_updates: Vec<BalanceUpdate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub originated_contracts: Vec<Base58Hash>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumed_gas: Option<u64>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumed_milligas: Option<u64>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_size: Option<u64>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_storage_size_diff: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lazy_storage_diff: Option<Value>,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterGlobalConstantResult {
    #[serde(default)]
    pub balance_updates: Vec<BalanceUpdate>,
    #[serde_as(as = "DisplayFromStr")]
    pub consumed_gas: u64,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumed_milligas: Option<u64>,
    #[serde_as(as = "DisplayFromStr")]
    pub storage_size: u64,
    pub global_address: Base58Hash,
}

/// Values exposing consumed execution cost, in milligas.
pub trait WithConsumedMilligas {
    fn consumed_milligas(&self) -> Option<u64>;
}

/// Values exposing a storage size delta.
pub trait WithStorage {
    fn storage_size(&self) -> Option<u64>;
}

pub trait WithBalanceUpdates {
    fn balance_updates(&self) -> &[BalanceUpdate];
}

pub trait WithErrors {
    fn errors(&self) -> &[NodeError];
}

/// Prefers the fine-grained reading, upscaling the coarse one otherwise.
pub fn milligas(gas: Option<u64>, milligas: Option<u64>) -> Option<u64> {
    milligas.or_else(|| gas.map(|g| g.saturating_mul(MILLIGAS_PER_GAS)))
}

impl WithConsumedMilligas for GasResult {
    fn consumed_milligas(&self) -> Option<u64> {
        milligas(self.consumed_gas, self.consumed_milligas)
    }
}

impl WithConsumedMilligas for TransactionResult {
    fn consumed_milligas(&self) -> Option<u64> {
        milligas(self.consumed_gas, self.consumed_milligas)
    }
}

impl WithConsumedMilligas for OriginationResult {
    fn consumed_milligas(&self) -> Option<u64> {
        milligas(self.consumed_gas, self.consumed_milligas)
    }
}

impl WithConsumedMilligas for RegisterGlobalConstantResult {
    fn consumed_milligas(&self) -> Option<u64> {
        milligas(Some(self.consumed_gas), self.consumed_milligas)
    }
}

impl WithStorage for TransactionResult {
    fn storage_size(&self) -> Option<u64> {
        self.storage_size
    }
}

impl WithStorage for OriginationResult {
    fn storage_size(&self) -> Option<u64> {
        self.storage_size
    }
}

impl WithStorage for RegisterGlobalConstantResult {
    fn storage_size(&self) -> Option<u64> {
        Some(self.storage_size)
    }
}

impl WithBalanceUpdates for TransactionResult {
    fn balance_updates(&self) -> &[BalanceUpdate] {
        &self.balance_updates
    }
}

impl WithBalanceUpdates for OriginationResult {
    fn balance_updates(&self) -> &[BalanceUpdate] {
        &self.balance_updates
    }
}

impl WithBalanceUpdates for RegisterGlobalConstantResult {
    fn balance_updates(&self) -> &[BalanceUpdate] {
        &self.balance_updates
    }
}

impl<B: WithConsumedMilligas> WithConsumedMilligas for OperationResult<B> {
    fn consumed_milligas(&self) -> Option<u64> {
        self.base().and_then(WithConsumedMilligas::consumed_milligas)
    }
}

impl<B: WithStorage> WithStorage for OperationResult<B> {
    fn storage_size(&self) -> Option<u64> {
        self.base().and_then(WithStorage::storage_size)
    }
}

impl<B> WithErrors for OperationResult<B> {
    fn errors(&self) -> &[NodeError] {
        match self {
            OperationResult::Failed(errors) | OperationResult::Backtracked { errors, .. } => errors,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!({"status": "applied", "consumed_gas": "1000"}), OperationStatus::Applied ; "applied")]
    #[test_case(json!({"status": "failed", "errors": [{"kind": "temporary", "id": "gas_exhausted"}]}), OperationStatus::Failed ; "failed")]
    #[test_case(json!({"status": "skipped"}), OperationStatus::Skipped ; "skipped")]
    #[test_case(json!({"status": "backtracked", "consumed_milligas": "1500"}), OperationStatus::Backtracked ; "backtracked")]
    fn dispatches_on_status(raw: Value, expected: OperationStatus) {
        let result: OperationResult<RevealResult> = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(result.status(), expected);
        assert_eq!(serde_json::to_value(&result).unwrap(), raw);
    }

    #[test]
    fn unknown_status_is_an_error() {
        let raw = json!({"status": "pending"});
        let err = serde_json::from_value::<OperationResult<RevealResult>>(raw).unwrap_err();
        assert!(err.to_string().contains("unknown status `pending`"));
    }

    #[test]
    fn missing_status_is_an_error() {
        let raw = json!({"consumed_gas": "1"});
        assert!(serde_json::from_value::<OperationResult<RevealResult>>(raw).is_err());
    }

    #[test]
    fn skipped_rejects_payload() {
        let raw = json!({"status": "skipped", "consumed_gas": "1"});
        assert!(serde_json::from_value::<OperationResult<RevealResult>>(raw).is_err());
    }

    #[test]
    fn milligas_prefers_fine_unit() {
        assert_eq!(milligas(Some(10), Some(10_123)), Some(10_123));
        assert_eq!(milligas(Some(10), None), Some(10_000));
        assert_eq!(milligas(None, None), None);
    }

    #[test]
    fn backtracked_keeps_errors_and_cost() {
        let raw = json!({
            "status": "backtracked",
            "errors": [{"kind": "permanent", "id": "proto.script_rejected", "location": 7}],
            "consumed_gas": "2",
            "storage_size": "64"
        });
        let result: OperationResult<TransactionResult> = serde_json::from_value(raw).unwrap();
        assert_eq!(result.consumed_milligas(), Some(2000));
        assert_eq!(result.storage_size(), Some(64));
        assert_eq!(result.errors()[0].details["location"], 7);
    }

    #[test]
    fn failed_result_exposes_no_cost() {
        let raw = json!({"status": "failed", "errors": []});
        let result: OperationResult<TransactionResult> = serde_json::from_value(raw).unwrap();
        assert_eq!(result.consumed_milligas(), None);
        assert_eq!(result.storage_size(), None);
    }
}
