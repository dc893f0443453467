//! Results of operations the protocol applied on an operation's behalf:
//! internal (contract-triggered) and implicit (block-level) results.

use crate::decode::{decode_body, discriminated_serde, unknown, DecodeError, Discriminated};
use crate::hash::Base58Hash;
use crate::micheline::Micheline;
use crate::operation::{OperationKind, Parameters, Script};
use crate::result::{
    DelegationResult, OperationResult, OriginationResult, RegisterGlobalConstantResult,
    RevealResult, TransactionResult,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, DisplayFromStr};

/// Values carrying nested internal results.
pub trait WithInternalResults {
    fn internal_results(&self) -> &[InternalOperationResult];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalOperationResult {
    Reveal(InternalReveal),
    Transaction(InternalTransaction),
    Origination(InternalOrigination),
    Delegation(InternalDelegation),
    RegisterGlobalConstant(InternalRegisterGlobalConstant),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InternalReveal {
    pub source: Base58Hash,
    pub nonce: u64,
    pub public_key: Base58Hash,
    pub result: OperationResult<RevealResult>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InternalTransaction {
    pub source: Base58Hash,
    pub nonce: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u64,
    pub destination: Base58Hash,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Parameters>,
    pub result: OperationResult<TransactionResult>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InternalOrigination {
    pub source: Base58Hash,
    pub nonce: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub balance: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegate: Option<Base58Hash>,
    pub script: Script,
    pub result: OperationResult<OriginationResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InternalDelegation {
    pub source: Base58Hash,
    pub nonce: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegate: Option<Base58Hash>,
    pub result: OperationResult<DelegationResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InternalRegisterGlobalConstant {
    pub source: Base58Hash,
    pub nonce: u64,
    pub value: Micheline,
    pub result: OperationResult<RegisterGlobalConstantResult>,
}

impl InternalOperationResult {
    pub fn kind(&self) -> OperationKind {
        match self {
            InternalOperationResult::Reveal(_) => OperationKind::Reveal,
            InternalOperationResult::Transaction(_) => OperationKind::Transaction,
            InternalOperationResult::Origination(_) => OperationKind::Origination,
            InternalOperationResult::Delegation(_) => OperationKind::Delegation,
            InternalOperationResult::RegisterGlobalConstant(_) => {
                OperationKind::RegisterGlobalConstant
            }
        }
    }
}

impl Discriminated for InternalOperationResult {
    const FIELD: &'static str = "kind";
    const WHAT: &'static str = "internal operation result";

    fn tag(&self) -> &str {
        self.kind().as_str()
    }

    fn from_tagged(tag: &str, body: Map<String, Value>) -> Result<Self, DecodeError> {
        let what = Self::WHAT;
        match OperationKind::from_tag(tag) {
            Some(OperationKind::Reveal) => decode_body(what, tag, body).map(Self::Reveal),
            Some(OperationKind::Transaction) => decode_body(what, tag, body).map(Self::Transaction),
            Some(OperationKind::Origination) => decode_body(what, tag, body).map(Self::Origination),
            Some(OperationKind::Delegation) => decode_body(what, tag, body).map(Self::Delegation),
            Some(OperationKind::RegisterGlobalConstant) => {
                decode_body(what, tag, body).map(Self::RegisterGlobalConstant)
            }
            _ => Err(unknown(what, Self::FIELD, tag)),
        }
    }

    fn body(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Reveal(r) => serde_json::to_value(r),
            Self::Transaction(r) => serde_json::to_value(r),
            Self::Origination(r) => serde_json::to_value(r),
            Self::Delegation(r) => serde_json::to_value(r),
            Self::RegisterGlobalConstant(r) => serde_json::to_value(r),
        }
    }
}

discriminated_serde!(InternalOperationResult);

/// Results synthesised by the protocol itself, listed in block metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImplicitOperationResult {
    Reveal(RevealResult),
    Transaction(TransactionResult),
    Origination(OriginationResult),
    Delegation(DelegationResult),
    RegisterGlobalConstant(RegisterGlobalConstantResult),
}

impl ImplicitOperationResult {
    pub fn kind(&self) -> OperationKind {
        match self {
            ImplicitOperationResult::Reveal(_) => OperationKind::Reveal,
            ImplicitOperationResult::Transaction(_) => OperationKind::Transaction,
            ImplicitOperationResult::Origination(_) => OperationKind::Origination,
            ImplicitOperationResult::Delegation(_) => OperationKind::Delegation,
            ImplicitOperationResult::RegisterGlobalConstant(_) => {
                OperationKind::RegisterGlobalConstant
            }
        }
    }
}

impl Discriminated for ImplicitOperationResult {
    const FIELD: &'static str = "kind";
    const WHAT: &'static str = "implicit operation result";

    fn tag(&self) -> &str {
        self.kind().as_str()
    }

    fn from_tagged(tag: &str, body: Map<String, Value>) -> Result<Self, DecodeError> {
        let what = Self::WHAT;
        match OperationKind::from_tag(tag) {
            Some(OperationKind::Reveal) => decode_body(what, tag, body).map(Self::Reveal),
            Some(OperationKind::Transaction) => decode_body(what, tag, body).map(Self::Transaction),
            Some(OperationKind::Origination) => decode_body(what, tag, body).map(Self::Origination),
            Some(OperationKind::Delegation) => decode_body(what, tag, body).map(Self::Delegation),
            Some(OperationKind::RegisterGlobalConstant) => {
                decode_body(what, tag, body).map(Self::RegisterGlobalConstant)
            }
            _ => Err(unknown(what, Self::FIELD, tag)),
        }
    }

    fn body(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Reveal(r) => serde_json::to_value(r),
            Self::Transaction(r) => serde_json::to_value(r),
            Self::Origination(r) => serde_json::to_value(r),
            Self::Delegation(r) => serde_json::to_value(r),
            Self::RegisterGlobalConstant(r) => serde_json::to_value(r),
        }
    }
}

discriminated_serde!(ImplicitOperationResult);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const KT1: &str = "KT1MruMYHugk6x7qWQGeFKoV4fuarhTfoV6t";

    #[test]
    fn decodes_internal_transaction() {
        let raw = json!({
            "kind": "transaction",
            "source": KT1,
            "nonce": 3,
            "amount": "0",
            "destination": KT1,
            "parameters": {"entrypoint": "default", "value": {"prim": "Unit"}},
            "result": {"status": "applied", "consumed_milligas": "2500"}
        });
        let result: InternalOperationResult = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(result.kind(), OperationKind::Transaction);
        assert_eq!(serde_json::to_value(&result).unwrap(), raw);
    }

    #[test]
    fn internal_rejects_manager_only_kinds() {
        let raw = json!({"kind": "endorsement", "level": 1});
        let err = serde_json::from_value::<InternalOperationResult>(raw).unwrap_err();
        assert!(err.to_string().contains("unknown kind `endorsement`"));
    }

    #[test]
    fn decodes_implicit_origination() {
        let raw = json!({
            "kind": "origination",
            "originated_contracts": [KT1],
            "consumed_gas": "1",
            "storage_size": "4632"
        });
        let result: ImplicitOperationResult = serde_json::from_value(raw).unwrap();
        let ImplicitOperationResult::Origination(base) = &result else {
            panic!("expected origination");
        };
        assert_eq!(base.storage_size, Some(4632));
    }
}
