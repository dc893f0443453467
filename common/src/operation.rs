//! Operation envelopes and their polymorphic contents.

use crate::balance::BalanceUpdate;
use crate::block::RawHeader;
use crate::decode::{decode_body, discriminated_serde, DecodeError, Discriminated};
use crate::hash::{Base58Hash, ChainId, OperationHash, ProtocolHash};
use crate::internal::{InternalOperationResult, WithInternalResults};
use crate::micheline::Micheline;
use crate::result::{
    DelegationResult, OperationResult, OriginationResult, RegisterGlobalConstantResult,
    RevealResult, TransactionResult, WithBalanceUpdates,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{hex::Hex, serde_as, DisplayFromStr};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Endorsement,
    SeedNonceRevelation,
    EndorsementWithSlot,
    DoubleEndorsementEvidence,
    DoubleBakingEvidence,
    ActivateAccount,
    Proposals,
    Ballot,
    Reveal,
    Transaction,
    Origination,
    Delegation,
    RegisterGlobalConstant,
}

/// Wire tag of every known operation kind.
pub const OPERATION_KINDS: [(&str, OperationKind); 13] = [
    ("endorsement", OperationKind::Endorsement),
    ("seed_nonce_revelation", OperationKind::SeedNonceRevelation),
    ("endorsement_with_slot", OperationKind::EndorsementWithSlot),
    ("double_endorsement_evidence", OperationKind::DoubleEndorsementEvidence),
    ("double_baking_evidence", OperationKind::DoubleBakingEvidence),
    ("activate_account", OperationKind::ActivateAccount),
    ("proposals", OperationKind::Proposals),
    ("ballot", OperationKind::Ballot),
    ("reveal", OperationKind::Reveal),
    ("transaction", OperationKind::Transaction),
    ("origination", OperationKind::Origination),
    ("delegation", OperationKind::Delegation),
    ("register_global_constant", OperationKind::RegisterGlobalConstant),
];

impl OperationKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        OPERATION_KINDS.iter().find(|(name, _)| *name == tag).map(|(_, kind)| *kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Endorsement => "endorsement",
            OperationKind::SeedNonceRevelation => "seed_nonce_revelation",
            OperationKind::EndorsementWithSlot => "endorsement_with_slot",
            OperationKind::DoubleEndorsementEvidence => "double_endorsement_evidence",
            OperationKind::DoubleBakingEvidence => "double_baking_evidence",
            OperationKind::ActivateAccount => "activate_account",
            OperationKind::Proposals => "proposals",
            OperationKind::Ballot => "ballot",
            OperationKind::Reveal => "reveal",
            OperationKind::Transaction => "transaction",
            OperationKind::Origination => "origination",
            OperationKind::Delegation => "delegation",
            OperationKind::RegisterGlobalConstant => "register_global_constant",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signed operation as included in a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Operation {
    pub protocol: ProtocolHash,
    pub chain_id: ChainId,
    pub hash: OperationHash,
    pub branch: Base58Hash,
    pub contents: Vec<OperationContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Base58Hash>,
}

/// Validation-pass partitioned operation lists of one block.
pub type OperationGroups = Vec<Vec<Operation>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationContent {
    Endorsement(Endorsement),
    SeedNonceRevelation(SeedNonceRevelation),
    EndorsementWithSlot(EndorsementWithSlot),
    DoubleEndorsementEvidence(DoubleEndorsementEvidence),
    DoubleBakingEvidence(DoubleBakingEvidence),
    ActivateAccount(ActivateAccount),
    Proposals(Proposals),
    Ballot(Ballot),
    Reveal(Reveal),
    Transaction(Transaction),
    Origination(Origination),
    Delegation(Delegation),
    RegisterGlobalConstant(RegisterGlobalConstant),
    /// Unrecognised kind, kept as received.
    Opaque(OpaqueContent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueContent {
    pub kind: String,
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Endorsement {
    pub level: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EndorsementMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndorsementWithSlot {
    pub endorsement: InlinedEndorsement,
    pub slot: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EndorsementMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InlinedEndorsement {
    pub branch: Base58Hash,
    pub operations: InlinedEndorsementContents,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Base58Hash>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InlinedEndorsementContents {
    pub kind: String,
    pub level: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndorsementMetadata {
    pub balance_updates: Vec<BalanceUpdate>,
    pub delegate: Base58Hash,
    pub slots: Vec<u64>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedNonceRevelation {
    pub level: i64,
    #[serde_as(as = "Hex")]
    pub nonce: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BalanceUpdatesMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DoubleEndorsementEvidence {
    pub op1: InlinedEndorsement,
    pub op2: InlinedEndorsement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BalanceUpdatesMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DoubleBakingEvidence {
    pub bh1: RawHeader,
    pub bh2: RawHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BalanceUpdatesMetadata>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActivateAccount {
    pub pkh: Base58Hash,
    #[serde_as(as = "Option<Hex>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BalanceUpdatesMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Proposals {
    pub source: Base58Hash,
    pub period: i64,
    pub proposals: Vec<ProtocolHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EmptyMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ballot {
    pub source: Base58Hash,
    pub period: i64,
    pub proposal: ProtocolHash,
    pub ballot: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EmptyMetadata>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reveal {
    pub source: Base58Hash,
    #[serde_as(as = "DisplayFromStr")]
    pub fee: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub counter: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub gas_limit: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub storage_limit: u64,
    pub public_key: Base58Hash,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ManagerMetadata<RevealResult>>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transaction {
    pub source: Base58Hash,
    #[serde_as(as = "DisplayFromStr")]
    pub fee: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub counter: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub gas_limit: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub storage_limit: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u64,
    pub destination: Base58Hash,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Parameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ManagerMetadata<TransactionResult>>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Origination {
    pub source: Base58Hash,
    #[serde_as(as = "DisplayFromStr")]
    pub fee: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub counter: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub gas_limit: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub storage_limit: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub balance: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegate: Option<Base58Hash>,
    pub script: Script,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ManagerMetadata<OriginationResult>>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Delegation {
    pub source: Base58Hash,
    #[serde_as(as = "DisplayFromStr")]
    pub fee: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub counter: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub gas_limit: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub storage_limit: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegate: Option<Base58Hash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ManagerMetadata<DelegationResult>>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterGlobalConstant {
    pub source: Base58Hash,
    #[serde_as(as = "DisplayFromStr")]
    pub fee: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub counter: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub gas_limit: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub storage_limit: u64,
    pub value: Micheline,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ManagerMetadata<RegisterGlobalConstantResult>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Parameters {
    pub entrypoint: String,
    pub value: Micheline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    pub code: Micheline,
    pub storage: Micheline,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmptyMetadata {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BalanceUpdatesMetadata {
    pub balance_updates: Vec<BalanceUpdate>,
}

/// Metadata of manager operations: fees, the result and what it triggered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    deny_unknown_fields,
    bound(
        serialize = "R: Serialize + DeserializeOwned",
        deserialize = "R: Serialize + DeserializeOwned"
    )
)]
pub struct ManagerMetadata<R> {
    pub balance_updates: Vec<BalanceUpdate>,
    pub operation_result: OperationResult<R>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub internal_operation_results: Vec<InternalOperationResult>,
}

impl WithBalanceUpdates for EndorsementMetadata {
    fn balance_updates(&self) -> &[BalanceUpdate] {
        &self.balance_updates
    }
}

impl WithBalanceUpdates for BalanceUpdatesMetadata {
    fn balance_updates(&self) -> &[BalanceUpdate] {
        &self.balance_updates
    }
}

impl<R> WithBalanceUpdates for ManagerMetadata<R> {
    fn balance_updates(&self) -> &[BalanceUpdate] {
        &self.balance_updates
    }
}

impl<R> WithInternalResults for ManagerMetadata<R> {
    fn internal_results(&self) -> &[InternalOperationResult] {
        &self.internal_operation_results
    }
}

impl OperationContent {
    /// Known kind, or `None` for opaque contents.
    pub fn kind(&self) -> Option<OperationKind> {
        let kind = match self {
            OperationContent::Endorsement(_) => OperationKind::Endorsement,
            OperationContent::SeedNonceRevelation(_) => OperationKind::SeedNonceRevelation,
            OperationContent::EndorsementWithSlot(_) => OperationKind::EndorsementWithSlot,
            OperationContent::DoubleEndorsementEvidence(_) => {
                OperationKind::DoubleEndorsementEvidence
            }
            OperationContent::DoubleBakingEvidence(_) => OperationKind::DoubleBakingEvidence,
            OperationContent::ActivateAccount(_) => OperationKind::ActivateAccount,
            OperationContent::Proposals(_) => OperationKind::Proposals,
            OperationContent::Ballot(_) => OperationKind::Ballot,
            OperationContent::Reveal(_) => OperationKind::Reveal,
            OperationContent::Transaction(_) => OperationKind::Transaction,
            OperationContent::Origination(_) => OperationKind::Origination,
            OperationContent::Delegation(_) => OperationKind::Delegation,
            OperationContent::RegisterGlobalConstant(_) => OperationKind::RegisterGlobalConstant,
            OperationContent::Opaque(_) => return None,
        };
        Some(kind)
    }

    /// Kind as it appears on the wire, including opaque contents.
    pub fn kind_str(&self) -> &str {
        match (self, self.kind()) {
            (OperationContent::Opaque(opaque), _) => &opaque.kind,
            (_, Some(kind)) => kind.as_str(),
            (_, None) => "",
        }
    }

    /// Whether the node attached application metadata.
    pub fn has_metadata(&self) -> bool {
        match self {
            OperationContent::Endorsement(c) => c.metadata.is_some(),
            OperationContent::SeedNonceRevelation(c) => c.metadata.is_some(),
            OperationContent::EndorsementWithSlot(c) => c.metadata.is_some(),
            OperationContent::DoubleEndorsementEvidence(c) => c.metadata.is_some(),
            OperationContent::DoubleBakingEvidence(c) => c.metadata.is_some(),
            OperationContent::ActivateAccount(c) => c.metadata.is_some(),
            OperationContent::Proposals(c) => c.metadata.is_some(),
            OperationContent::Ballot(c) => c.metadata.is_some(),
            OperationContent::Reveal(c) => c.metadata.is_some(),
            OperationContent::Transaction(c) => c.metadata.is_some(),
            OperationContent::Origination(c) => c.metadata.is_some(),
            OperationContent::Delegation(c) => c.metadata.is_some(),
            OperationContent::RegisterGlobalConstant(c) => c.metadata.is_some(),
            OperationContent::Opaque(c) => c.fields.contains_key("metadata"),
        }
    }

    /// Balance updates of the content's metadata, if any.
    pub fn balance_updates(&self) -> &[BalanceUpdate] {
        fn of<M: WithBalanceUpdates>(metadata: &Option<M>) -> &[BalanceUpdate] {
            metadata.as_ref().map(WithBalanceUpdates::balance_updates).unwrap_or_default()
        }
        match self {
            OperationContent::Endorsement(c) => of(&c.metadata),
            OperationContent::EndorsementWithSlot(c) => of(&c.metadata),
            OperationContent::SeedNonceRevelation(c) => of(&c.metadata),
            OperationContent::DoubleEndorsementEvidence(c) => of(&c.metadata),
            OperationContent::DoubleBakingEvidence(c) => of(&c.metadata),
            OperationContent::ActivateAccount(c) => of(&c.metadata),
            OperationContent::Reveal(c) => of(&c.metadata),
            OperationContent::Transaction(c) => of(&c.metadata),
            OperationContent::Origination(c) => of(&c.metadata),
            OperationContent::Delegation(c) => of(&c.metadata),
            OperationContent::RegisterGlobalConstant(c) => of(&c.metadata),
            OperationContent::Proposals(_)
            | OperationContent::Ballot(_)
            | OperationContent::Opaque(_) => &[],
        }
    }
}

impl Discriminated for OperationContent {
    const FIELD: &'static str = "kind";
    const WHAT: &'static str = "operation content";

    fn tag(&self) -> &str {
        self.kind_str()
    }

    fn from_tagged(tag: &str, body: Map<String, Value>) -> Result<Self, DecodeError> {
        let what = Self::WHAT;
        let Some(kind) = OperationKind::from_tag(tag) else {
            return Ok(OperationContent::Opaque(OpaqueContent {
                kind: tag.to_string(),
                fields: body,
            }));
        };
        match kind {
            OperationKind::Endorsement => decode_body(what, tag, body).map(Self::Endorsement),
            OperationKind::SeedNonceRevelation => {
                decode_body(what, tag, body).map(Self::SeedNonceRevelation)
            }
            OperationKind::EndorsementWithSlot => {
                decode_body(what, tag, body).map(Self::EndorsementWithSlot)
            }
            OperationKind::DoubleEndorsementEvidence => {
                decode_body(what, tag, body).map(Self::DoubleEndorsementEvidence)
            }
            OperationKind::DoubleBakingEvidence => {
                decode_body(what, tag, body).map(Self::DoubleBakingEvidence)
            }
            OperationKind::ActivateAccount => decode_body(what, tag, body).map(Self::ActivateAccount),
            OperationKind::Proposals => decode_body(what, tag, body).map(Self::Proposals),
            OperationKind::Ballot => decode_body(what, tag, body).map(Self::Ballot),
            OperationKind::Reveal => decode_body(what, tag, body).map(Self::Reveal),
            OperationKind::Transaction => decode_body(what, tag, body).map(Self::Transaction),
            OperationKind::Origination => decode_body(what, tag, body).map(Self::Origination),
            OperationKind::Delegation => decode_body(what, tag, body).map(Self::Delegation),
            OperationKind::RegisterGlobalConstant => {
                decode_body(what, tag, body).map(Self::RegisterGlobalConstant)
            }
        }
    }

    fn body(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Endorsement(c) => serde_json::to_value(c),
            Self::SeedNonceRevelation(c) => serde_json::to_value(c),
            Self::EndorsementWithSlot(c) => serde_json::to_value(c),
            Self::DoubleEndorsementEvidence(c) => serde_json::to_value(c),
            Self::DoubleBakingEvidence(c) => serde_json::to_value(c),
            Self::ActivateAccount(c) => serde_json::to_value(c),
            Self::Proposals(c) => serde_json::to_value(c),
            Self::Ballot(c) => serde_json::to_value(c),
            Self::Reveal(c) => serde_json::to_value(c),
            Self::Transaction(c) => serde_json::to_value(c),
            Self::Origination(c) => serde_json::to_value(c),
            Self::Delegation(c) => serde_json::to_value(c),
            Self::RegisterGlobalConstant(c) => serde_json::to_value(c),
            Self::Opaque(c) => Ok(Value::Object(c.fields.clone())),
        }
    }
}

discriminated_serde!(OperationContent);
