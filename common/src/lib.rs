// Tezstat common library - block model, operation decoding and statistics

pub mod decode;

pub mod balance;
pub mod block;
pub mod fields;
pub mod hash;
pub mod info;
pub mod internal;
pub mod micheline;
pub mod operation;
pub mod result;
pub mod stats;

// Flattened re-exports
pub use self::balance::BalanceUpdate;
pub use self::block::{Block, FullHeader, HeaderMetadata, MetadataInfo, RawHeader, ShellHeader};
pub use self::decode::DecodeError;
pub use self::hash::{Base58Hash, BlockHash, ChainId, OperationHash, ProtocolHash};
pub use self::info::{BlockInfo, BlockSummary};
pub use self::internal::{ImplicitOperationResult, InternalOperationResult};
pub use self::micheline::Micheline;
pub use self::operation::{Operation, OperationContent, OperationGroups, OperationKind};
pub use self::result::{OperationResult, OperationStatus};
pub use self::stats::Statistics;
