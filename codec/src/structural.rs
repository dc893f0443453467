use crate::{CodecError, Shape, ValueCodec};
use serde::{Serialize, de::DeserializeOwned};
use tezstat_common::{Block, BlockInfo, BlockSummary, Operation, ShellHeader, Statistics};

pub(crate) fn encode_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    Ok(serde_cbor::to_vec(value)?)
}

pub(crate) fn decode_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    Ok(serde_cbor::from_slice(bytes)?)
}

macro_rules! structural {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ValueCodec for $ty {
                const SHAPE: Shape = Shape::Structural;

                fn encode(&self) -> Result<Vec<u8>, CodecError> {
                    encode_cbor(self)
                }

                fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
                    decode_cbor(bytes)
                }
            }
        )*
    };
}

structural!(BlockInfo, BlockSummary, Block, Operation, ShellHeader, Statistics);
