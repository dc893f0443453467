//! Encoding of typed values to and from byte strings for cache storage.
//!
//! Every encodable type declares a static [`Shape`] that selects its
//! encoding. Decoding rediscovers the same path from the target type alone,
//! so no tag is ever stored alongside the bytes.

mod error;
mod fixed;
mod structural;

pub use error::CodecError;
pub use fixed::FixedWidth;

/// Encoding path chosen for a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// The type supplies its own binary form.
    Custom,
    /// Big-endian fixed-width bytes: booleans, integers, floats and
    /// fixed-size arrays of those.
    Fixed,
    /// UTF-8 text, verbatim.
    Text,
    /// Flat concatenation of fixed-width elements. Byte vectors take this
    /// path, which stores them verbatim.
    FixedSeq,
    /// General structural encoding (CBOR) for nested and variant shapes.
    Structural,
}

pub trait ValueCodec: Sized {
    const SHAPE: Shape;

    fn encode(&self) -> Result<Vec<u8>, CodecError>;

    fn decode(bytes: &[u8]) -> Result<Self, CodecError>;
}

/// Shape the codec uses for `T`.
pub const fn shape_of<T: ValueCodec>() -> Shape {
    T::SHAPE
}

impl ValueCodec for String {
    const SHAPE: Shape = Shape::Text;

    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        Ok(self.as_bytes().to_vec())
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

impl<T: FixedWidth> ValueCodec for Vec<T> {
    const SHAPE: Shape = Shape::FixedSeq;

    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::with_capacity(self.len() * T::WIDTH);
        for item in self {
            item.write_be(&mut out);
        }
        Ok(out)
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if T::WIDTH == 0 {
            return match bytes.len() {
                0 => Ok(Vec::new()),
                len => Err(CodecError::Ragged { len, width: 0 }),
            };
        }
        if !bytes.len().is_multiple_of(T::WIDTH) {
            return Err(CodecError::Ragged {
                len: bytes.len(),
                width: T::WIDTH,
            });
        }
        bytes.chunks_exact(T::WIDTH).map(T::read_be).collect()
    }
}

/// Block hashes are stored as their checksum-decoded bytes.
impl ValueCodec for tezstat_common::Base58Hash {
    const SHAPE: Shape = Shape::Custom;

    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        Ok(self.to_vec())
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        Ok(Self::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tezstat_common::Base58Hash;

    #[test]
    fn text_is_verbatim() {
        let value = "tz1 ✓".to_string();
        let bytes = value.encode().unwrap();
        assert_eq!(bytes, value.as_bytes());
        assert_eq!(String::decode(&bytes).unwrap(), value);
    }

    #[test]
    fn invalid_text_is_rejected() {
        assert!(matches!(
            String::decode(&[0xff, 0xfe]),
            Err(CodecError::Utf8(_))
        ));
    }

    #[test]
    fn byte_vectors_are_verbatim() {
        let value: Vec<u8> = vec![9, 8, 7];
        assert_eq!(value.encode().unwrap(), vec![9, 8, 7]);
        assert_eq!(Vec::<u8>::decode(&[1, 2]).unwrap(), vec![1, 2]);
    }

    #[test]
    fn fixed_width_sequences_are_flat() {
        let value: Vec<u16> = vec![1, 0x0203];
        assert_eq!(value.encode().unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(Vec::<u16>::decode(&[0, 1, 2, 3]).unwrap(), value);
    }

    #[test]
    fn ragged_sequences_are_rejected() {
        assert!(matches!(
            Vec::<u32>::decode(&[0, 0, 0, 1, 2]),
            Err(CodecError::Ragged { len: 5, width: 4 })
        ));
    }

    #[test]
    fn zero_width_elements() {
        let value: Vec<[u8; 0]> = vec![[], []];
        assert!(value.encode().unwrap().is_empty());
        assert!(Vec::<[u8; 0]>::decode(&[]).unwrap().is_empty());
        assert!(Vec::<[u8; 0]>::decode(&[1]).is_err());
    }

    #[test]
    fn hashes_store_raw_bytes() {
        let hash = Base58Hash::new(vec![0xab; 32]);
        let bytes = hash.encode().unwrap();
        assert_eq!(bytes, vec![0xab; 32]);
        assert_eq!(Base58Hash::decode(&bytes).unwrap(), hash);
    }

    #[test]
    fn shapes_are_static() {
        assert_eq!(shape_of::<bool>(), Shape::Fixed);
        assert_eq!(shape_of::<[i64; 3]>(), Shape::Fixed);
        assert_eq!(shape_of::<String>(), Shape::Text);
        assert_eq!(shape_of::<Vec<u8>>(), Shape::FixedSeq);
        assert_eq!(shape_of::<Vec<f32>>(), Shape::FixedSeq);
        assert_eq!(shape_of::<Base58Hash>(), Shape::Custom);
        assert_eq!(shape_of::<tezstat_common::BlockInfo>(), Shape::Structural);
    }
}
