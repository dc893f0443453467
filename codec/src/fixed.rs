use crate::{CodecError, Shape, ValueCodec};

/// Values with a fixed big-endian byte width.
pub trait FixedWidth: Sized {
    const WIDTH: usize;

    fn write_be(&self, out: &mut Vec<u8>);

    /// Reads a value from exactly `WIDTH` bytes.
    fn read_be(bytes: &[u8]) -> Result<Self, CodecError>;
}

fn exact<const N: usize>(bytes: &[u8]) -> Result<[u8; N], CodecError> {
    bytes.try_into().map_err(|_| CodecError::Length {
        expected: N,
        found: bytes.len(),
    })
}

macro_rules! fixed_width_numbers {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FixedWidth for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                fn write_be(&self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_be_bytes());
                }

                fn read_be(bytes: &[u8]) -> Result<Self, CodecError> {
                    Ok(<$ty>::from_be_bytes(exact(bytes)?))
                }
            }

            impl ValueCodec for $ty {
                const SHAPE: Shape = Shape::Fixed;

                fn encode(&self) -> Result<Vec<u8>, CodecError> {
                    Ok(self.to_be_bytes().to_vec())
                }

                fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
                    Self::read_be(bytes)
                }
            }
        )*
    };
}

fixed_width_numbers!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128, f32, f64);

impl FixedWidth for bool {
    const WIDTH: usize = 1;

    fn write_be(&self, out: &mut Vec<u8>) {
        out.push(u8::from(*self));
    }

    fn read_be(bytes: &[u8]) -> Result<Self, CodecError> {
        match exact::<1>(bytes)? {
            [0] => Ok(false),
            [1] => Ok(true),
            [other] => Err(CodecError::InvalidBool(other)),
        }
    }
}

impl ValueCodec for bool {
    const SHAPE: Shape = Shape::Fixed;

    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        Ok(vec![u8::from(*self)])
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        Self::read_be(bytes)
    }
}

impl<T: FixedWidth, const N: usize> FixedWidth for [T; N] {
    const WIDTH: usize = T::WIDTH * N;

    fn write_be(&self, out: &mut Vec<u8>) {
        for item in self {
            item.write_be(out);
        }
    }

    fn read_be(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() != Self::WIDTH {
            return Err(CodecError::Length {
                expected: Self::WIDTH,
                found: bytes.len(),
            });
        }
        let mut items = Vec::with_capacity(N);
        for i in 0..N {
            items.push(T::read_be(&bytes[i * T::WIDTH..(i + 1) * T::WIDTH])?);
        }
        items.try_into().map_err(|_| CodecError::Length {
            expected: Self::WIDTH,
            found: bytes.len(),
        })
    }
}

impl<T: FixedWidth, const N: usize> ValueCodec for [T; N] {
    const SHAPE: Shape = Shape::Fixed;

    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::with_capacity(Self::WIDTH);
        self.write_be(&mut out);
        Ok(out)
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        Self::read_be(bytes)
    }
}
