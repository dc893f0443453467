use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("expected {expected} bytes, found {found}")]
    Length { expected: usize, found: usize },

    #[error("{len} bytes is not a whole number of {width}-byte elements")]
    Ragged { len: usize, width: usize },

    #[error("invalid bool byte {0:#04x}")]
    InvalidBool(u8),

    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("structural encoding: {0}")]
    Structural(#[from] serde_cbor::Error),
}
