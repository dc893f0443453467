use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, ops::Deref, str::FromStr};

/// Identifier whose text form is Base58Check.
///
/// The wrapped bytes are the checksum-stripped payload, including any
/// version prefix. Text conversion appends or verifies the 4-byte
/// double-SHA-256 checksum.
///
/// # Common identifiers
///
/// - **Block hashes** (`B...`), used as cache keys and predecessor links
/// - **Operation hashes** (`o...`), protocol hashes (`P...`), chain ids (`Net...`)
/// - **Contract addresses** (`tz1...`, `KT1...`) and signatures
///
/// # Examples
///
/// ```
/// use tezstat_common::Base58Hash;
///
/// let addr: Base58Hash = "KT1MruMYHugk6x7qWQGeFKoV4fuarhTfoV6t".parse().unwrap();
/// assert_eq!(addr.to_string(), "KT1MruMYHugk6x7qWQGeFKoV4fuarhTfoV6t");
/// ```
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Base58Hash(Vec<u8>);

impl Serialize for Base58Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Base58Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Base58Hash {
    /// Wraps already checksum-stripped bytes.
    #[inline]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.clone()
    }

    #[inline]
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Base58Hash {
    #[inline]
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for Base58Hash {
    #[inline]
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}

impl From<Base58Hash> for Vec<u8> {
    fn from(hash: Base58Hash) -> Self {
        hash.0
    }
}

impl AsRef<[u8]> for Base58Hash {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for Base58Hash {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for Base58Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Base58Hash").field(&self.to_string()).finish()
    }
}

impl fmt::Display for Base58Hash {
    /// Formats the identifier as Base58Check text.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(&self.0).with_check().into_string())
    }
}

impl FromStr for Base58Hash {
    type Err = bs58::decode::Error;

    /// Parses Base58Check text, verifying and stripping the checksum.
    ///
    /// # Errors
    ///
    /// Returns an error if the string contains non-alphabet characters or
    /// the trailing checksum does not match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(bs58::decode(s).with_check(None).into_vec()?))
    }
}

/// Block identity, used as cache key and predecessor link.
pub type BlockHash = Base58Hash;

/// Operation hash.
pub type OperationHash = Base58Hash;

/// Protocol hash.
pub type ProtocolHash = Base58Hash;

/// Chain identifier.
pub type ChainId = Base58Hash;
