//! 32-byte digests.
//!
//! BLAKE3 backs identifiers and address derivation. Keccak-256 backs the
//! structured-data signing scheme and description digests, so that digests
//! computed by EVM-style tooling line up with ours.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;

use super::{CryptoError, CryptoResult};

/// Digest size in bytes
pub const HASH_SIZE: usize = 32;

/// A 32-byte digest
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    /// The all-zero digest
    pub const ZERO: Self = Self([0u8; HASH_SIZE]);

    /// Wrap raw bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Hex string with 0x prefix
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from hex (with or without 0x prefix)
    ///
    /// # Errors
    /// Returns error if hex is invalid or not 32 bytes
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| CryptoError::InvalidHash(e.to_string()))?;
        let arr: [u8; HASH_SIZE] = bytes.as_slice().try_into().map_err(|_| {
            CryptoError::InvalidHash(format!("expected {HASH_SIZE} bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({}..)", &self.to_hex()[..12])
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            <[u8; HASH_SIZE]>::deserialize(deserializer).map(Self)
        }
    }
}

/// BLAKE3 digest of arbitrary data
#[must_use]
pub fn hash_data(data: &[u8]) -> Hash {
    Hash(*blake3::hash(data).as_bytes())
}

/// Keccak-256 digest of arbitrary data
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    let out = Keccak256::digest(data);
    let mut bytes = [0u8; HASH_SIZE];
    bytes.copy_from_slice(&out);
    Hash(bytes)
}

/// Incremental BLAKE3 hasher for multi-part canonical encodings.
///
/// Variable-length parts go through [`Hasher::update_prefixed`] so that no two
/// distinct sequences of parts produce the same byte stream.
#[derive(Default)]
pub struct Hasher(blake3::Hasher);

impl Hasher {
    /// New empty hasher
    #[must_use]
    pub fn new() -> Self {
        Self(blake3::Hasher::new())
    }

    /// Feed fixed-width bytes
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.0.update(data);
        self
    }

    /// Feed variable-width bytes behind a little-endian u64 length prefix
    pub fn update_prefixed(&mut self, data: &[u8]) -> &mut Self {
        self.0.update(&(data.len() as u64).to_le_bytes());
        self.0.update(data);
        self
    }

    /// Finish and return the digest
    #[must_use]
    pub fn finalize(&self) -> Hash {
        Hash(*self.0.finalize().as_bytes())
    }
}
