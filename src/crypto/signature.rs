//! Digital signatures using Ed25519.
//!
//! Wraps `ed25519-dalek` behind crate-owned key and signature types so the
//! rest of the crate never touches the backend directly. Verification uses
//! the strict variant (rejects small-order keys and malleable signatures).

use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey, VerifyingKey,
};
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroize;

use super::{CryptoError, CryptoResult};

/// Public key size in bytes
pub const PUBKEY_SIZE: usize = 32;
/// Signature size in bytes
pub const SIGNATURE_SIZE: usize = 64;
/// Secret key (seed) size in bytes
pub const SECRET_KEY_SIZE: usize = 32;

fn serialize_fixed<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    if serializer.is_human_readable() {
        serializer.serialize_str(&hex::encode(bytes))
    } else {
        serializer.serialize_bytes(bytes)
    }
}

fn deserialize_fixed<'de, D: Deserializer<'de>, const N: usize>(
    deserializer: D,
    what: &str,
) -> Result<[u8; N], D::Error> {
    let bytes = if deserializer.is_human_readable() {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(serde::de::Error::custom)?
    } else {
        <Vec<u8>>::deserialize(deserializer)?
    };
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        serde::de::Error::custom(format!("{what} must be {N} bytes, got {len}"))
    })
}

/// An Ed25519 signature
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_SIZE]);

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_fixed(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_fixed::<D, SIGNATURE_SIZE>(deserializer, "signature").map(Self)
    }
}

impl Signature {
    /// Create from raw bytes
    ///
    /// # Errors
    /// Returns error if bytes are not the correct length
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let arr: [u8; SIGNATURE_SIZE] =
            bytes.try_into().map_err(|_| CryptoError::InvalidSignature)?;
        Ok(Self(arr))
    }

    /// Create a placeholder (all zeros) for unsigned structures.
    /// This is NOT a valid signature, only a sentinel for "not yet signed".
    #[must_use]
    pub const fn placeholder() -> Self {
        Self([0u8; SIGNATURE_SIZE])
    }

    /// Get underlying bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Convert to hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sig({}..)", &self.to_hex()[..16])
    }
}

/// An Ed25519 public key
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; PUBKEY_SIZE]);

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_fixed(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_fixed::<D, PUBKEY_SIZE>(deserializer, "public key").map(Self)
    }
}

impl PublicKey {
    /// Create from raw bytes (validated as a curve point)
    ///
    /// # Errors
    /// Returns error if bytes don't represent a valid Ed25519 public key
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let arr: [u8; PUBKEY_SIZE] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidPublicKey(format!(
                "expected {} bytes, got {}",
                PUBKEY_SIZE,
                bytes.len()
            ))
        })?;
        VerifyingKey::from_bytes(&arr)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        Ok(Self(arr))
    }

    /// Get underlying bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Convert to hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string
    ///
    /// # Errors
    /// Returns error if hex is invalid or not a valid public key
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let bytes = hex::decode(s).map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PubKey({}..)", &self.to_hex()[..16])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// An Ed25519 secret key (32-byte seed)
///
/// SECURITY: This type intentionally does not implement Clone or Debug
/// to prevent accidental key leakage. Memory is zeroized on drop.
pub struct SecretKey([u8; SECRET_KEY_SIZE]);

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl SecretKey {
    /// Create from raw bytes
    ///
    /// # Errors
    /// Returns error if bytes are the wrong length
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let arr: [u8; SECRET_KEY_SIZE] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidPublicKey(format!(
                "invalid secret key: expected {} bytes, got {}",
                SECRET_KEY_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Get underlying bytes
    ///
    /// # Security
    /// Be careful with the returned bytes - they are the raw secret key material.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Derive the matching public key
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey(SigningKey::from_bytes(&self.0).verifying_key().to_bytes())
    }

    /// Sign a message
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Signature {
        let sk = SigningKey::from_bytes(&self.0);
        Signature(sk.sign(message).to_bytes())
    }
}

/// A keypair containing both secret and public keys
pub struct Keypair {
    secret: SecretKey,
    public: PublicKey,
}

impl Keypair {
    /// Generate a new random keypair
    #[must_use]
    pub fn generate() -> Self {
        let mut seed = [0u8; SECRET_KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut seed);
        let result = Self::from_seed(&seed);
        seed.zeroize();
        result
    }

    /// Deterministically derive a keypair from a 32-byte seed
    #[must_use]
    pub fn from_seed(seed: &[u8; SECRET_KEY_SIZE]) -> Self {
        let secret = SecretKey(*seed);
        let public = secret.public_key();
        Self { secret, public }
    }

    /// Rebuild from a stored secret key, deriving the public half
    #[must_use]
    pub fn from_secret(secret: SecretKey) -> Self {
        let public = secret.public_key();
        Self { secret, public }
    }

    /// Get the public key
    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Sign a message
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.secret.sign(message)
    }

    /// Get the secret key (for persistence)
    #[must_use]
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }
}

/// Sign a message with a secret key (convenience function)
#[must_use]
pub fn sign(secret: &SecretKey, message: &[u8]) -> Signature {
    secret.sign(message)
}

/// Verify a signature against a public key and message
///
/// # Errors
/// Returns error if signature is invalid
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> CryptoResult<()> {
    let vk = VerifyingKey::from_bytes(&public_key.0)
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
    let sig = DalekSignature::from_bytes(&signature.0);
    vk.verify_strict(message, &sig)
        .map_err(|_| CryptoError::InvalidSignature)
}
