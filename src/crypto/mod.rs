//! Cryptographic primitives.
//!
//! - Ed25519 for transaction and ballot signatures
//! - BLAKE3 for identifiers and address derivation
//! - Keccak-256 for structured-data digests

mod hash;
mod signature;
pub mod typed_data;

pub use hash::{hash_data, keccak256, Hash, Hasher, HASH_SIZE};
pub use signature::{
    sign, verify, Keypair, PublicKey, SecretKey, Signature, PUBKEY_SIZE, SECRET_KEY_SIZE,
    SIGNATURE_SIZE,
};
pub use typed_data::{SigningDomain, TypedStruct};

use thiserror::Error;

/// Cryptographic errors
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Invalid signature
    #[error("invalid signature")]
    InvalidSignature,
    /// Invalid public key format
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
    /// Invalid hash format
    #[error("invalid hash: {0}")]
    InvalidHash(String),
}

/// Result type for crypto operations
pub type CryptoResult<T> = Result<T, CryptoError>;
