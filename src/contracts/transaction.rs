//! Signed transactions from external accounts.
//!
//! A transaction names a target, carries native value and opaque input, and
//! is signed by the sender over its id. The id commits to the chain id, so a
//! transaction signed for one chain never validates on another.

use serde::{Deserialize, Serialize};

use crate::crypto::{CryptoError, Hash, Hasher, Keypair, PublicKey, Signature};
use crate::types::{Address, Amount, Id};

/// A transaction that calls a contract (or just moves value)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContractTransaction {
    /// Transaction ID (hash of contents)
    pub id: Id,
    /// Chain the transaction is valid on
    pub chain_id: u64,
    /// Callee
    pub target: Address,
    /// Sender's public key
    pub sender: PublicKey,
    /// Sender's address
    pub sender_address: Address,
    /// Native value sent with the call
    pub value: Amount,
    /// Input data for the callee
    pub input: Vec<u8>,
    /// Must equal the sender's current nonce + 1
    pub nonce: u64,
    /// Sender's signature over `id`
    pub signature: Signature,
}

impl ContractTransaction {
    /// Create new transaction (unsigned)
    #[must_use]
    pub fn new(
        chain_id: u64,
        target: Address,
        sender: PublicKey,
        value: Amount,
        input: Vec<u8>,
        nonce: u64,
    ) -> Self {
        let sender_address = Address::from_public_key(&sender);

        let mut tx = Self {
            id: Hash::ZERO,
            chain_id,
            target,
            sender,
            sender_address,
            value,
            input,
            nonce,
            signature: Signature::placeholder(),
        };

        tx.id = tx.compute_id();
        tx
    }

    /// Create and sign in one step
    #[must_use]
    pub fn signed(
        keypair: &Keypair,
        chain_id: u64,
        target: Address,
        value: Amount,
        input: Vec<u8>,
        nonce: u64,
    ) -> Self {
        let mut tx = Self::new(chain_id, target, *keypair.public_key(), value, input, nonce);
        tx.signature = keypair.sign(&tx.signing_bytes());
        tx
    }

    /// Compute transaction ID
    #[must_use]
    pub fn compute_id(&self) -> Id {
        Hasher::new()
            .update(&self.chain_id.to_le_bytes())
            .update(self.target.as_bytes())
            .update(self.sender.as_bytes())
            .update(&self.value.raw().to_le_bytes())
            .update_prefixed(&self.input)
            .update(&self.nonce.to_le_bytes())
            .finalize()
    }

    /// Get bytes to sign
    #[must_use]
    pub fn signing_bytes(&self) -> Vec<u8> {
        self.compute_id().as_bytes().to_vec()
    }

    /// Verify the id matches the contents and the signature matches the id
    ///
    /// # Errors
    /// Returns error if the id was tampered with or the signature is invalid
    pub fn verify_signature(&self) -> Result<(), CryptoError> {
        if self.id != self.compute_id() || self.sender_address != Address::from_public_key(&self.sender) {
            return Err(CryptoError::InvalidSignature);
        }
        crate::crypto::verify(&self.sender, &self.signing_bytes(), &self.signature)
    }
}
