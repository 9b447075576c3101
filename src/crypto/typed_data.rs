//! Structured-data signing.
//!
//! A signed message is bound to a [`SigningDomain`] naming the deployment, the
//! chain and the verifying contract, so a signature accepted by one contract
//! on one chain is worthless to any other. The digest layout follows the
//! EIP-712 shape: `keccak256(0x19 0x01 || domain_separator || struct_hash)`.

use serde::{Deserialize, Serialize};

use super::hash::{keccak256, Hash};
use crate::types::Address;

/// Type string of the signing domain
pub const DOMAIN_TYPE: &str = "EIP712Domain(string name,uint256 chainId,address verifyingContract)";

/// Domain a signature is bound to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningDomain {
    /// Deployment name
    pub name: String,
    /// Chain identifier
    pub chain_id: u64,
    /// Contract that verifies the signature
    pub verifying_contract: Address,
}

impl SigningDomain {
    /// Build a domain
    #[must_use]
    pub fn new(name: impl Into<String>, chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            name: name.into(),
            chain_id,
            verifying_contract,
        }
    }

    /// Domain separator
    #[must_use]
    pub fn separator(&self) -> Hash {
        let mut data = Vec::with_capacity(4 * 32);
        data.extend_from_slice(keccak256(DOMAIN_TYPE.as_bytes()).as_bytes());
        data.extend_from_slice(keccak256(self.name.as_bytes()).as_bytes());
        data.extend_from_slice(&encode_u64(self.chain_id));
        data.extend_from_slice(&encode_address(&self.verifying_contract));
        keccak256(&data)
    }

    /// Final digest to sign for `message` under this domain
    #[must_use]
    pub fn signing_digest<T: TypedStruct>(&self, message: &T) -> Hash {
        let mut data = Vec::with_capacity(2 + 2 * 32);
        data.extend_from_slice(&[0x19, 0x01]);
        data.extend_from_slice(self.separator().as_bytes());
        data.extend_from_slice(message.struct_hash().as_bytes());
        keccak256(&data)
    }
}

/// A message with a fixed type string and 32-byte-word field encoding
pub trait TypedStruct {
    /// Type string, e.g. `Ballot(bytes32 proposalId,address voter,uint8 support)`
    const TYPE: &'static str;

    /// Concatenated 32-byte words of the fields, in type-string order
    fn encode_fields(&self) -> Vec<u8>;

    /// `keccak256(type_hash || encoded fields)`
    fn struct_hash(&self) -> Hash {
        let mut data = keccak256(Self::TYPE.as_bytes()).as_bytes().to_vec();
        data.extend_from_slice(&self.encode_fields());
        keccak256(&data)
    }
}

/// Left-pad an integer into a 32-byte big-endian word
#[must_use]
pub fn encode_u64(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Left-pad an address into a 32-byte word
#[must_use]
pub fn encode_address(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}
