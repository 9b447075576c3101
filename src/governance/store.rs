//! Storage layout of the DAO contract.
//!
//! Values are bincode-encoded under byte-prefixed keys in the DAO's own
//! storage.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::contracts::env::CallEnv;
use crate::contracts::state::ContractState;
use crate::contracts::{ContractError, ContractResult};
use crate::crypto::Hash;
use crate::types::Address;

pub(super) const PROPOSAL_PREFIX: &[u8] = b"dao:proposal:";
pub(super) const VOTE_PREFIX: &[u8] = b"dao:vote:";
pub(super) const MEMBER_PREFIX: &[u8] = b"dao:member:";
pub(super) const KEY_TOTAL_MEMBERS: &[u8] = b"dao:total_members";
pub(super) const PROPOSAL_INDEX_PREFIX: &[u8] = b"dao:proposal_index:";
pub(super) const KEY_PROPOSAL_COUNT: &[u8] = b"dao:proposal_count";

pub(super) fn proposal_key(id: &Hash) -> Vec<u8> {
    let mut key = PROPOSAL_PREFIX.to_vec();
    key.extend_from_slice(id.as_bytes());
    key
}

pub(super) fn vote_key(id: &Hash, voter: &Address) -> Vec<u8> {
    let mut key = VOTE_PREFIX.to_vec();
    key.extend_from_slice(id.as_bytes());
    key.extend_from_slice(voter.as_bytes());
    key
}

pub(super) fn member_key(who: &Address) -> Vec<u8> {
    let mut key = MEMBER_PREFIX.to_vec();
    key.extend_from_slice(who.as_bytes());
    key
}

/// Slot holding the id of the `n`th proposal ever created
pub(super) fn proposal_index_key(n: u64) -> Vec<u8> {
    let mut key = PROPOSAL_INDEX_PREFIX.to_vec();
    key.extend_from_slice(&n.to_be_bytes());
    key
}

/// Decode a slot of `dao`'s storage; `None` if the slot is empty
///
/// # Errors
/// `ExecutionFailed` if the slot holds bytes that do not decode as `T`
pub(super) fn load<T: DeserializeOwned>(
    state: &ContractState<'_>,
    dao: &Address,
    key: &[u8],
) -> ContractResult<Option<T>> {
    state
        .storage_read(dao, key)
        .map(|data| bincode::deserialize(&data))
        .transpose()
        .map_err(|e| {
            ContractError::ExecutionFailed(format!(
                "corrupt storage slot {}: {e}",
                String::from_utf8_lossy(key)
            ))
        })
}

/// Encode and write a slot of the executing contract's storage
pub(super) fn save<T: Serialize>(env: &mut CallEnv<'_, '_>, key: Vec<u8>, value: &T) -> ContractResult<()> {
    let data = bincode::serialize(value)
        .map_err(|e| ContractError::ExecutionFailed(format!("storage encoding failed: {e}")))?;
    env.storage_write(key, data);
    Ok(())
}

/// Bincode-encode an output or event payload
pub(super) fn encode<T: Serialize>(value: &T) -> ContractResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| ContractError::ExecutionFailed(format!("encoding failed: {e}")))
}
