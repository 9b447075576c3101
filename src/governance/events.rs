//! Events emitted by the DAO.
//!
//! Each event is published as a [`ContractEvent`] whose topic is the variant
//! name and whose data is the bincode encoding of the whole event.

use serde::{Deserialize, Serialize};

use super::store;
use crate::contracts::env::CallEnv;
use crate::contracts::{ContractEvent, ContractResult};
use crate::crypto::Hash;
use crate::types::{Address, Amount, Id, Timestamp};

/// A DAO event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DaoEvent {
    /// Value deposited towards membership
    Subscribed {
        /// Depositor
        member: Address,
        /// Deposit
        amount: Amount,
    },
    /// Proposal stored
    ProposalCreated {
        /// Proposal id
        id: Id,
        /// Creator
        proposer: Address,
        /// Callees
        targets: Vec<Address>,
        /// Values per call
        values: Vec<Amount>,
        /// Call data per call
        call_payloads: Vec<Vec<u8>>,
        /// Keccak-256 of the description
        description_digest: Hash,
        /// Creation time
        created_at: Timestamp,
    },
    /// Vote recorded
    VoteCast {
        /// Proposal id
        id: Id,
        /// Voter
        voter: Address,
        /// Support code
        support: u8,
    },
    /// All calls of a proposal succeeded
    ProposalExecuted {
        /// Proposal id
        id: Id,
    },
    /// Marketplace purchase completed
    AssetPurchased {
        /// Asset collection contract
        asset_contract: Address,
        /// Asset id within the collection
        asset_id: u64,
        /// Price paid
        price: Amount,
    },
}

impl DaoEvent {
    /// Topic string
    #[must_use]
    pub fn topic(&self) -> &'static str {
        match self {
            Self::Subscribed { .. } => "Subscribed",
            Self::ProposalCreated { .. } => "ProposalCreated",
            Self::VoteCast { .. } => "VoteCast",
            Self::ProposalExecuted { .. } => "ProposalExecuted",
            Self::AssetPurchased { .. } => "AssetPurchased",
        }
    }

    /// Publish from the executing contract
    pub(super) fn emit(self, env: &mut CallEnv<'_, '_>) -> ContractResult<()> {
        let data = store::encode(&self)?;
        env.emit(self.topic(), data);
        Ok(())
    }

    /// Decode a published event; `None` for foreign or malformed events
    #[must_use]
    pub fn decode(event: &ContractEvent) -> Option<Self> {
        let decoded: Self = bincode::deserialize(&event.data).ok()?;
        (decoded.topic() == event.topic).then_some(decoded)
    }
}
