//! The DAO contract and its wire interface.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::GovernanceConfig;
use super::lifecycle::evaluate;
use super::membership::MembershipLedger;
use super::store::{self, KEY_PROPOSAL_COUNT, KEY_TOTAL_MEMBERS};
use super::voting::{Ballot, SignedBallot};
use crate::contracts::env::CallEnv;
use crate::contracts::state::ContractState;
use crate::contracts::{Contract, ContractError, ContractResult};
use crate::crypto::{Hash, PublicKey, Signature, SigningDomain};
use crate::types::{Address, Amount, Id};

/// Calls understood by the DAO, bincode-encoded
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DaoCall {
    /// Deposit the attached value towards membership
    Subscribe,
    /// Propose a sequence of calls; returns the proposal id
    CreateProposal {
        /// Callees
        targets: Vec<Address>,
        /// Values per call
        values: Vec<Amount>,
        /// Call data per call
        call_payloads: Vec<Vec<u8>>,
        /// Description (only its digest is stored)
        description: String,
    },
    /// Vote as the caller
    CastVote {
        /// Proposal
        proposal_id: Id,
        /// Support code
        support: u8,
    },
    /// Submit one signed ballot
    CastVoteBySignature {
        /// The ballot
        ballot: SignedBallot,
    },
    /// Submit several signed ballots, all or nothing
    CastVoteBySignatureBatch {
        /// Ballots
        ballots: Vec<Ballot>,
        /// Signer key and signature for each ballot
        signatures: Vec<(PublicKey, Signature)>,
    },
    /// Execute a succeeded proposal; returns its id
    Execute {
        /// Callees
        targets: Vec<Address>,
        /// Values per call
        values: Vec<Amount>,
        /// Call data per call
        call_payloads: Vec<Vec<u8>>,
        /// Keccak-256 of the description
        description_digest: Hash,
    },
    /// Buy an asset from the marketplace; self-calls only
    BuyAsset {
        /// Collection contract
        asset_contract: Address,
        /// Asset within the collection
        asset_id: u64,
        /// Highest acceptable price
        max_allowed: Amount,
    },
    /// Lifecycle state code of a proposal
    ProposalState {
        /// Proposal
        proposal_id: Id,
    },
    /// Full proposal record
    GetProposal {
        /// Proposal
        proposal_id: Id,
    },
    /// Whether a member voted on a proposal
    HasVoted {
        /// Proposal
        proposal_id: Id,
        /// Voter
        voter: Address,
    },
    /// Whether an address is a member
    IsMember {
        /// Address
        member: Address,
    },
    /// Number of members
    TotalMembers,
    /// All proposal ids in creation order
    ProposalIds,
}

impl DaoCall {
    /// Wire encoding
    ///
    /// # Errors
    /// Returns error if encoding fails
    pub fn encode(&self) -> ContractResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| ContractError::MalformedInput(e.to_string()))
    }

    /// Parse DAO call input
    ///
    /// # Errors
    /// Returns `MalformedInput` if the bytes are not a DAO call
    pub fn decode(input: &[u8]) -> ContractResult<Self> {
        bincode::deserialize(input).map_err(|e| ContractError::MalformedInput(format!("dao call: {e}")))
    }
}

/// The Collector DAO contract. Stateless; everything lives in storage.
#[derive(Clone, Debug)]
pub struct CollectorDao {
    address: Address,
    config: GovernanceConfig,
    marketplace: Address,
}

impl CollectorDao {
    /// DAO at `address` buying through `marketplace`
    #[must_use]
    pub fn new(address: Address, config: GovernanceConfig, marketplace: Address) -> Self {
        Self {
            address,
            config,
            marketplace,
        }
    }

    /// Deployment parameters
    #[must_use]
    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    /// Marketplace used by `buy_asset`
    #[must_use]
    pub fn marketplace(&self) -> Address {
        self.marketplace
    }

    /// Domain ballots must be signed under on chain `chain_id`.
    ///
    /// The chain id is the one the DAO is running on, never the configured
    /// one, so a ballot cannot be replayed on another chain.
    #[must_use]
    pub fn domain(&self, chain_id: u64) -> SigningDomain {
        SigningDomain::new(self.config.name.clone(), chain_id, self.address)
    }

    fn dispatch(&self, env: &mut CallEnv<'_, '_>, call: DaoCall) -> ContractResult<Vec<u8>> {
        match call {
            DaoCall::Subscribe => {
                self.subscribe(env)?;
                Ok(Vec::new())
            }
            DaoCall::CreateProposal {
                targets,
                values,
                call_payloads,
                description,
            } => {
                let id = self.create_proposal(env, targets, values, call_payloads, &description)?;
                store::encode(&id)
            }
            DaoCall::CastVote {
                proposal_id,
                support,
            } => {
                let voter = env.caller();
                self.cast_vote(env, proposal_id, support, voter)?;
                Ok(Vec::new())
            }
            DaoCall::CastVoteBySignature { ballot } => {
                self.cast_vote_by_signature(env, &ballot)?;
                Ok(Vec::new())
            }
            DaoCall::CastVoteBySignatureBatch {
                ballots,
                signatures,
            } => {
                self.cast_vote_by_signature_batch(env, &ballots, &signatures)?;
                Ok(Vec::new())
            }
            DaoCall::Execute {
                targets,
                values,
                call_payloads,
                description_digest,
            } => {
                let id = self.execute(env, &targets, &values, &call_payloads, &description_digest)?;
                store::encode(&id)
            }
            DaoCall::BuyAsset {
                asset_contract,
                asset_id,
                max_allowed,
            } => {
                self.buy_asset(env, asset_contract, asset_id, max_allowed)?;
                Ok(Vec::new())
            }
            DaoCall::ProposalState { proposal_id } => {
                let proposal = self.get_proposal(env, &proposal_id)?;
                let total = self.members(env).total_members()?;
                let state = evaluate(&proposal, env.now(), total, &self.config);
                store::encode(&state.code())
            }
            DaoCall::GetProposal { proposal_id } => {
                let proposal = self.get_proposal(env, &proposal_id)?;
                store::encode(&proposal)
            }
            DaoCall::HasVoted { proposal_id, voter } => {
                store::encode(&self.has_voted(env, &proposal_id, &voter))
            }
            DaoCall::IsMember { member } => store::encode(&self.members(env).is_member(&member)?),
            DaoCall::TotalMembers => store::encode(&self.members(env).total_members()?),
            DaoCall::ProposalIds => store::encode(&self.proposal_ids(env)?),
        }
    }
}

impl Contract for CollectorDao {
    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &str {
        "CollectorDAO"
    }

    fn version(&self) -> u32 {
        1
    }

    fn call(&self, env: &mut CallEnv<'_, '_>, input: &[u8]) -> ContractResult<Vec<u8>> {
        let call = DaoCall::decode(input)?;
        debug!(caller = %env.caller(), value = %env.value(), ?call, "DAO call");
        self.dispatch(env, call)
    }

    fn on_deploy(&self, state: &mut ContractState<'_>) -> ContractResult<()> {
        self.config
            .validate()
            .map_err(|e| ContractError::ExecutionFailed(e.to_string()))?;

        let zero = store::encode(&0u64)?;
        state.storage_write(self.address, KEY_TOTAL_MEMBERS.to_vec(), zero.clone());
        state.storage_write(self.address, KEY_PROPOSAL_COUNT.to_vec(), zero);
        Ok(())
    }
}
