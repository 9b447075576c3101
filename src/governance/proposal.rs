//! Proposal registry.
//!
//! A proposal is identified by a digest of its content, so resubmitting the
//! same calls with the same description collides with the stored one. Only
//! the Keccak-256 digest of the description is kept.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::dao::CollectorDao;
use super::events::DaoEvent;
use super::membership::MembershipLedger;
use super::store::{self, proposal_index_key, proposal_key, KEY_PROPOSAL_COUNT};
use super::GovernanceError;
use crate::contracts::env::CallEnv;
use crate::contracts::{ContractError, ContractResult};
use crate::crypto::{keccak256, Hash, Hasher};
use crate::types::{Address, Amount, Id, Timestamp};

/// A stored proposal
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Content digest
    pub id: Id,
    /// Callees, in execution order
    pub targets: Vec<Address>,
    /// Native value forwarded with each call
    pub values: Vec<Amount>,
    /// Opaque call data for each call
    pub call_payloads: Vec<Vec<u8>>,
    /// Keccak-256 of the description
    pub description_digest: Hash,
    /// Creator
    pub proposer: Address,
    /// Creation time (ms)
    pub created_at: Timestamp,
    /// Votes in favour
    pub votes_for: u64,
    /// Votes against
    pub votes_against: u64,
    /// Abstentions
    pub votes_abstain: u64,
    /// Set once all calls succeeded
    pub executed: bool,
}

impl Proposal {
    /// Number of votes of any kind
    #[must_use]
    pub fn total_votes(&self) -> u64 {
        self.votes_for + self.votes_against + self.votes_abstain
    }
}

/// Keccak-256 of a proposal description
#[must_use]
pub fn description_digest(description: &str) -> Hash {
    keccak256(description.as_bytes())
}

/// Content identifier of a proposal.
///
/// Every list is length-prefixed and every payload is individually
/// length-prefixed, so distinct contents never share an encoding.
#[must_use]
pub fn compute_proposal_id(
    targets: &[Address],
    values: &[Amount],
    call_payloads: &[Vec<u8>],
    description_digest: &Hash,
) -> Id {
    let mut hasher = Hasher::new();
    hasher.update(&(targets.len() as u64).to_le_bytes());
    for target in targets {
        hasher.update(target.as_bytes());
    }
    hasher.update(&(values.len() as u64).to_le_bytes());
    for value in values {
        hasher.update(&value.raw().to_le_bytes());
    }
    hasher.update(&(call_payloads.len() as u64).to_le_bytes());
    for payload in call_payloads {
        hasher.update_prefixed(payload);
    }
    hasher.update(description_digest.as_bytes());
    hasher.finalize()
}

/// An off-chain proposal draft, as read from JSON by the CLI
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProposalDraft {
    /// Callees
    pub targets: Vec<Address>,
    /// Values in base units
    pub values: Vec<Amount>,
    /// Hex-encoded call data (optional `0x` prefix)
    #[serde(default)]
    pub call_payloads: Vec<String>,
    /// Free-form description
    pub description: String,
}

impl ProposalDraft {
    /// Decoded call data
    ///
    /// # Errors
    /// Returns error if any payload is not valid hex
    pub fn payload_bytes(&self) -> Result<Vec<Vec<u8>>, hex::FromHexError> {
        self.call_payloads
            .iter()
            .map(|p| hex::decode(p.trim_start_matches("0x")))
            .collect()
    }

    /// Digest that `execute` must be given
    #[must_use]
    pub fn description_digest(&self) -> Hash {
        description_digest(&self.description)
    }

    /// Id the proposal will have once created
    ///
    /// # Errors
    /// Returns error if any payload is not valid hex
    pub fn proposal_id(&self) -> Result<Id, hex::FromHexError> {
        Ok(compute_proposal_id(
            &self.targets,
            &self.values,
            &self.payload_bytes()?,
            &self.description_digest(),
        ))
    }
}

impl CollectorDao {
    /// Stored proposal, if any
    pub(super) fn load_proposal(&self, env: &CallEnv<'_, '_>, id: &Id) -> ContractResult<Option<Proposal>> {
        store::load(env.state(), &env.this(), &proposal_key(id))
    }

    /// Stored proposal or `ProposalNotFound`
    pub(super) fn get_proposal(&self, env: &CallEnv<'_, '_>, id: &Id) -> ContractResult<Proposal> {
        self.load_proposal(env, id)?
            .ok_or_else(|| GovernanceError::ProposalNotFound.into())
    }

    pub(super) fn save_proposal(&self, env: &mut CallEnv<'_, '_>, proposal: &Proposal) -> ContractResult<()> {
        store::save(env, proposal_key(&proposal.id), proposal)
    }

    /// Number of proposals ever created
    pub(super) fn proposal_count(&self, env: &CallEnv<'_, '_>) -> ContractResult<u64> {
        Ok(store::load(env.state(), &env.this(), KEY_PROPOSAL_COUNT)?.unwrap_or(0))
    }

    /// All proposal ids in creation order
    pub(super) fn proposal_ids(&self, env: &CallEnv<'_, '_>) -> ContractResult<Vec<Id>> {
        (0..self.proposal_count(env)?)
            .map(|n| {
                store::load(env.state(), &env.this(), &proposal_index_key(n))?.ok_or_else(|| {
                    ContractError::ExecutionFailed(format!("proposal index slot {n} is empty"))
                })
            })
            .collect()
    }

    /// Store a new proposal made by the caller
    pub(super) fn create_proposal(
        &self,
        env: &mut CallEnv<'_, '_>,
        targets: Vec<Address>,
        values: Vec<Amount>,
        call_payloads: Vec<Vec<u8>>,
        description: &str,
    ) -> ContractResult<Id> {
        let proposer = env.caller();
        if !self.members(env).is_member(&proposer)? {
            return Err(GovernanceError::NotAMember.into());
        }
        if targets.is_empty() {
            return Err(GovernanceError::EmptyProposal.into());
        }
        if values.len() != targets.len() || call_payloads.len() != targets.len() {
            return Err(GovernanceError::InvalidLength.into());
        }

        let description_digest = description_digest(description);
        let id = compute_proposal_id(&targets, &values, &call_payloads, &description_digest);
        if self.load_proposal(env, &id)?.is_some() {
            return Err(GovernanceError::AlreadyExists.into());
        }

        let created_at = env.now();
        let proposal = Proposal {
            id,
            targets,
            values,
            call_payloads,
            description_digest,
            proposer,
            created_at,
            votes_for: 0,
            votes_against: 0,
            votes_abstain: 0,
            executed: false,
        };
        self.save_proposal(env, &proposal)?;

        let position = self.proposal_count(env)?;
        store::save(env, proposal_index_key(position), &id)?;
        store::save(env, KEY_PROPOSAL_COUNT.to_vec(), &(position + 1))?;

        info!(
            proposal = %id,
            %proposer,
            calls = proposal.targets.len(),
            created_at,
            "Proposal created"
        );

        let Proposal {
            targets,
            values,
            call_payloads,
            ..
        } = proposal;
        DaoEvent::ProposalCreated {
            id,
            proposer,
            targets,
            values,
            call_payloads,
            description_digest,
            created_at,
        }
        .emit(env)?;

        Ok(id)
    }
}
