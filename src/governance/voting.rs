//! Voting engine.
//!
//! One vote per (proposal, voter), whatever the entry point. A vote is
//! accepted only while the proposal is active and only from members who
//! qualified no later than the proposal's creation.
//!
//! Signed ballots let a relayer submit votes on a member's behalf. The
//! signature covers the typed-data digest of
//! `Ballot(bytes32 proposalId,address voter,uint8 support)` under the DAO's
//! signing domain; the signer's public key travels with the signature and
//! must hash to `voter`.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::dao::CollectorDao;
use super::events::DaoEvent;
use super::lifecycle::{evaluate, ProposalState};
use super::membership::MembershipLedger;
use super::proposal::Proposal;
use super::store::{self, vote_key};
use super::GovernanceError;
use crate::contracts::env::CallEnv;
use crate::contracts::ContractResult;
use crate::crypto::typed_data::{encode_address, encode_u64};
use crate::crypto::{verify, Keypair, PublicKey, Signature, SigningDomain, TypedStruct};
use crate::types::{Address, Id, Timestamp};

/// Vote choice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Support {
    /// Against (code 0)
    Against,
    /// Abstain (code 1); counts toward quorum only
    Abstain,
    /// For (code 2)
    For,
}

impl Support {
    /// Decode a wire code
    ///
    /// # Errors
    /// Returns `NotAValidChoice` for any code other than 0, 1 or 2
    pub fn from_code(code: u8) -> Result<Self, GovernanceError> {
        match code {
            0 => Ok(Self::Against),
            1 => Ok(Self::Abstain),
            2 => Ok(Self::For),
            _ => Err(GovernanceError::NotAValidChoice),
        }
    }

    /// Wire code
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Against => 0,
            Self::Abstain => 1,
            Self::For => 2,
        }
    }
}

impl fmt::Display for Support {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Against => "against",
            Self::Abstain => "abstain",
            Self::For => "for",
        })
    }
}

/// Stored proof that a member voted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    /// Choice
    pub support: Support,
    /// When the vote was recorded
    pub cast_at: Timestamp,
}

/// The signed message of a ballot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    /// Proposal voted on
    pub proposal_id: Id,
    /// Member whose vote this is
    pub voter: Address,
    /// Raw support code, validated only after the signature
    pub support: u8,
}

impl TypedStruct for Ballot {
    const TYPE: &'static str = "Ballot(bytes32 proposalId,address voter,uint8 support)";

    fn encode_fields(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(3 * 32);
        data.extend_from_slice(self.proposal_id.as_bytes());
        data.extend_from_slice(&encode_address(&self.voter));
        data.extend_from_slice(&encode_u64(u64::from(self.support)));
        data
    }
}

/// A ballot together with its signature and the signer's key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedBallot {
    /// Signed message
    pub ballot: Ballot,
    /// Signer's public key
    pub signer: PublicKey,
    /// Signature over the typed-data digest
    pub signature: Signature,
}

impl SignedBallot {
    /// Sign `ballot` under `domain`
    #[must_use]
    pub fn sign(ballot: Ballot, keypair: &Keypair, domain: &SigningDomain) -> Self {
        let digest = domain.signing_digest(&ballot);
        Self {
            ballot,
            signer: *keypair.public_key(),
            signature: keypair.sign(digest.as_bytes()),
        }
    }

    /// Check the signature and that the signer is the ballot's voter
    ///
    /// # Errors
    /// Returns `InvalidSignature` otherwise
    pub fn verify(&self, domain: &SigningDomain) -> Result<(), GovernanceError> {
        if Address::from_public_key(&self.signer) != self.ballot.voter {
            return Err(GovernanceError::InvalidSignature);
        }
        let digest = domain.signing_digest(&self.ballot);
        verify(&self.signer, digest.as_bytes(), &self.signature)
            .map_err(|_| GovernanceError::InvalidSignature)
    }
}

/// Eligibility of `voter` for `proposal` at `now`, in the order the checks
/// are reported. `proposal` is `None` when the id is unknown.
///
/// # Errors
/// Returns the first failing rule, or the ledger's error if it cannot be read
pub fn check_vote(
    ledger: &impl MembershipLedger,
    proposal: Option<&Proposal>,
    voter: &Address,
    support: u8,
    now: Timestamp,
    config: &super::GovernanceConfig,
) -> ContractResult<Support> {
    let Some(member_since) = ledger.member_since(voter)? else {
        return Err(GovernanceError::NotAMember.into());
    };
    let proposal = proposal.ok_or(GovernanceError::ProposalNotFound)?;
    if evaluate(proposal, now, ledger.total_members()?, config) != ProposalState::Active {
        return Err(GovernanceError::NotAnActiveProposal.into());
    }
    if member_since > proposal.created_at {
        return Err(GovernanceError::CannotVoteForThisProposal.into());
    }
    Ok(Support::from_code(support)?)
}

impl CollectorDao {
    /// Whether `voter` has voted on `id`
    pub(super) fn has_voted(&self, env: &CallEnv<'_, '_>, id: &Id, voter: &Address) -> bool {
        env.storage_contains(&vote_key(id, voter))
    }

    /// Record a vote for `voter` after every eligibility check
    pub(super) fn cast_vote(
        &self,
        env: &mut CallEnv<'_, '_>,
        id: Id,
        support: u8,
        voter: Address,
    ) -> ContractResult<()> {
        let mut proposal = self.load_proposal(env, &id)?;
        let support = check_vote(
            &self.members(env),
            proposal.as_ref(),
            &voter,
            support,
            env.now(),
            self.config(),
        )?;
        if self.has_voted(env, &id, &voter) {
            return Err(GovernanceError::AlreadyVoted.into());
        }
        let Some(proposal) = proposal.as_mut() else {
            return Err(GovernanceError::ProposalNotFound.into());
        };

        match support {
            Support::Against => proposal.votes_against += 1,
            Support::Abstain => proposal.votes_abstain += 1,
            Support::For => proposal.votes_for += 1,
        }
        let record = VoteRecord {
            support,
            cast_at: env.now(),
        };
        store::save(env, vote_key(&id, &voter), &record)?;
        self.save_proposal(env, proposal)?;

        info!(
            proposal = %id,
            %voter,
            %support,
            votes_for = proposal.votes_for,
            votes_against = proposal.votes_against,
            votes_abstain = proposal.votes_abstain,
            "Vote cast"
        );

        DaoEvent::VoteCast {
            id,
            voter,
            support: support.code(),
        }
        .emit(env)
    }

    /// Verify a signed ballot, then vote as its voter
    pub(super) fn cast_vote_by_signature(
        &self,
        env: &mut CallEnv<'_, '_>,
        signed: &SignedBallot,
    ) -> ContractResult<()> {
        if let Err(e) = signed.verify(&self.domain(env.chain_id())) {
            warn!(voter = %signed.ballot.voter, relayer = %env.caller(), "Rejected ballot signature");
            return Err(e.into());
        }
        debug!(voter = %signed.ballot.voter, relayer = %env.caller(), "Ballot signature verified");
        let Ballot {
            proposal_id,
            voter,
            support,
        } = signed.ballot;
        self.cast_vote(env, proposal_id, support, voter)
    }

    /// Apply signed ballots in order; any failure fails the whole call
    pub(super) fn cast_vote_by_signature_batch(
        &self,
        env: &mut CallEnv<'_, '_>,
        ballots: &[Ballot],
        signatures: &[(PublicKey, Signature)],
    ) -> ContractResult<()> {
        if ballots.len() != signatures.len() {
            return Err(GovernanceError::InvalidLength.into());
        }
        for (ballot, (signer, signature)) in ballots.iter().zip(signatures) {
            let signed = SignedBallot {
                ballot: *ballot,
                signer: *signer,
                signature: *signature,
            };
            self.cast_vote_by_signature(env, &signed)?;
        }
        debug!(count = ballots.len(), "Ballot batch applied");
        Ok(())
    }
}
