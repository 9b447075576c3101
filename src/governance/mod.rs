//! Collector DAO governance engine.
//!
//! Members pool native value, propose multi-call actions, vote on them, and
//! execute the ones that pass. Components, leaves first:
//!
//! - **Membership** ([`membership`]): cumulative contributions and the time
//!   each address qualified
//! - **Proposals** ([`proposal`]): content-addressed records with tallies
//! - **Lifecycle** ([`lifecycle`]): pure state evaluation from timestamps and
//!   tallies
//! - **Voting** ([`voting`]): direct votes and signed ballots
//! - **Execution** ([`execution`]): ordered sub-calls and the self-only
//!   asset purchase
//!
//! [`CollectorDao`] is the deployed contract that ties them together. All of
//! its state lives in contract storage.

pub mod config;
mod dao;
pub mod events;
mod execution;
pub mod lifecycle;
pub mod membership;
pub mod proposal;
#[cfg(test)]
mod scenarios;
mod store;
pub mod voting;

pub use config::{ConfigError, GovernanceConfig, GovernanceConfigToml};
pub use dao::{CollectorDao, DaoCall};
pub use events::DaoEvent;
pub use lifecycle::ProposalState;
pub use membership::MembershipLedger;
pub use proposal::{compute_proposal_id, description_digest, Proposal, ProposalDraft};
pub use voting::{Ballot, SignedBallot, Support, VoteRecord};

use thiserror::Error;

/// Named governance failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum GovernanceError {
    /// A proposal must make at least one call
    #[error("proposal has no calls")]
    EmptyProposal,
    /// Parallel arrays differ in length
    #[error("array lengths do not match")]
    InvalidLength,
    /// Support code is not Against, Abstain or For
    #[error("not a valid vote choice")]
    NotAValidChoice,
    /// Deposits must carry value
    #[error("contribution must be positive")]
    ZeroContribution,
    /// Caller or voter is not a member
    #[error("not a member")]
    NotAMember,
    /// Entry point is reserved for the DAO's own execution engine
    #[error("caller must be the DAO itself")]
    CallerMustBeSelf,
    /// Ballot signature does not verify or was not made by the voter
    #[error("invalid ballot signature")]
    InvalidSignature,
    /// A proposal with identical content already exists
    #[error("proposal already exists")]
    AlreadyExists,
    /// The voter already voted on this proposal
    #[error("already voted")]
    AlreadyVoted,
    /// The voter became a member after the proposal was created
    #[error("member joined after proposal creation")]
    CannotVoteForThisProposal,
    /// Proposal is not in its voting phase
    #[error("proposal is not active")]
    NotAnActiveProposal,
    /// Proposal has not succeeded (or is executed or expired)
    #[error("proposal is not ready to execute")]
    NotReadyToExecute,
    /// No proposal with this id
    #[error("proposal not found")]
    ProposalNotFound,
    /// DAO balance is below the asset price
    #[error("insufficient DAO balance")]
    InsufficientBalance,
    /// Asset price exceeds the approved maximum
    #[error("price exceeds approved maximum")]
    InsufficientAllowance,
}

/// Broad class of a governance failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed request
    Validation,
    /// Caller lacks the right
    Authorization,
    /// Conflicts with recorded state
    Conflict,
    /// Wrong phase of the proposal lifecycle
    Lifecycle,
    /// Not enough funds or allowance
    Resource,
}

impl GovernanceError {
    /// Category of this error
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyProposal | Self::InvalidLength | Self::NotAValidChoice | Self::ZeroContribution => {
                ErrorCategory::Validation
            }
            Self::NotAMember | Self::CallerMustBeSelf | Self::InvalidSignature => {
                ErrorCategory::Authorization
            }
            Self::AlreadyExists | Self::AlreadyVoted | Self::CannotVoteForThisProposal => {
                ErrorCategory::Conflict
            }
            Self::NotAnActiveProposal | Self::NotReadyToExecute | Self::ProposalNotFound => {
                ErrorCategory::Lifecycle
            }
            Self::InsufficientBalance | Self::InsufficientAllowance => ErrorCategory::Resource,
        }
    }

    /// Whether the same request could succeed later without changes.
    ///
    /// Lifecycle and resource failures depend on time and balances; the
    /// engine itself never retries.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NotAnActiveProposal | Self::NotReadyToExecute | Self::InsufficientBalance
        )
    }
}
