//! Proposal lifecycle evaluation.
//!
//! The state of a proposal is never stored; it is derived on demand from the
//! creation time, the tallies, the clock and the live member count.
//!
//! ```text
//! created_at      +delay          +period          +window
//!     | Pending     | Active        | Defeated /     | Expired
//!     |             |               | Succeeded      |
//! ```
//!
//! `Executed` overrides everything once set.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::GovernanceConfig;
use super::proposal::Proposal;
use crate::types::Timestamp;

/// Lifecycle state of a proposal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    /// Created, voting not yet open
    Pending,
    /// Voting open
    Active,
    /// Voting closed without quorum or majority
    Defeated,
    /// Voting closed with quorum and majority; executable until expiry
    Succeeded,
    /// Execution window passed
    Expired,
    /// All calls performed
    Executed,
}

impl ProposalState {
    /// Numeric code used on the wire
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Active => 1,
            Self::Defeated => 2,
            Self::Succeeded => 3,
            Self::Expired => 4,
            Self::Executed => 5,
        }
    }

    /// Inverse of [`ProposalState::code`]
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Pending,
            1 => Self::Active,
            2 => Self::Defeated,
            3 => Self::Succeeded,
            4 => Self::Expired,
            5 => Self::Executed,
            _ => return None,
        })
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "Pending",
            Self::Active => "Active",
            Self::Defeated => "Defeated",
            Self::Succeeded => "Succeeded",
            Self::Expired => "Expired",
            Self::Executed => "Executed",
        };
        f.write_str(name)
    }
}

/// Phase boundaries of one proposal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schedule {
    /// Voting opens
    pub active_start: Timestamp,
    /// Voting closes
    pub active_end: Timestamp,
    /// Execution no longer possible
    pub expiry: Timestamp,
}

impl Schedule {
    /// Boundaries for a proposal created at `created_at`
    #[must_use]
    pub fn for_proposal(created_at: Timestamp, config: &GovernanceConfig) -> Self {
        let active_start = created_at.saturating_add(config.voting_delay_ms);
        let active_end = active_start.saturating_add(config.voting_period_ms);
        Self {
            active_start,
            active_end,
            expiry: active_end.saturating_add(config.execution_window_ms),
        }
    }
}

/// Whether enough members took part
#[must_use]
pub fn quorum_reached(total_votes: u64, total_members: u64, quorum_percent: u8) -> bool {
    u128::from(total_votes) * 100 >= u128::from(total_members) * u128::from(quorum_percent)
}

/// State of `proposal` at `now` given the live member count
#[must_use]
pub fn evaluate(
    proposal: &Proposal,
    now: Timestamp,
    total_members: u64,
    config: &GovernanceConfig,
) -> ProposalState {
    if proposal.executed {
        return ProposalState::Executed;
    }

    let schedule = Schedule::for_proposal(proposal.created_at, config);
    if now >= schedule.expiry {
        return ProposalState::Expired;
    }
    if now < schedule.active_start {
        return ProposalState::Pending;
    }
    if now < schedule.active_end {
        return ProposalState::Active;
    }

    if !quorum_reached(proposal.total_votes(), total_members, config.quorum_percent)
        || proposal.votes_for <= proposal.votes_against
    {
        ProposalState::Defeated
    } else {
        ProposalState::Succeeded
    }
}
