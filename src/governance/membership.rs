//! Membership ledger.
//!
//! Contributions accumulate per address. An address becomes a member the
//! moment its cumulative contribution reaches the configured threshold, and
//! stays one; later deposits add to the total without touching the member
//! count or the qualification time.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::dao::CollectorDao;
use super::events::DaoEvent;
use super::store::{self, member_key, KEY_TOTAL_MEMBERS};
use super::GovernanceError;
use crate::contracts::env::CallEnv;
use crate::contracts::state::ContractState;
use crate::contracts::ContractResult;
use crate::types::{Address, Amount, Timestamp};

/// Read-only view of membership used by voting and execution
pub trait MembershipLedger {
    /// Time the address first qualified, if it ever did
    fn member_since(&self, who: &Address) -> ContractResult<Option<Timestamp>>;

    /// Number of unique members
    fn total_members(&self) -> ContractResult<u64>;

    /// Whether the address is currently a member
    fn is_member(&self, who: &Address) -> ContractResult<bool> {
        Ok(self.member_since(who)?.is_some())
    }
}

/// Per-address contribution record
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    /// Cumulative deposits
    pub contributed: Amount,
    /// Set once, when `contributed` first reached the threshold
    pub member_since: Option<Timestamp>,
}

/// Membership as recorded in the DAO's storage
pub struct StoredMembership<'v, 'a> {
    state: &'v ContractState<'a>,
    dao: Address,
}

impl<'v, 'a> StoredMembership<'v, 'a> {
    /// View over `dao`'s storage
    #[must_use]
    pub fn new(state: &'v ContractState<'a>, dao: Address) -> Self {
        Self { state, dao }
    }

    /// Full record of an address (default if it never deposited)
    pub fn record(&self, who: &Address) -> ContractResult<MemberRecord> {
        Ok(store::load(self.state, &self.dao, &member_key(who))?.unwrap_or_default())
    }
}

impl MembershipLedger for StoredMembership<'_, '_> {
    fn member_since(&self, who: &Address) -> ContractResult<Option<Timestamp>> {
        Ok(self.record(who)?.member_since)
    }

    fn total_members(&self) -> ContractResult<u64> {
        Ok(store::load(self.state, &self.dao, KEY_TOTAL_MEMBERS)?.unwrap_or(0))
    }
}

impl CollectorDao {
    /// Membership view for the current call
    pub(super) fn members<'v, 'a>(&self, env: &'v CallEnv<'_, 'a>) -> StoredMembership<'v, 'a> {
        StoredMembership::new(env.state(), env.this())
    }

    /// Record the value sent with this call as a contribution from the caller
    pub(super) fn subscribe(&self, env: &mut CallEnv<'_, '_>) -> ContractResult<()> {
        let member = env.caller();
        let amount = env.value();
        if amount.is_zero() {
            return Err(GovernanceError::ZeroContribution.into());
        }

        let (mut record, total) = {
            let members = self.members(env);
            (members.record(&member)?, members.total_members()?)
        };

        record.contributed = record.contributed.saturating_add(amount);
        let qualified_now =
            record.member_since.is_none() && record.contributed >= self.config().membership_threshold;
        if qualified_now {
            record.member_since = Some(env.now());
            store::save(env, KEY_TOTAL_MEMBERS.to_vec(), &(total + 1))?;
            info!(%member, total_members = total + 1, "New member");
        }
        store::save(env, member_key(&member), &record)?;

        debug!(%member, %amount, contributed = %record.contributed, "Contribution recorded");
        DaoEvent::Subscribed { member, amount }.emit(env)
    }
}
