//! Execution engine.
//!
//! A succeeded proposal is executed by replaying its calls in order from the
//! DAO's balance. The proposal is marked executed before the first call goes
//! out, so a call that re-enters `execute` for the same proposal sees it as
//! `Executed`. If any call fails, the error propagates and the transaction
//! rolls back, leaving the proposal `Succeeded`.

use tracing::{debug, info};

use super::dao::CollectorDao;
use super::events::DaoEvent;
use super::lifecycle::{evaluate, ProposalState};
use super::membership::MembershipLedger;
use super::proposal::compute_proposal_id;
use super::GovernanceError;
use crate::contracts::env::CallEnv;
use crate::contracts::ContractResult;
use crate::crypto::Hash;
use crate::marketplace;
use crate::types::{Address, Amount, Id};

impl CollectorDao {
    /// Perform the calls of a succeeded proposal
    pub(super) fn execute(
        &self,
        env: &mut CallEnv<'_, '_>,
        targets: &[Address],
        values: &[Amount],
        call_payloads: &[Vec<u8>],
        description_digest: &Hash,
    ) -> ContractResult<Id> {
        let id = compute_proposal_id(targets, values, call_payloads, description_digest);
        let mut proposal = self.get_proposal(env, &id)?;

        let caller = env.caller();
        let state = {
            let members = self.members(env);
            if !members.is_member(&caller)? {
                return Err(GovernanceError::NotAMember.into());
            }
            evaluate(&proposal, env.now(), members.total_members()?, self.config())
        };
        if state != ProposalState::Succeeded {
            debug!(proposal = %id, %state, "Execution refused");
            return Err(GovernanceError::NotReadyToExecute.into());
        }

        proposal.executed = true;
        self.save_proposal(env, &proposal)?;

        for (index, ((target, value), payload)) in
            targets.iter().zip(values).zip(call_payloads).enumerate()
        {
            debug!(proposal = %id, index, %target, %value, "Dispatching proposal call");
            env.call(*target, *value, payload)?;
        }

        info!(proposal = %id, %caller, calls = targets.len(), "Proposal executed");
        DaoEvent::ProposalExecuted { id }.emit(env)?;
        Ok(id)
    }

    /// Buy an asset through the configured marketplace.
    ///
    /// Only the DAO itself may call this, which in practice means a call
    /// inside an executing proposal.
    pub(super) fn buy_asset(
        &self,
        env: &mut CallEnv<'_, '_>,
        asset_contract: Address,
        asset_id: u64,
        max_allowed: Amount,
    ) -> ContractResult<()> {
        if env.caller() != env.this() {
            return Err(GovernanceError::CallerMustBeSelf.into());
        }

        let market = self.marketplace();
        let price = marketplace::query_price(env, market, asset_contract, asset_id)?;

        let balance = env.balance_of(&env.this());
        if balance < price {
            debug!(%balance, %price, "Purchase refused: balance below price");
            return Err(GovernanceError::InsufficientBalance.into());
        }
        if price > max_allowed {
            debug!(%max_allowed, %price, "Purchase refused: price above approved maximum");
            return Err(GovernanceError::InsufficientAllowance.into());
        }

        marketplace::purchase(env, market, asset_contract, asset_id, price)?;

        info!(%asset_contract, asset_id, %price, "Asset purchased");
        DaoEvent::AssetPurchased {
            asset_contract,
            asset_id,
            price,
        }
        .emit(env)
    }
}
