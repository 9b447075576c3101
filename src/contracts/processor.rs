//! Transaction processor - runs transactions and applies state transitions.
//!
//! Each transaction is all-or-nothing: it executes against journaled state and
//! is either committed in full or rolled back in full. The only write that
//! survives a failed transaction is the sender's nonce bump.

use tracing::{debug, error, info};

use super::env::{BlockContext, CallEnv};
use super::state::{Accounts, ContractState, Storage};
use super::transaction::ContractTransaction;
use super::{Contract, ContractError, ContractRegistry, ContractResult, ExecutionResult};
use crate::types::{Address, Amount};

/// Processes transactions against a contract registry
#[derive(Default)]
pub struct TransactionProcessor {
    registry: ContractRegistry,
}

impl TransactionProcessor {
    /// Create new transaction processor with empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: ContractRegistry::new(),
        }
    }

    /// Get reference to contract registry
    #[must_use]
    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    /// Deploy a contract: run its `on_deploy` hook, then register it.
    ///
    /// # Errors
    /// Returns error if a contract is already deployed at the address,
    /// or if the hook fails (its writes are rolled back).
    pub fn deploy(
        &mut self,
        contract: Box<dyn Contract>,
        accounts: &mut Accounts,
        storage: &mut Storage,
    ) -> ContractResult<()> {
        let address = contract.address();
        if self.registry.contains(&address) {
            return Err(ContractError::ExecutionFailed(format!(
                "contract already deployed at {address}"
            )));
        }

        let mut state = ContractState::new(accounts, storage);
        if let Err(e) = contract.on_deploy(&mut state) {
            error!(%address, error = %e, "Contract deployment failed in on_deploy");
            state.rollback();
            return Err(e);
        }
        state.commit();

        info!(%address, name = contract.name(), version = contract.version(), "Deployed contract");
        self.registry.register(contract);
        Ok(())
    }

    /// Execute a signed transaction
    ///
    /// 1. Validates signature, chain id, nonce and value coverage
    /// 2. Moves `value` from sender to target
    /// 3. Calls the target contract (if any) with the sender as caller
    /// 4. On success commits; on failure rolls back everything but the nonce
    ///
    /// # Errors
    /// Returns error if the transaction is invalid or execution fails
    pub fn execute_transaction(
        &self,
        tx: &ContractTransaction,
        block: BlockContext,
        accounts: &mut Accounts,
        storage: &mut Storage,
    ) -> ContractResult<ExecutionResult> {
        let mut state = ContractState::new(accounts, storage);
        self.validate_transaction(tx, block, &state)?;

        debug!(tx_id = %tx.id, target = %tx.target, value = %tx.value, "Executing transaction");

        match self.run(tx, block, &mut state) {
            Ok(output) => {
                state.bump_nonce(tx.sender_address);
                let events = state.take_events();
                state.commit();

                info!(
                    tx_id = %tx.id,
                    target = %tx.target,
                    events = events.len(),
                    "Transaction committed"
                );

                Ok(ExecutionResult { events, output })
            }
            Err(e) => {
                error!(tx_id = %tx.id, target = %tx.target, error = %e, "Transaction reverted");
                state.rollback();
                state.bump_nonce(tx.sender_address);
                state.commit();
                Err(e)
            }
        }
    }

    /// Run a call without a signed transaction and discard every write.
    ///
    /// Used for read-only queries; `caller` is taken on trust.
    ///
    /// # Errors
    /// Returns error if no contract is deployed at `target` or the call fails
    pub fn query(
        &self,
        caller: Address,
        target: Address,
        input: &[u8],
        block: BlockContext,
        accounts: &mut Accounts,
        storage: &mut Storage,
    ) -> ContractResult<Vec<u8>> {
        let contract = self
            .registry
            .get(&target)
            .ok_or(ContractError::NotFound(target))?;

        let mut state = ContractState::new(accounts, storage);
        let result = {
            let mut env = CallEnv::new(&mut state, &self.registry, block, caller, target, Amount::ZERO);
            contract.call(&mut env, input)
        };
        state.rollback();
        result
    }

    fn run(
        &self,
        tx: &ContractTransaction,
        block: BlockContext,
        state: &mut ContractState<'_>,
    ) -> ContractResult<Vec<u8>> {
        state.transfer(tx.sender_address, tx.target, tx.value)?;

        let Some(contract) = self.registry.get(&tx.target) else {
            return Ok(Vec::new());
        };

        let mut env = CallEnv::new(
            state,
            &self.registry,
            block,
            tx.sender_address,
            tx.target,
            tx.value,
        );
        contract.call(&mut env, &tx.input)
    }

    /// Validate transaction before execution
    fn validate_transaction(
        &self,
        tx: &ContractTransaction,
        block: BlockContext,
        state: &ContractState<'_>,
    ) -> ContractResult<()> {
        tx.verify_signature()
            .map_err(|e| ContractError::InvalidTransaction(format!("Invalid signature: {e}")))?;

        if tx.chain_id != block.chain_id {
            return Err(ContractError::InvalidTransaction(format!(
                "Wrong chain: expected {}, got {}",
                block.chain_id, tx.chain_id
            )));
        }

        let expected_nonce = state.nonce(&tx.sender_address) + 1;
        if tx.nonce != expected_nonce {
            return Err(ContractError::InvalidTransaction(format!(
                "Invalid nonce: expected {}, got {}",
                expected_nonce, tx.nonce
            )));
        }

        let balance = state.balance(&tx.sender_address);
        if balance < tx.value {
            return Err(ContractError::InsufficientBalance {
                need: tx.value,
                have: balance,
            });
        }

        Ok(())
    }
}
