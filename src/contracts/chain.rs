//! In-process chain: accounts, storage, deployed contracts and a block clock.
//!
//! `LocalChain` strings the host pieces together for local simulation and
//! tests. The clock only moves when told to; every transaction sees the
//! current clock reading as its block timestamp.

use std::collections::HashMap;

use tracing::debug;

use super::env::BlockContext;
use super::processor::TransactionProcessor;
use super::state::{AccountState, Accounts, ContractState, Storage};
use super::transaction::ContractTransaction;
use super::{Contract, ContractResult, ExecutionResult};
use crate::crypto::Keypair;
use crate::types::{Address, Amount, Timestamp};

/// A single-node chain held entirely in memory
pub struct LocalChain {
    chain_id: u64,
    now: Timestamp,
    accounts: Accounts,
    storage: Storage,
    processor: TransactionProcessor,
}

impl LocalChain {
    /// Empty chain starting at `genesis_time`
    #[must_use]
    pub fn new(chain_id: u64, genesis_time: Timestamp) -> Self {
        Self {
            chain_id,
            now: genesis_time,
            accounts: HashMap::new(),
            storage: HashMap::new(),
            processor: TransactionProcessor::new(),
        }
    }

    /// Chain identifier
    #[must_use]
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Current block timestamp
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Move the clock forward
    pub fn advance(&mut self, ms: i64) {
        self.now += ms;
        debug!(now = self.now, "Clock advanced");
    }

    /// Block context for the next transaction
    #[must_use]
    pub fn block(&self) -> BlockContext {
        BlockContext {
            timestamp: self.now,
            chain_id: self.chain_id,
        }
    }

    /// Mint native value into an account (genesis allocation)
    pub fn fund(&mut self, address: Address, amount: Amount) {
        let account = self.accounts.entry(address).or_insert_with(AccountState::default);
        account.balance = account.balance.saturating_add(amount);
    }

    /// Native balance of an account
    #[must_use]
    pub fn balance(&self, address: &Address) -> Amount {
        self.accounts.get(address).map_or(Amount::ZERO, |a| a.balance)
    }

    /// Deploy a contract
    ///
    /// # Errors
    /// Returns error if deployment fails
    pub fn deploy(&mut self, contract: Box<dyn Contract>) -> ContractResult<Address> {
        let address = contract.address();
        self.processor
            .deploy(contract, &mut self.accounts, &mut self.storage)?;
        Ok(address)
    }

    /// Submit a pre-built transaction
    ///
    /// # Errors
    /// Returns error if the transaction is invalid or reverts
    pub fn submit_transaction(&mut self, tx: &ContractTransaction) -> ContractResult<ExecutionResult> {
        let block = self.block();
        self.processor
            .execute_transaction(tx, block, &mut self.accounts, &mut self.storage)
    }

    /// Build, sign and submit a transaction using the sender's next nonce
    ///
    /// # Errors
    /// Returns error if the transaction is invalid or reverts
    pub fn submit(
        &mut self,
        sender: &Keypair,
        target: Address,
        value: Amount,
        input: Vec<u8>,
    ) -> ContractResult<ExecutionResult> {
        let from = Address::from_public_key(sender.public_key());
        let nonce = self.accounts.get(&from).map_or(0, |a| a.nonce) + 1;
        let tx = ContractTransaction::signed(sender, self.chain_id, target, value, input, nonce);
        self.submit_transaction(&tx)
    }

    /// Read-only call; all writes are discarded
    ///
    /// # Errors
    /// Returns error if the call fails
    pub fn query(&mut self, caller: Address, target: Address, input: &[u8]) -> ContractResult<Vec<u8>> {
        let block = self.block();
        self.processor
            .query(caller, target, input, block, &mut self.accounts, &mut self.storage)
    }

    /// Inspect state directly
    pub fn inspect<R>(&mut self, f: impl FnOnce(&ContractState<'_>) -> R) -> R {
        let state = ContractState::new(&mut self.accounts, &mut self.storage);
        f(&state)
    }
}
