//! Contract state interface - journaled access to accounts and storage.
//!
//! Every write is applied immediately and recorded in a journal. `commit`
//! drops the journal; `rollback` replays it backwards, restoring balances,
//! nonces and storage exactly and discarding emitted events.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{ContractError, ContractEvent};
use crate::types::{Address, Amount};

/// Per-account chain state
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    /// Native balance
    pub balance: Amount,
    /// Number of transactions sent
    pub nonce: u64,
}

impl AccountState {
    /// Account with an opening balance
    #[must_use]
    pub fn new(balance: Amount) -> Self {
        Self { balance, nonce: 0 }
    }
}

/// Contract storage: (contract address, key) -> value
pub type Storage = HashMap<(Address, Vec<u8>), Vec<u8>>;

/// Account table
pub type Accounts = HashMap<Address, AccountState>;

/// State interface for contract execution
#[derive(Debug)]
pub struct ContractState<'a> {
    accounts: &'a mut Accounts,
    storage: &'a mut Storage,
    /// Undo log (for atomic commit/rollback)
    mutations: Vec<StateMutation>,
    /// Events emitted during execution
    events: Vec<ContractEvent>,
}

/// Represents a state mutation that can be rolled back
#[derive(Clone, Debug)]
enum StateMutation {
    Credit {
        address: Address,
        amount: Amount,
    },
    Debit {
        address: Address,
        amount: Amount,
    },
    NonceBump {
        address: Address,
    },
    StorageWrite {
        contract: Address,
        key: Vec<u8>,
        old_value: Option<Vec<u8>>,
    },
}

impl<'a> ContractState<'a> {
    /// Create new contract state wrapper
    #[must_use]
    pub fn new(accounts: &'a mut Accounts, storage: &'a mut Storage) -> Self {
        Self {
            accounts,
            storage,
            mutations: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Get account balance
    #[must_use]
    pub fn balance(&self, address: &Address) -> Amount {
        self.accounts.get(address).map_or(Amount::ZERO, |a| a.balance)
    }

    /// Get account nonce
    #[must_use]
    pub fn nonce(&self, address: &Address) -> u64 {
        self.accounts.get(address).map_or(0, |a| a.nonce)
    }

    /// Credit an account
    pub fn credit(&mut self, address: Address, amount: Amount) {
        let account = self.accounts.entry(address).or_default();
        account.balance = account.balance.saturating_add(amount);
        self.mutations.push(StateMutation::Credit { address, amount });
    }

    /// Debit an account
    ///
    /// # Errors
    /// Returns error if insufficient balance
    pub fn debit(&mut self, address: Address, amount: Amount) -> Result<(), ContractError> {
        let account = self.accounts.entry(address).or_default();
        account.balance = account.balance.checked_sub(amount).ok_or(
            ContractError::InsufficientBalance {
                need: amount,
                have: account.balance,
            },
        )?;
        self.mutations.push(StateMutation::Debit { address, amount });
        Ok(())
    }

    /// Transfer native value between accounts
    ///
    /// # Errors
    /// Returns error if insufficient balance
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), ContractError> {
        if amount.is_zero() {
            return Ok(());
        }
        self.debit(from, amount)?;
        self.credit(to, amount);
        Ok(())
    }

    /// Increment an account's nonce
    pub fn bump_nonce(&mut self, address: Address) {
        let account = self.accounts.entry(address).or_default();
        account.nonce += 1;
        self.mutations.push(StateMutation::NonceBump { address });
    }

    /// Read from contract storage
    #[must_use]
    pub fn storage_read(&self, contract: &Address, key: &[u8]) -> Option<Vec<u8>> {
        self.storage.get(&(*contract, key.to_vec())).cloned()
    }

    /// Check whether a storage slot is occupied
    #[must_use]
    pub fn storage_contains(&self, contract: &Address, key: &[u8]) -> bool {
        self.storage.contains_key(&(*contract, key.to_vec()))
    }

    /// Write to contract storage
    pub fn storage_write(&mut self, contract: Address, key: Vec<u8>, value: Vec<u8>) {
        let old_value = self.storage.insert((contract, key.clone()), value);
        self.mutations.push(StateMutation::StorageWrite {
            contract,
            key,
            old_value,
        });
    }

    /// Emit an event
    pub fn emit_event(&mut self, event: ContractEvent) {
        self.events.push(event);
    }

    /// Get all emitted events
    #[must_use]
    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    /// Take the emitted events, leaving none behind
    pub fn take_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }

    /// Commit all pending mutations. After commit, rollback is a no-op.
    pub fn commit(&mut self) {
        self.mutations.clear();
    }

    /// Current position in the journal and event list
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            mutations: self.mutations.len(),
            events: self.events.len(),
        }
    }

    /// Rollback all pending mutations and discard events
    pub fn rollback(&mut self) {
        self.rollback_to(Checkpoint::default());
    }

    /// Undo every mutation made after `checkpoint` and drop the events
    /// emitted since. Mutations committed in between are not undone.
    pub fn rollback_to(&mut self, checkpoint: Checkpoint) {
        let keep = checkpoint.mutations.min(self.mutations.len());
        for mutation in self.mutations.drain(keep..).rev() {
            match mutation {
                StateMutation::Credit { address, amount } => {
                    if let Some(account) = self.accounts.get_mut(&address) {
                        account.balance = account.balance.saturating_sub(amount);
                    }
                }
                StateMutation::Debit { address, amount } => {
                    if let Some(account) = self.accounts.get_mut(&address) {
                        account.balance = account.balance.saturating_add(amount);
                    }
                }
                StateMutation::NonceBump { address } => {
                    if let Some(account) = self.accounts.get_mut(&address) {
                        account.nonce = account.nonce.saturating_sub(1);
                    }
                }
                StateMutation::StorageWrite {
                    contract,
                    key,
                    old_value,
                } => {
                    if let Some(old_val) = old_value {
                        self.storage.insert((contract, key), old_val);
                    } else {
                        self.storage.remove(&(contract, key));
                    }
                }
            }
        }

        self.events.truncate(checkpoint.events);
    }
}

/// A point in a [`ContractState`] journal to roll back to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Checkpoint {
    mutations: usize,
    events: usize,
}
