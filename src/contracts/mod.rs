//! Contract host.
//!
//! A minimal deterministic runtime for the DAO and the contracts it talks to.
//! Contracts are stateless Rust objects; everything they remember lives in
//! journaled chain state.
//!
//! ## Architecture
//!
//! 1. **Contracts**: implement [`Contract`] and decode their own input
//! 2. **Transactions**: signed envelopes from external accounts
//! 3. **Call environment**: per-call view of caller, value, block and state,
//!    plus nested calls into other contracts
//! 4. **Processor**: validates a transaction, runs it, then commits or rolls
//!    back the whole thing
//!
//! A failing nested call undoes its own writes and fails its caller unless
//! the caller handles the error. A failing top-level call rolls back every
//! write made during the transaction.

pub mod chain;
pub mod env;
pub mod processor;
pub mod state;
pub mod transaction;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::governance::GovernanceError;
use crate::types::{Address, Amount};

use self::env::CallEnv;
use self::state::ContractState;

/// Result type for contract operations
pub type ContractResult<T> = Result<T, ContractError>;

/// A contract deployed at a fixed address
pub trait Contract: Send + Sync {
    /// Address the contract is deployed at
    fn address(&self) -> Address;

    /// Human-readable contract name
    fn name(&self) -> &str;

    /// Contract version
    fn version(&self) -> u32;

    /// Handle one call.
    ///
    /// Any value sent with the call has already been credited to the
    /// contract when this runs. Returned bytes are the call's output.
    ///
    /// # Errors
    /// Returns error if the call is rejected; the caller decides whether
    /// that aborts the transaction.
    fn call(&self, env: &mut CallEnv<'_, '_>, input: &[u8]) -> ContractResult<Vec<u8>>;

    /// Hook called when the contract is deployed
    fn on_deploy(&self, _state: &mut ContractState<'_>) -> ContractResult<()> {
        Ok(())
    }
}

/// Result of a committed transaction
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Events emitted during execution, in emission order
    pub events: Vec<ContractEvent>,
    /// Output of the top-level call
    pub output: Vec<u8>,
}

/// Events emitted by contracts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractEvent {
    /// Contract that emitted the event
    pub contract: Address,
    /// Event topic (for indexing/filtering)
    pub topic: String,
    /// Event data
    pub data: Vec<u8>,
}

/// Contract execution errors
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    /// No contract at this address
    #[error("contract not found: {0}")]
    NotFound(Address),

    /// Transaction validation failed
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Call input could not be decoded
    #[error("malformed call input: {0}")]
    MalformedInput(String),

    /// Execution failed
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// Insufficient balance for a transfer
    #[error("insufficient balance: need {need}, have {have}")]
    InsufficientBalance {
        /// Amount needed
        need: Amount,
        /// Amount available
        have: Amount,
    },

    /// Nested calls went too deep
    #[error("call depth exceeded (max {0})")]
    CallDepthExceeded(u32),

    /// A named governance failure
    #[error(transparent)]
    Governance(#[from] GovernanceError),
}

impl ContractError {
    /// The governance error inside, if any
    #[must_use]
    pub fn governance(&self) -> Option<&GovernanceError> {
        match self {
            Self::Governance(e) => Some(e),
            _ => None,
        }
    }
}

/// Registry of deployed contracts
///
/// Note: Cannot derive Clone or Debug because it contains trait objects
#[derive(Default)]
pub struct ContractRegistry {
    contracts: HashMap<Address, Box<dyn Contract>>,
}

impl ContractRegistry {
    /// Create new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            contracts: HashMap::new(),
        }
    }

    /// Register a contract at its own address
    pub fn register(&mut self, contract: Box<dyn Contract>) {
        self.contracts.insert(contract.address(), contract);
    }

    /// Get contract by address
    #[must_use]
    pub fn get(&self, address: &Address) -> Option<&dyn Contract> {
        self.contracts.get(address).map(AsRef::as_ref)
    }

    /// Check if a contract is deployed at this address
    #[must_use]
    pub fn contains(&self, address: &Address) -> bool {
        self.contracts.contains_key(address)
    }

    /// Number of deployed contracts
    #[must_use]
    pub fn contract_count(&self) -> usize {
        self.contracts.len()
    }
}
