//! Call environment handed to a contract for the duration of one call.
//!
//! The environment knows who called, how much value came with the call, the
//! current block, and how to reach other contracts. Nested calls made through
//! [`CallEnv::call`] run with the calling contract as `caller`; that identity
//! is the only way a contract can observe a call as coming from itself.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::state::ContractState;
use super::{ContractError, ContractEvent, ContractRegistry, ContractResult};
use crate::types::{Address, Amount, Timestamp};

/// Deepest allowed nesting of contract calls
pub const MAX_CALL_DEPTH: u32 = 64;

/// Block-level facts visible to every call in a transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContext {
    /// Block timestamp (ms)
    pub timestamp: Timestamp,
    /// Chain identifier
    pub chain_id: u64,
}

/// Execution environment of a single contract call
pub struct CallEnv<'s, 'a> {
    state: &'s mut ContractState<'a>,
    registry: &'s ContractRegistry,
    block: BlockContext,
    caller: Address,
    this: Address,
    value: Amount,
    depth: u32,
}

impl<'s, 'a> CallEnv<'s, 'a> {
    /// Environment for a top-level call made by an external account
    pub fn new(
        state: &'s mut ContractState<'a>,
        registry: &'s ContractRegistry,
        block: BlockContext,
        caller: Address,
        this: Address,
        value: Amount,
    ) -> Self {
        Self {
            state,
            registry,
            block,
            caller,
            this,
            value,
            depth: 0,
        }
    }

    /// Immediate caller of this call
    #[must_use]
    pub fn caller(&self) -> Address {
        self.caller
    }

    /// Address of the executing contract
    #[must_use]
    pub fn this(&self) -> Address {
        self.this
    }

    /// Value transferred with this call (already credited to `this`)
    #[must_use]
    pub fn value(&self) -> Amount {
        self.value
    }

    /// Current block timestamp
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.block.timestamp
    }

    /// Chain identifier
    #[must_use]
    pub fn chain_id(&self) -> u64 {
        self.block.chain_id
    }

    /// Balance of any account
    #[must_use]
    pub fn balance_of(&self, address: &Address) -> Amount {
        self.state.balance(address)
    }

    /// Read-only view of chain state
    #[must_use]
    pub fn state(&self) -> &ContractState<'a> {
        &*self.state
    }

    /// Read a slot of this contract's storage
    #[must_use]
    pub fn storage_read(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.state.storage_read(&self.this, key)
    }

    /// Check whether a slot of this contract's storage is occupied
    #[must_use]
    pub fn storage_contains(&self, key: &[u8]) -> bool {
        self.state.storage_contains(&self.this, key)
    }

    /// Write a slot of this contract's storage
    pub fn storage_write(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.state.storage_write(self.this, key, value);
    }

    /// Emit an event attributed to this contract
    pub fn emit(&mut self, topic: &str, data: Vec<u8>) {
        self.state.emit_event(ContractEvent {
            contract: self.this,
            topic: topic.to_string(),
            data,
        });
    }

    /// Call `target` with `input`, forwarding `value` from this contract.
    ///
    /// Calling an address with no deployed contract is a plain transfer and
    /// returns empty output. A failed call leaves no trace: its value
    /// transfer, storage writes and events are undone before the error is
    /// returned, so the caller may handle it and carry on.
    ///
    /// # Errors
    /// Returns the callee's error, `InsufficientBalance` if this contract
    /// cannot cover `value`, or `CallDepthExceeded`.
    pub fn call(&mut self, target: Address, value: Amount, input: &[u8]) -> ContractResult<Vec<u8>> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(ContractError::CallDepthExceeded(MAX_CALL_DEPTH));
        }

        let checkpoint = self.state.checkpoint();
        self.state.transfer(self.this, target, value)?;

        let registry = self.registry;
        let Some(contract) = registry.get(&target) else {
            debug!(from = %self.this, to = %target, %value, "Value transfer to plain account");
            return Ok(Vec::new());
        };

        debug!(
            from = %self.this,
            to = %target,
            contract = contract.name(),
            %value,
            depth = self.depth + 1,
            "Nested contract call"
        );

        let mut nested = CallEnv {
            state: &mut *self.state,
            registry,
            block: self.block,
            caller: self.this,
            this: target,
            value,
            depth: self.depth + 1,
        };
        let result = contract.call(&mut nested, input);
        if let Err(e) = &result {
            debug!(to = %target, error = %e, "Nested call reverted");
            self.state.rollback_to(checkpoint);
        }
        result
    }
}
