//! # Collector DAO
//!
//! Governance engine for a collectors' club: members pool native value,
//! propose multi-call actions (including NFT purchases through a
//! marketplace), vote directly or with signed ballots, and execute what
//! passes.
//!
//! ## Architecture
//!
//! - **Contract host** ([`contracts`]): accounts, journaled storage, nested
//!   calls and an all-or-nothing transaction processor
//! - **Governance** ([`governance`]): membership, proposal registry,
//!   lifecycle evaluation, voting and execution
//! - **Marketplace** ([`marketplace`]): the interface the DAO buys through
//! - **Wallet** ([`wallet`]): member keys on disk
//!
//! ## Lifecycle
//!
//! Pending for the voting delay, Active for the voting period, then Defeated
//! or Succeeded until the execution window closes, after which an
//! unexecuted proposal is Expired. Executed is final.

#![forbid(unsafe_code)]
#![deny(clippy::all, rust_2018_idioms)]
#![warn(clippy::pedantic, clippy::nursery, missing_docs)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::too_many_arguments,
    // Intentional numeric casts - amounts and lengths are bounded
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    // Const fn not always beneficial for complex types
    clippy::missing_const_for_fn,
    // Self methods kept for API consistency even if unused
    clippy::unused_self,
    // must_use on every fn is excessive
    clippy::must_use_candidate,
    // Pass by value is fine for small Copy types
    clippy::needless_pass_by_value,
    // Field naming matches domain terminology
    clippy::struct_field_names,
    // Match arms with same body are sometimes clearer separate
    clippy::match_same_arms
)]

pub mod contracts;
pub mod crypto;
pub mod governance;
pub mod marketplace;
pub mod types;
pub mod wallet;

pub use contracts::chain::LocalChain;
pub use contracts::{Contract, ContractError, ContractEvent, ContractResult, ExecutionResult};
pub use crypto::{Hash, Keypair, PublicKey, SecretKey, Signature, SigningDomain};
pub use governance::{
    Ballot, CollectorDao, DaoCall, DaoEvent, GovernanceConfig, GovernanceError, Proposal, ProposalState,
    SignedBallot, Support,
};
pub use marketplace::MarketplaceCall;
pub use types::{Address, Amount, Timestamp};
pub use wallet::{Wallet, WalletError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
