//! ARBOR: Witness-Tracked On-Chain Applications
//!
//! This is the root crate that re-exports all Arbor components for integration
//! testing and provides unified access to the protocol primitives.
//!
//! ## Architecture Overview
//!
//! Arbor keeps contract state as sparse Merkle roots and drives every state
//! change through self-verifying witnesses, providing:
//!
//! - **Witness-Tracked State**: an off-chain mirror serves membership proofs
//!   against the committed roots, with two-phase speculative mutation
//! - **Batched Action Reduction**: dispatched liquidity actions fold into the
//!   committed state in fixed-capacity, padded batches
//! - **Composable Vote Proofs**: multisig approvals verify one vote at a time
//!   and merge associatively into a single settled transition
//!
//! ## Crate Organization
//!
//! - `arbor-merkle`: fixed-height sparse Merkle trees and witnesses
//! - `arbor-ledger`: keys, action/event logs, token custody and accounts
//! - `arbor-lending`: witness service, action reduction and the lending pool
//! - `arbor-multisig`: proposal transitions and the treasury contract

// Re-export all crates for integration testing
pub use arbor_ledger as ledger;
pub use arbor_lending as lending;
pub use arbor_merkle as merkle;
pub use arbor_multisig as multisig;

/// Arbor protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol configuration defaults
pub mod config {
    /// Action slots per reduction batch
    pub const MAX_TRANSACTIONS_WITH_ACTIONS: usize =
        arbor_lending::DEFAULT_MAX_ACTIONS;

    /// Blocks a borrow witness stays acceptable after capture
    pub const BORROW_WINDOW_BLOCKS: u64 = arbor_lending::DEFAULT_BORROW_WINDOW_BLOCKS;

    /// Default k-of-n approval threshold
    pub fn default_threshold(num_signers: u64) -> u64 {
        num_signers / 2 + 1
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use arbor_ledger::{
        AccountBook, ActionDigest, ActionLog, CustodialToken, EventLog, Keypair, PublicKey,
        Signature,
    };
    pub use arbor_lending::{
        BorrowRequest, CommittedLending, Lender, LenderConfig, LendingError, LendingEvent,
        UserLiquidityAction, UserLiquidityRecord, UserLookup, WitnessService,
    };
    pub use arbor_merkle::{
        empty_root, Hash, MerkleWitness, SparseMerkleTree, TreeIndex, ZERO_HASH,
    };
    pub use arbor_multisig::{
        Decision, MultiSigContract, MultiSigError, Proposal, ProposalState, StateTransition,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_default_threshold_is_majority() {
        assert_eq!(config::default_threshold(3), 2);
        assert_eq!(config::default_threshold(5), 3);
    }
}
