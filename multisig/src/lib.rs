//! Arbor Multisig Treasury
//!
//! K-of-n treasury control through composable vote proofs:
//!
//! - **Model** ([`model`]): proposals, signer states and voting states as
//!   immutable hashed values over the signer-eligibility tree
//! - **Transitions** ([`transition`]): single-vote approval verification and
//!   the associative merge of adjacent transitions
//! - **Contract** ([`MultiSigContract`]): the committed treasury state,
//!   settlement of verified transitions and timelocked funding

pub mod contract;
pub mod errors;
pub mod model;
pub mod transition;

pub use contract::{Decision, FundsLock, MultiSigContract, MultiSigEvent};
pub use errors::{MultiSigError, MultiSigResult};
pub use model::{
    build_signer_tree, vote_message_fields, Proposal, ProposalState, SignerState,
};
pub use transition::{apply_vote, approve, merge, ProgramState, StateTransition};
