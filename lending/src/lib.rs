//! Arbor Lending Core
//!
//! Custodial token lending driven by witness-tracked state trees:
//!
//! - **Witness service** ([`WitnessService`]): off-chain mirror of the global
//!   user-liquidity tree and the per-user token trees, with two-phase
//!   speculative mutation
//! - **Action reduction** ([`reducer::reduce`]): fixed-capacity batched fold
//!   of dispatched liquidity actions into the committed roots
//! - **Lending pool** ([`Lender`]): contract mirror holding the committed
//!   state, custody flows and the proof-checked borrow payout

pub mod errors;
pub mod lender;
pub mod model;
pub mod reducer;
pub mod witness_service;

pub use errors::{LendingError, LendingResult};
pub use lender::{BorrowRequest, Lender, LenderConfig, DEFAULT_BORROW_WINDOW_BLOCKS};
pub use model::{
    borrow_message_fields, LendingEvent, LiquidityActionWitnesses, UserLiquidityAction,
    UserLiquidityRecord, BORROW_SIG_PREFIX,
};
pub use reducer::{
    reduce, ActionSlot, CommittedLending, Reduction, ReducerConfig, DEFAULT_MAX_ACTIONS,
};
pub use witness_service::{ActionUndo, BorrowUndo, SlotKind, UserLookup, WitnessService};
