//! Lending error types

use thiserror::Error;

use arbor_ledger::LedgerError;

/// Errors raised by the lending pool and its reduction engine.
#[derive(Error, Debug)]
pub enum LendingError {
    #[error("user {0} has no liquidity record")]
    UninitializedUser(String),

    #[error("token witness resolves to a different token key")]
    TokenWitnessIndexMismatch,

    #[error("user witness resolves to a different user key")]
    UserWitnessIndexMismatch,

    #[error("slot {slot}: user record is not a member of the running root")]
    LiquidityMembershipFailed { slot: usize },

    #[error("borrow witness does not open the committed liquidity root")]
    StaleBorrowWitness,

    #[error("insufficient remaining liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: u64, available: u64 },

    #[error("invalid borrow authorization signature")]
    InvalidBorrowSignature,

    #[error(
        "borrow witness captured at block {captured_block} is outside the \
         {window}-block window at block {current_block}"
    )]
    BorrowWindowExpired {
        captured_block: u64,
        current_block: u64,
        window: u64,
    },

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

pub type LendingResult<T> = Result<T, LendingError>;
