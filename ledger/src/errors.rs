//! Ledger collaborator error types

use thiserror::Error;

/// Errors from the in-process ledger collaborators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Unknown action cursor: {0}")]
    UnknownActionCursor(String),

    #[error("Insufficient token balance: required {required}, available {available}")]
    InsufficientTokenBalance { required: u64, available: u64 },
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
