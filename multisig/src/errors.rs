//! Multisig error types

use thiserror::Error;

/// Errors raised by the multisig transition rules and the treasury contract.
#[derive(Error, Debug)]
pub enum MultiSigError {
    #[error("invalid vote signature")]
    InvalidVoteSignature,

    #[error("signer witness resolves to a different signer key")]
    WitnessIndexMismatch,

    #[error("signer is not an unvoted member of the signer tree")]
    SignerMembershipFailed,

    #[error("claimed post state does not match the derived state")]
    StateMismatch,

    #[error("left leg does not start at the transition's base state")]
    MergeBaseMismatch,

    #[error("right leg does not start where the left leg ends")]
    MergeChainMismatch,

    #[error("right leg does not end at the transition's target state")]
    MergeTargetMismatch,

    #[error("transition base does not match the committed proposal slot")]
    ProposalSlotMismatch,

    #[error("fresh proposal does not start from the committed signer root")]
    SignerRootMismatch,

    #[error("insufficient treasury balance: required {required}, available {available}")]
    InsufficientBalance { required: u64, available: u64 },

    #[error("treasury funds are timelocked until slot {cliff}, current slot {current_slot}")]
    FundsTimelocked { cliff: u64, current_slot: u64 },

    #[error("proposal amount {amount} does not cover the account creation fee {fee}")]
    AmountBelowCreationFee { amount: u64, fee: u64 },

    #[error("contract is already set up")]
    AlreadySetUp,

    #[error("threshold {threshold} is not valid for {num_signers} signers")]
    InvalidThreshold { threshold: u64, num_signers: u64 },
}

pub type MultiSigResult<T> = Result<T, MultiSigError>;
