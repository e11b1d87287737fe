//! Multisig treasury contract mirror
//!
//! Holds the committed signer root, the current proposal slot and the
//! treasury balance. A verified transition is settled through
//! `approve_with_proof`: undecided rounds recommit the advanced state hash,
//! decided rounds reset the slot and, on approval, pay the proposal out
//! through the account book.

use serde::{Deserialize, Serialize};
use tracing::info;

use arbor_ledger::{AccountBook, EventLog};
use arbor_merkle::{Hash, ZERO_HASH};

use crate::errors::{MultiSigError, MultiSigResult};
use crate::model::Proposal;
use crate::transition::StateTransition;

/// Outcome of settling a verified transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Undecided,
    Approved,
    Rejected,
}

/// A timelock on the treasury balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundsLock {
    pub amount: u64,
    /// First slot at which payouts are allowed again.
    pub cliff: u64,
}

/// Events emitted by the treasury.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiSigEvent {
    Voted {
        proposal: Proposal,
        votes_for: u64,
        votes_against: u64,
        passed: Decision,
        receiver_creation_fee_paid: bool,
    },
    FundsLocked {
        amount: u64,
        lock_slots: u64,
    },
}

/// The multisig treasury.
#[derive(Debug, Default)]
pub struct MultiSigContract {
    signer_root: Hash,
    /// Hash of the in-flight proposal state, all-zero when no round is open.
    proposal_state: Hash,
    num_signers: u64,
    threshold: u64,
    balance: u64,
    lock: Option<FundsLock>,
    events: EventLog<MultiSigEvent>,
}

impl MultiSigContract {
    /// A deployed but not yet set up treasury.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the signer set and threshold. Only valid once, from the zeroed
    /// deployment state. The threshold must be reachable by the signer set.
    pub fn setup(&mut self, signer_root: Hash, num_signers: u64, threshold: u64) -> MultiSigResult<()> {
        if self.signer_root != ZERO_HASH || self.num_signers != 0 {
            return Err(MultiSigError::AlreadySetUp);
        }
        if threshold == 0 || threshold > num_signers {
            return Err(MultiSigError::InvalidThreshold {
                threshold,
                num_signers,
            });
        }
        self.signer_root = signer_root;
        self.num_signers = num_signers;
        self.threshold = threshold;
        info!(num_signers, threshold, "treasury set up");
        Ok(())
    }

    pub fn signer_root(&self) -> Hash {
        self.signer_root
    }

    /// Committed proposal slot, all-zero when no round is open.
    pub fn proposal_state(&self) -> Hash {
        self.proposal_state
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn lock(&self) -> Option<FundsLock> {
        self.lock
    }

    pub fn events(&self) -> &EventLog<MultiSigEvent> {
        &self.events
    }

    /// Fund the treasury and lock payouts for `lock_slots` slots.
    pub fn deposit_timelocked(&mut self, amount: u64, lock_slots: u64, current_slot: u64) {
        self.balance += amount;
        self.lock = Some(FundsLock {
            amount,
            cliff: current_slot + lock_slots,
        });
        self.events.emit(MultiSigEvent::FundsLocked { amount, lock_slots });
        info!(amount, lock_slots, "treasury funded under timelock");
    }

    /// Settle a verified transition against the committed state.
    ///
    /// The transition's base must match the committed proposal slot: the
    /// zero slot for a fresh round (which must also start from the committed
    /// signer root), the slot hash otherwise. The treasury must cover the
    /// proposal amount. Reaching the approval threshold pays the receiver,
    /// charging the account-creation fee against the amount for a fresh
    /// account; reaching `num_signers - threshold` rejections discards the
    /// round; anything else recommits the advanced state.
    pub fn approve_with_proof(
        &mut self,
        transition: &StateTransition,
        accounts: &mut AccountBook,
        current_slot: u64,
    ) -> MultiSigResult<Decision> {
        let from = &transition.from.state;
        let to = &transition.to.state;

        if from.can_be_new() {
            if self.proposal_state != ZERO_HASH {
                return Err(MultiSigError::ProposalSlotMismatch);
            }
            if from.signer_state_root != self.signer_root {
                return Err(MultiSigError::SignerRootMismatch);
            }
        } else if self.proposal_state != from.hash() {
            return Err(MultiSigError::ProposalSlotMismatch);
        }

        let proposal = to.proposal;
        if self.balance < proposal.amount {
            return Err(MultiSigError::InsufficientBalance {
                required: proposal.amount,
                available: self.balance,
            });
        }

        let decision = if to.votes_for >= self.threshold {
            Decision::Approved
        } else if to.votes_against >= self.num_signers - self.threshold {
            Decision::Rejected
        } else {
            Decision::Undecided
        };

        let mut fee_paid = false;
        match decision {
            Decision::Approved => {
                if let Some(lock) = self.lock {
                    if current_slot < lock.cliff {
                        return Err(MultiSigError::FundsTimelocked {
                            cliff: lock.cliff,
                            current_slot,
                        });
                    }
                }
                let fee = if accounts.is_new(&proposal.receiver) {
                    accounts.creation_fee()
                } else {
                    0
                };
                let paid = proposal.amount.checked_sub(fee).ok_or(
                    MultiSigError::AmountBelowCreationFee {
                        amount: proposal.amount,
                        fee,
                    },
                )?;
                self.balance -= proposal.amount;
                accounts.credit(proposal.receiver, paid);
                self.proposal_state = ZERO_HASH;
                fee_paid = fee > 0;
            }
            Decision::Rejected => {
                self.proposal_state = ZERO_HASH;
            }
            Decision::Undecided => {
                self.proposal_state = to.hash();
            }
        }

        self.events.emit(MultiSigEvent::Voted {
            proposal,
            votes_for: to.votes_for,
            votes_against: to.votes_against,
            passed: decision,
            receiver_creation_fee_paid: fee_paid,
        });
        info!(
            votes_for = to.votes_for,
            votes_against = to.votes_against,
            decision = ?decision,
            "proposal transition settled"
        );
        Ok(decision)
    }
}
