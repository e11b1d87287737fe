//! Action-reduction engine
//!
//! Folds a fixed-capacity batch of action slots over the committed lending
//! state. Each slot is verified against the running root before its transition
//! is absorbed: the token witness must open the user's prior per-token
//! balance, and the user witness must open the record those values hash to.
//! Padding slots go through the same verification but never advance the
//! action cursor.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use arbor_ledger::{actions::chain, ActionDigest};
use arbor_merkle::{u64_to_field, Hash};

use crate::errors::{LendingError, LendingResult};
use crate::model::{LiquidityActionWitnesses, UserLiquidityAction, UserLiquidityRecord};
use crate::witness_service::{ActionUndo, SlotKind, WitnessService};

/// Default number of action slots per reduction batch.
pub const DEFAULT_MAX_ACTIONS: usize = 2;

/// Reduction batch configuration.
#[derive(Clone, Copy, Debug)]
pub struct ReducerConfig {
    /// Slots per batch; pending actions beyond this wait for the next batch.
    pub max_actions: usize,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            max_actions: DEFAULT_MAX_ACTIONS,
        }
    }
}

/// The on-chain lending state a reduction starts from and produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedLending {
    /// Cursor of the last reduced action.
    pub action_cursor: Hash,
    /// Root of the global user-liquidity tree.
    pub liquidity_root: Hash,
    /// Sum of all reduced liquidity amounts.
    pub total_collateral: u64,
}

/// One slot of a reduction batch.
#[derive(Clone, Copy, Debug)]
pub struct ActionSlot {
    pub action: UserLiquidityAction,
    pub padding: bool,
}

impl ActionSlot {
    /// A slot carrying a dispatched action.
    pub fn real(action: UserLiquidityAction) -> Self {
        Self {
            action,
            padding: false,
        }
    }

    /// An unused slot filled with the no-op action.
    pub fn padding() -> Self {
        Self {
            action: UserLiquidityAction::padding(),
            padding: true,
        }
    }
}

/// Output of a successful reduction, holding the undo tokens of the
/// speculative mirror mutations until the caller commits them.
#[derive(Debug)]
pub struct Reduction {
    pub liquidity_root: Hash,
    pub total_collateral: u64,
    pub action_cursor: Hash,
    pub undos: Vec<ActionUndo>,
}

/// Fold a batch of slots over the committed state.
///
/// On any verification failure every speculative mutation staged so far is
/// rolled back, newest first, and the mirror is left at its pre-call state.
pub fn reduce(
    committed: &CommittedLending,
    slots: &[ActionSlot],
    service: &mut WitnessService,
) -> LendingResult<Reduction> {
    let mut liquidity_root = committed.liquidity_root;
    let mut total_collateral = committed.total_collateral;
    let mut action_cursor = committed.action_cursor;
    let mut undos: Vec<ActionUndo> = Vec::with_capacity(slots.len());

    for (slot_index, slot) in slots.iter().enumerate() {
        let kind = if slot.padding {
            SlotKind::Padding
        } else {
            SlotKind::Real
        };
        let (witnesses, undo) = service.prepare_action(&slot.action, kind);

        match verify_slot(slot_index, &slot.action, &witnesses, liquidity_root) {
            Ok(new_root) => {
                liquidity_root = new_root;
                total_collateral += slot.action.amount;
                if !slot.padding {
                    action_cursor = chain(&action_cursor, &slot.action.digest());
                }
                undos.push(undo);
            }
            Err(err) => {
                warn!(slot = slot_index, error = %err, "reduction slot failed, rolling back");
                service.abort(undo);
                service.abort_all(undos);
                return Err(err);
            }
        }
    }

    debug!(
        slots = slots.len(),
        total_collateral,
        "reduced action batch"
    );
    Ok(Reduction {
        liquidity_root,
        total_collateral,
        action_cursor,
        undos,
    })
}

/// Verify one slot against the running root and return the root after its
/// transition.
fn verify_slot(
    slot_index: usize,
    action: &UserLiquidityAction,
    witnesses: &LiquidityActionWitnesses,
    running_root: Hash,
) -> LendingResult<Hash> {
    if witnesses.token_witness.calculate_index() != action.token.tree_index() {
        return Err(LendingError::TokenWitnessIndexMismatch);
    }
    if witnesses.user_witness.calculate_index() != action.user.tree_index() {
        return Err(LendingError::UserWitnessIndexMismatch);
    }

    // The token witness plus the claimed prior balance give the user's token
    // root, which together with the claimed totals must hash to a record that
    // is a member of the running global root.
    let token_root = witnesses
        .token_witness
        .calculate_root(&u64_to_field(witnesses.liquidity_so_far));
    let record_before = UserLiquidityRecord {
        borrowed: witnesses.borrowed,
        total_liquidity: witnesses.total_liquidity,
        liquidity_root: token_root,
    };
    if witnesses.user_witness.calculate_root(&record_before.hash()) != running_root {
        return Err(LendingError::LiquidityMembershipFailed { slot: slot_index });
    }

    let new_token_root = witnesses
        .token_witness
        .calculate_root(&u64_to_field(witnesses.liquidity_so_far + action.amount));
    let record_after = record_before.with_liquidity(action.amount, new_token_root);
    Ok(witnesses.user_witness.calculate_root(&record_after.hash()))
}
