//! Lending pool contract mirror
//!
//! `Lender` holds the committed on-chain lending state together with its
//! action and event logs. Liquidity enters through `add_liquidity`, which
//! pulls custody and dispatches an action; `rollup_liquidity` reduces the
//! pending suffix into the committed roots; `borrow` pays out against a
//! membership proof captured off-chain within the inclusion window.

use tracing::info;

use arbor_ledger::{ActionLog, CustodialToken, EventLog, PublicKey, Signature};
use arbor_merkle::{empty_root, MerkleWitness};

use crate::errors::{LendingError, LendingResult};
use crate::model::{
    borrow_message_fields, LendingEvent, UserLiquidityAction, UserLiquidityRecord,
};
use crate::reducer::{reduce, ActionSlot, CommittedLending, ReducerConfig};
use crate::witness_service::WitnessService;

/// Default number of blocks a borrow witness stays acceptable after capture.
pub const DEFAULT_BORROW_WINDOW_BLOCKS: u64 = 2;

/// Pool tuning knobs.
#[derive(Clone, Copy, Debug)]
pub struct LenderConfig {
    /// Rollup batch sizing.
    pub reducer: ReducerConfig,
    /// Blocks a borrow witness stays acceptable after capture.
    pub borrow_window_blocks: u64,
}

impl Default for LenderConfig {
    fn default() -> Self {
        Self {
            reducer: ReducerConfig::default(),
            borrow_window_blocks: DEFAULT_BORROW_WINDOW_BLOCKS,
        }
    }
}

/// A borrow request assembled off-chain against the committed root.
#[derive(Clone, Debug)]
pub struct BorrowRequest {
    pub borrower: PublicKey,
    pub token: PublicKey,
    pub amount: u64,
    /// Block height at which the witness was captured.
    pub captured_block: u64,
    /// Borrower's signature over the borrow message.
    pub signature: Signature,
    /// Witness for the borrower's leaf at the committed root.
    pub witness: MerkleWitness,
    /// The borrower's record the witness opens.
    pub record_before: UserLiquidityRecord,
}

/// The lending pool.
#[derive(Debug)]
pub struct Lender {
    address: PublicKey,
    config: LenderConfig,
    committed: CommittedLending,
    actions: ActionLog<UserLiquidityAction>,
    events: EventLog<LendingEvent>,
}

impl Lender {
    /// Deploy a pool at an address with genesis state.
    pub fn deploy(address: PublicKey, config: LenderConfig) -> Self {
        Self {
            address,
            config,
            committed: CommittedLending {
                action_cursor: arbor_ledger::actions::initial_cursor(),
                liquidity_root: empty_root(),
                total_collateral: 0,
            },
            actions: ActionLog::new(),
            events: EventLog::new(),
        }
    }

    /// Pool address, the custody account for deposited tokens.
    pub fn address(&self) -> PublicKey {
        self.address
    }

    /// Committed on-chain state.
    pub fn committed(&self) -> &CommittedLending {
        &self.committed
    }

    /// Emitted events.
    pub fn events(&self) -> &EventLog<LendingEvent> {
        &self.events
    }

    /// Number of dispatched actions not yet reduced.
    pub fn pending_actions(&self) -> LendingResult<usize> {
        Ok(self
            .actions
            .actions_since(&self.committed.action_cursor)?
            .len())
    }

    /// Pull `amount` of `token` from `sender` into custody and dispatch the
    /// matching liquidity action. The committed state is untouched until the
    /// action is reduced.
    pub fn add_liquidity(
        &mut self,
        sender: PublicKey,
        token: &mut CustodialToken,
        amount: u64,
    ) -> LendingResult<()> {
        token.transfer(sender, self.address, amount)?;
        let action = UserLiquidityAction {
            user: sender,
            token: token.address(),
            amount,
        };
        self.actions.dispatch(action);
        self.events.emit(LendingEvent::LiquidityAdded {
            token: token.address(),
            account: sender,
            amount,
        });
        info!(user = ?sender, token = ?token.address(), amount, "liquidity dispatched");
        Ok(())
    }

    /// Reduce the oldest pending actions into the committed state, padding
    /// the batch up to capacity. Returns the number of real actions reduced.
    ///
    /// Pending actions beyond the batch capacity stay queued for the next
    /// rollup.
    pub fn rollup_liquidity(&mut self, service: &mut WitnessService) -> LendingResult<usize> {
        let capacity = self.config.reducer.max_actions;
        let pending = self.actions.actions_since(&self.committed.action_cursor)?;
        let real_count = pending.len().min(capacity);

        let mut slots: Vec<ActionSlot> = pending[..real_count]
            .iter()
            .copied()
            .map(ActionSlot::real)
            .collect();
        slots.resize(capacity, ActionSlot::padding());

        let reduction = reduce(&self.committed, &slots, service)?;
        service.commit_all(reduction.undos);
        self.committed = CommittedLending {
            action_cursor: reduction.action_cursor,
            liquidity_root: reduction.liquidity_root,
            total_collateral: reduction.total_collateral,
        };
        info!(
            reduced = real_count,
            collateral = self.committed.total_collateral,
            "rollup committed"
        );
        Ok(real_count)
    }

    /// Pay out a borrow against a membership proof.
    ///
    /// Checks, in order: the inclusion window, remaining liquidity, the
    /// borrower's signature, the witness index and the record's membership at
    /// the committed root. Only after all checks pass is the committed root
    /// advanced and custody released.
    pub fn borrow(
        &mut self,
        request: &BorrowRequest,
        token: &mut CustodialToken,
        current_block: u64,
    ) -> LendingResult<()> {
        let window = self.config.borrow_window_blocks;
        if current_block > request.captured_block + window {
            return Err(LendingError::BorrowWindowExpired {
                captured_block: request.captured_block,
                current_block,
                window,
            });
        }

        let available = request.record_before.remaining_liquidity();
        if request.amount > available {
            return Err(LendingError::InsufficientLiquidity {
                requested: request.amount,
                available,
            });
        }

        let message = borrow_message_fields(&request.token, request.amount);
        if !request.borrower.verify_fields(&request.signature, &message) {
            return Err(LendingError::InvalidBorrowSignature);
        }

        if request.witness.calculate_index() != request.borrower.tree_index() {
            return Err(LendingError::UserWitnessIndexMismatch);
        }
        let opened = request
            .witness
            .calculate_root(&request.record_before.hash());
        if opened != self.committed.liquidity_root {
            return Err(LendingError::StaleBorrowWitness);
        }

        // Custody must release before the root moves; a failed transfer
        // leaves the committed state untouched.
        token.transfer(self.address, request.borrower, request.amount)?;
        let record_after = request.record_before.with_borrow(request.amount);
        self.committed.liquidity_root = request.witness.calculate_root(&record_after.hash());
        self.events.emit(LendingEvent::Borrowed {
            token: request.token,
            account: request.borrower,
            amount: request.amount,
        });
        info!(
            borrower = ?request.borrower,
            token = ?request.token,
            amount = request.amount,
            "borrow paid out"
        );
        Ok(())
    }
}
