//! Off-chain witness and state-tree service
//!
//! Maintains the off-chain mirror of the committed liquidity state: the
//! global user tree, one token tree per user and the raw per-user totals.
//! Mutations are two-phase. `prepare_*` captures witnesses against the
//! pre-state, applies the mutation speculatively and returns an undo token;
//! the caller either commits the token after the on-chain step verifies or
//! aborts it to roll the mirror back.

use std::collections::HashMap;

use tracing::{debug, warn};

use arbor_ledger::PublicKey;
use arbor_merkle::{field_to_u64, u64_to_field, Hash, MerkleWitness, SparseMerkleTree};

use crate::errors::{LendingError, LendingResult};
use crate::model::{LiquidityActionWitnesses, UserLiquidityAction, UserLiquidityRecord};

/// Result of looking up a user in the mirror.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserLookup {
    /// The user has a liquidity record.
    Found(UserLiquidityRecord),
    /// The user has never been initialized; their leaf is the zero sentinel.
    Uninitialized,
}

/// Whether a prepared slot carries a real dispatched action or batch padding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotKind {
    Real,
    Padding,
}

#[derive(Clone, Copy, Debug, Default)]
struct RawTotals {
    borrowed: u64,
    total_liquidity: u64,
}

/// Undo token for one speculatively applied liquidity action.
#[derive(Debug)]
pub struct ActionUndo {
    user: PublicKey,
    token: PublicKey,
    mutated: bool,
    user_was_initialized: bool,
    prev_liquidity_so_far: u64,
    prev_total_liquidity: u64,
    prev_user_leaf: Hash,
}

impl ActionUndo {
    /// Whether this action created the user's record rather than extending
    /// an existing one.
    pub fn created_user(&self) -> bool {
        self.mutated && !self.user_was_initialized
    }
}

/// Undo token for one speculatively applied borrow.
#[derive(Debug)]
pub struct BorrowUndo {
    user: PublicKey,
    amount: u64,
    prev_user_leaf: Hash,
}

/// The off-chain liquidity state mirror.
#[derive(Clone, Debug, Default)]
pub struct WitnessService {
    user_tree: SparseMerkleTree,
    token_trees: HashMap<PublicKey, SparseMerkleTree>,
    totals: HashMap<PublicKey, RawTotals>,
}

impl WitnessService {
    /// Create an empty mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Root of the mirrored global liquidity tree.
    pub fn liquidity_root(&self) -> Hash {
        self.user_tree.root()
    }

    /// Initialize a user with an empty record. Idempotent; the zero-leaf
    /// sentinel means the global root does not move.
    pub fn init_user(&mut self, user: PublicKey) {
        self.token_trees.entry(user).or_default();
        self.totals.entry(user).or_default();
    }

    fn token_root(&self, user: &PublicKey) -> Hash {
        self.token_trees
            .get(user)
            .map(SparseMerkleTree::root)
            .unwrap_or_else(arbor_merkle::empty_root)
    }

    /// Look up a user's current record.
    pub fn lookup_user(&self, user: &PublicKey) -> UserLookup {
        match self.totals.get(user) {
            Some(totals) => UserLookup::Found(UserLiquidityRecord {
                borrowed: totals.borrowed,
                total_liquidity: totals.total_liquidity,
                liquidity_root: self.token_root(user),
            }),
            None => UserLookup::Uninitialized,
        }
    }

    /// Capture witnesses for one action slot and speculatively apply it.
    ///
    /// Witnesses reflect the state before this call. A zero-amount action
    /// (every padding slot, and degenerate real dispatches) leaves the mirror
    /// untouched; its undo token is a no-op.
    pub fn prepare_action(
        &mut self,
        action: &UserLiquidityAction,
        kind: SlotKind,
    ) -> (LiquidityActionWitnesses, ActionUndo) {
        let user_index = action.user.tree_index();
        let token_index = action.token.tree_index();

        let user_was_initialized = self.totals.contains_key(&action.user);
        let totals = self.totals.get(&action.user).copied().unwrap_or_default();
        let token_witness = match self.token_trees.get(&action.user) {
            Some(tree) => tree.witness(token_index),
            None => SparseMerkleTree::new().witness(token_index),
        };
        let liquidity_so_far = match self.token_trees.get(&action.user) {
            Some(tree) => field_to_u64(&tree.leaf(token_index)),
            None => 0,
        };

        let witnesses = LiquidityActionWitnesses {
            user_witness: self.user_tree.witness(user_index),
            token_witness,
            borrowed: totals.borrowed,
            total_liquidity: totals.total_liquidity,
            liquidity_so_far,
        };

        let mutated = action.amount > 0;
        if kind == SlotKind::Real && !user_was_initialized {
            warn!(user = ?action.user, "real action from an uninitialized user");
        }
        let prev_user_leaf = self.user_tree.leaf(user_index);
        if mutated {
            let token_tree = self.token_trees.entry(action.user).or_default();
            token_tree.set_leaf(token_index, u64_to_field(liquidity_so_far + action.amount));
            let new_token_root = token_tree.root();

            let entry = self.totals.entry(action.user).or_default();
            entry.total_liquidity = totals.total_liquidity + action.amount;

            let new_leaf = UserLiquidityRecord {
                borrowed: totals.borrowed,
                total_liquidity: totals.total_liquidity + action.amount,
                liquidity_root: new_token_root,
            }
            .hash();
            self.user_tree.set_leaf(user_index, new_leaf);

            debug!(
                user = ?action.user,
                token = ?action.token,
                amount = action.amount,
                kind = ?kind,
                "applied speculative liquidity action"
            );
        }

        let undo = ActionUndo {
            user: action.user,
            token: action.token,
            mutated,
            user_was_initialized,
            prev_liquidity_so_far: liquidity_so_far,
            prev_total_liquidity: totals.total_liquidity,
            prev_user_leaf,
        };
        (witnesses, undo)
    }

    /// Discard an undo token, making its speculative mutation permanent.
    pub fn commit(&mut self, undo: ActionUndo) {
        drop(undo);
    }

    /// Make a batch of speculative mutations permanent.
    pub fn commit_all(&mut self, undos: Vec<ActionUndo>) {
        undos.into_iter().for_each(|undo| self.commit(undo));
    }

    /// Roll back one speculative action.
    pub fn abort(&mut self, undo: ActionUndo) {
        if !undo.mutated {
            return;
        }
        let user_index = undo.user.tree_index();
        if undo.user_was_initialized {
            if let Some(token_tree) = self.token_trees.get_mut(&undo.user) {
                token_tree.set_leaf(
                    undo.token.tree_index(),
                    u64_to_field(undo.prev_liquidity_so_far),
                );
            }
            if let Some(entry) = self.totals.get_mut(&undo.user) {
                entry.total_liquidity = undo.prev_total_liquidity;
            }
        } else {
            self.token_trees.remove(&undo.user);
            self.totals.remove(&undo.user);
        }
        self.user_tree.set_leaf(user_index, undo.prev_user_leaf);
        debug!(user = ?undo.user, token = ?undo.token, "aborted speculative liquidity action");
    }

    /// Roll back a batch of speculative actions, newest first.
    pub fn abort_all(&mut self, undos: Vec<ActionUndo>) {
        undos.into_iter().rev().for_each(|undo| self.abort(undo));
    }

    /// Capture a borrow witness against the pre-state and speculatively
    /// record the borrow. Returns the witness, the record it opens and an
    /// undo token.
    pub fn prepare_borrow(
        &mut self,
        user: &PublicKey,
        amount: u64,
    ) -> LendingResult<(MerkleWitness, UserLiquidityRecord, BorrowUndo)> {
        let totals = self
            .totals
            .get(user)
            .copied()
            .ok_or_else(|| LendingError::UninitializedUser(format!("{user:?}")))?;
        let user_index = user.tree_index();

        let record_before = UserLiquidityRecord {
            borrowed: totals.borrowed,
            total_liquidity: totals.total_liquidity,
            liquidity_root: self.token_root(user),
        };
        let witness = self.user_tree.witness(user_index);
        let prev_user_leaf = self.user_tree.leaf(user_index);

        if let Some(entry) = self.totals.get_mut(user) {
            entry.borrowed = totals.borrowed + amount;
        }
        self.user_tree
            .set_leaf(user_index, record_before.with_borrow(amount).hash());
        debug!(user = ?user, amount, "applied speculative borrow");

        let undo = BorrowUndo {
            user: *user,
            amount,
            prev_user_leaf,
        };
        Ok((witness, record_before, undo))
    }

    /// Make a speculative borrow permanent.
    pub fn commit_borrow(&mut self, undo: BorrowUndo) {
        drop(undo);
    }

    /// Roll back a speculative borrow.
    pub fn abort_borrow(&mut self, undo: BorrowUndo) {
        if let Some(entry) = self.totals.get_mut(&undo.user) {
            entry.borrowed -= undo.amount;
        }
        self.user_tree
            .set_leaf(undo.user.tree_index(), undo.prev_user_leaf);
        debug!(user = ?undo.user, amount = undo.amount, "aborted speculative borrow");
    }
}
