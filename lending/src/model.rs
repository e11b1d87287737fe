//! Lending value types
//!
//! Records and actions are immutable values: every state step builds a new
//! record rather than mutating one in place, so a witness captured against the
//! old record stays meaningful after the step.

use serde::{Deserialize, Serialize};

use arbor_ledger::{ActionDigest, PublicKey};
use arbor_merkle::{empty_root, hash_fields, u64_to_field, Hash, MerkleWitness, ZERO_HASH};

/// Numeric prefix of the borrow authorization message.
pub const BORROW_SIG_PREFIX: u64 = 1001;

/// The canonical field message a borrower signs to authorize a borrow.
pub fn borrow_message_fields(token: &PublicKey, amount: u64) -> [Hash; 3] {
    [
        u64_to_field(BORROW_SIG_PREFIX),
        token.to_field(),
        u64_to_field(amount),
    ]
}

/// One user's position in the global liquidity tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLiquidityRecord {
    /// Total amount borrowed across all tokens.
    pub borrowed: u64,
    /// Total liquidity ever provided across all tokens.
    pub total_liquidity: u64,
    /// Root of the user's per-token liquidity tree.
    pub liquidity_root: Hash,
}

impl UserLiquidityRecord {
    /// The record of a user who has never interacted with the pool.
    pub fn empty() -> Self {
        Self {
            borrowed: 0,
            total_liquidity: 0,
            liquidity_root: empty_root(),
        }
    }

    /// Leaf hash of this record.
    ///
    /// A record indistinguishable from "never seen" hashes to the all-zero
    /// leaf, so initializing a user does not move the global root.
    pub fn hash(&self) -> Hash {
        if self.borrowed == 0 && self.liquidity_root == empty_root() {
            return ZERO_HASH;
        }
        hash_fields(
            b"arbor_lending_user",
            &[
                u64_to_field(self.borrowed),
                u64_to_field(self.total_liquidity),
                self.liquidity_root,
            ],
        )
    }

    /// The record after providing `amount` liquidity under `new_token_root`.
    pub fn with_liquidity(&self, amount: u64, new_token_root: Hash) -> Self {
        Self {
            borrowed: self.borrowed,
            total_liquidity: self.total_liquidity + amount,
            liquidity_root: new_token_root,
        }
    }

    /// The record after borrowing `amount`.
    pub fn with_borrow(&self, amount: u64) -> Self {
        Self {
            borrowed: self.borrowed + amount,
            total_liquidity: self.total_liquidity,
            liquidity_root: self.liquidity_root,
        }
    }

    /// Liquidity still withdrawable against this record.
    pub fn remaining_liquidity(&self) -> u64 {
        self.total_liquidity.saturating_sub(self.borrowed)
    }
}

/// A dispatched provide-liquidity action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLiquidityAction {
    pub user: PublicKey,
    pub token: PublicKey,
    pub amount: u64,
}

impl UserLiquidityAction {
    /// The no-op action used to fill unused batch slots.
    pub fn padding() -> Self {
        Self {
            user: PublicKey::from_bytes([0u8; 32]),
            token: PublicKey::from_bytes([0u8; 32]),
            amount: 0,
        }
    }
}

impl ActionDigest for UserLiquidityAction {
    fn digest(&self) -> Hash {
        hash_fields(
            b"arbor_lending_action",
            &[
                self.user.to_field(),
                self.token.to_field(),
                u64_to_field(self.amount),
            ],
        )
    }
}

/// Witnesses and prior state for one action slot, captured before the
/// speculative mutation for that slot is applied.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LiquidityActionWitnesses {
    /// Witness for the user's leaf in the global liquidity tree.
    pub user_witness: MerkleWitness,
    /// Witness for the token's leaf in the user's liquidity tree.
    pub token_witness: MerkleWitness,
    /// User's borrowed total before the action.
    pub borrowed: u64,
    /// User's liquidity total before the action.
    pub total_liquidity: u64,
    /// Liquidity already provided for this token before the action.
    pub liquidity_so_far: u64,
}

/// Events emitted by the lending pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LendingEvent {
    LiquidityAdded {
        token: PublicKey,
        account: PublicKey,
        amount: u64,
    },
    Borrowed {
        token: PublicKey,
        account: PublicKey,
        amount: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_ledger::Keypair;

    #[test]
    fn test_empty_record_hashes_to_zero_leaf() {
        assert_eq!(UserLiquidityRecord::empty().hash(), ZERO_HASH);
    }

    #[test]
    fn test_funded_record_leaves_sentinel() {
        let record = UserLiquidityRecord::empty().with_liquidity(100, u64_to_field(1));
        assert_ne!(record.hash(), ZERO_HASH);
    }

    #[test]
    fn test_total_liquidity_is_committed() {
        let root = u64_to_field(1);
        let a = UserLiquidityRecord {
            borrowed: 5,
            total_liquidity: 100,
            liquidity_root: root,
        };
        let b = UserLiquidityRecord {
            borrowed: 5,
            total_liquidity: 200,
            liquidity_root: root,
        };
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_remaining_liquidity() {
        let record = UserLiquidityRecord {
            borrowed: 30,
            total_liquidity: 100,
            liquidity_root: u64_to_field(1),
        };
        assert_eq!(record.remaining_liquidity(), 70);
    }

    #[test]
    fn test_action_digest_binds_all_fields() {
        let user = Keypair::from_seed([1u8; 32]).public();
        let token = Keypair::from_seed([2u8; 32]).public();
        let a = UserLiquidityAction { user, token, amount: 10 };
        let b = UserLiquidityAction { user, token, amount: 11 };
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn test_borrow_message_is_amount_specific() {
        let token = Keypair::from_seed([2u8; 32]).public();
        assert_ne!(
            borrow_message_fields(&token, 10),
            borrow_message_fields(&token, 11)
        );
    }
}
