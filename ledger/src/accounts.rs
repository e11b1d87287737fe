//! Native account book
//!
//! Tracks native balances and whether an address has ever been funded. The
//! first credit to a fresh address costs the account-creation fee; the
//! multisig payout path charges that fee against the paid amount, mirroring
//! the chain's funding rule.

use std::collections::HashMap;

use crate::keys::PublicKey;

/// Default account-creation fee, in native units.
pub const DEFAULT_ACCOUNT_CREATION_FEE: u64 = 1_000_000_000;

/// Native balances plus the new-account rule.
#[derive(Clone, Debug)]
pub struct AccountBook {
    balances: HashMap<PublicKey, u64>,
    creation_fee: u64,
}

impl AccountBook {
    /// Create an empty book with the default creation fee.
    pub fn new() -> Self {
        Self::with_creation_fee(DEFAULT_ACCOUNT_CREATION_FEE)
    }

    /// Create an empty book with a custom creation fee.
    pub fn with_creation_fee(creation_fee: u64) -> Self {
        Self {
            balances: HashMap::new(),
            creation_fee,
        }
    }

    /// Fee charged when a fresh address is first funded.
    pub fn creation_fee(&self) -> u64 {
        self.creation_fee
    }

    /// Whether the address has never been funded.
    pub fn is_new(&self, address: &PublicKey) -> bool {
        !self.balances.contains_key(address)
    }

    /// Balance of an address, zero if never funded.
    pub fn balance_of(&self, address: &PublicKey) -> u64 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    /// Credit an address, creating the account if needed.
    pub fn credit(&mut self, address: PublicKey, amount: u64) {
        *self.balances.entry(address).or_insert(0) += amount;
    }
}

impl Default for AccountBook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Keypair;

    #[test]
    fn test_fresh_address_is_new() {
        let book = AccountBook::new();
        let addr = Keypair::from_seed([1u8; 32]).public();
        assert!(book.is_new(&addr));
        assert_eq!(book.balance_of(&addr), 0);
    }

    #[test]
    fn test_credit_marks_account_known() {
        let mut book = AccountBook::new();
        let addr = Keypair::from_seed([1u8; 32]).public();

        book.credit(addr, 500);
        assert!(!book.is_new(&addr));
        assert_eq!(book.balance_of(&addr), 500);

        book.credit(addr, 250);
        assert_eq!(book.balance_of(&addr), 750);
    }
}
