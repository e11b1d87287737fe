//! Custodial token balances
//!
//! Minimal balance bookkeeping for a custodial token: the deployer receives
//! the initial mint, and transfers move amounts between addresses under a
//! balance check. The lending pool uses this as its custody primitive; the
//! richer token semantics (permissions, approvals, symbols on-chain) live
//! outside the core.

use std::collections::HashMap;

use crate::errors::{LedgerError, LedgerResult};
use crate::keys::PublicKey;

/// Tokens minted to the deployer at creation.
pub const INITIAL_MINT: u64 = 1_000_000_000;

/// A transfer recorded by the token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenTransfer {
    pub sender: Option<PublicKey>,
    pub receiver: PublicKey,
    pub amount: u64,
}

/// A custodial token with per-address balances.
#[derive(Clone, Debug)]
pub struct CustodialToken {
    address: PublicKey,
    symbol: String,
    balances: HashMap<PublicKey, u64>,
    total_in_circulation: u64,
    transfers: Vec<TokenTransfer>,
}

impl CustodialToken {
    /// Deploy a token at an address, minting the initial supply to the deployer.
    pub fn deploy(address: PublicKey, symbol: impl Into<String>, deployer: PublicKey) -> Self {
        let mut balances = HashMap::new();
        balances.insert(deployer, INITIAL_MINT);
        Self {
            address,
            symbol: symbol.into(),
            balances,
            total_in_circulation: INITIAL_MINT,
            transfers: vec![TokenTransfer {
                sender: None,
                receiver: deployer,
                amount: INITIAL_MINT,
            }],
        }
    }

    /// Address the token is deployed at.
    pub fn address(&self) -> PublicKey {
        self.address
    }

    /// Token symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Balance of an address, zero if never credited.
    pub fn balance_of(&self, address: &PublicKey) -> u64 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    /// Total minted supply.
    pub fn total_in_circulation(&self) -> u64 {
        self.total_in_circulation
    }

    /// Move tokens between two addresses.
    pub fn transfer(
        &mut self,
        sender: PublicKey,
        receiver: PublicKey,
        amount: u64,
    ) -> LedgerResult<()> {
        let available = self.balance_of(&sender);
        if available < amount {
            return Err(LedgerError::InsufficientTokenBalance {
                required: amount,
                available,
            });
        }
        self.balances.insert(sender, available - amount);
        *self.balances.entry(receiver).or_insert(0) += amount;
        self.transfers.push(TokenTransfer {
            sender: Some(sender),
            receiver,
            amount,
        });
        Ok(())
    }

    /// All recorded transfers, the initial mint first.
    pub fn transfers(&self) -> &[TokenTransfer] {
        &self.transfers
    }
}
