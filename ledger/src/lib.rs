//! Arbor Ledger Collaborators
//!
//! In-process, deterministic implementations of the chain services the core
//! protocol consumes: the signature scheme, the append-only action log, typed
//! event logs, custodial token balances and the native account book.
//!
//! These components carry no consensus or networking of their own; they are
//! the seam between the off-chain witness-tracking core and whatever ledger
//! actually commits the state roots.

pub mod accounts;
pub mod actions;
pub mod errors;
pub mod events;
pub mod keys;
pub mod token;

pub use accounts::AccountBook;
pub use actions::{ActionDigest, ActionLog};
pub use errors::LedgerError;
pub use events::EventLog;
pub use keys::{Keypair, PublicKey, Signature};
pub use token::CustodialToken;
