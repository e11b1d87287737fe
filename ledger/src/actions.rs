//! Append-only action log
//!
//! Dispatched actions are recorded in FIFO order under a running cursor
//! hash: each dispatch chains the action digest onto the previous cursor.
//! A consumer that remembers the cursor it last reduced up to can fetch
//! exactly the pending suffix, and recomputing the chain over that suffix
//! reproduces the log's current cursor.

use serde::{Deserialize, Serialize};

use arbor_merkle::{Hash, ZERO_HASH};

use crate::errors::{LedgerError, LedgerResult};

/// Digest of a dispatched action, chained into the log cursor.
pub trait ActionDigest {
    /// Canonical 32-byte digest of this action.
    fn digest(&self) -> Hash;
}

/// Cursor value of a log with no dispatched actions.
pub fn initial_cursor() -> Hash {
    ZERO_HASH
}

/// Advance a cursor by one action digest.
pub fn chain(cursor: &Hash, digest: &Hash) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"arbor_action_chain");
    hasher.update(cursor);
    hasher.update(digest);
    *hasher.finalize().as_bytes()
}

/// Append-only log of dispatched actions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionLog<A> {
    entries: Vec<A>,
    /// `cursors[i]` is the cursor after the first `i` entries.
    cursors: Vec<Hash>,
}

impl<A: ActionDigest + Clone> ActionLog<A> {
    /// Create an empty log.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursors: vec![initial_cursor()],
        }
    }

    /// Record a dispatched action and return the new cursor.
    pub fn dispatch(&mut self, action: A) -> Hash {
        let next = chain(self.cursor(), &action.digest());
        self.entries.push(action);
        self.cursors.push(next);
        next
    }

    /// The cursor after all dispatched actions.
    pub fn cursor(&self) -> &Hash {
        self.cursors.last().unwrap_or(&ZERO_HASH)
    }

    /// All actions dispatched after the given cursor, oldest first.
    pub fn actions_since(&self, from: &Hash) -> LedgerResult<Vec<A>> {
        let position = self
            .cursors
            .iter()
            .position(|c| c == from)
            .ok_or_else(|| LedgerError::UnknownActionCursor(hex::encode(from)))?;
        Ok(self.entries[position..].to_vec())
    }

    /// Total number of dispatched actions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether anything has been dispatched.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<A: ActionDigest + Clone> Default for ActionLog<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_merkle::u64_to_field;

    #[derive(Clone, Debug, PartialEq)]
    struct TestAction(u64);

    impl ActionDigest for TestAction {
        fn digest(&self) -> Hash {
            u64_to_field(self.0)
        }
    }

    #[test]
    fn test_actions_since_initial() {
        let mut log = ActionLog::new();
        log.dispatch(TestAction(1));
        log.dispatch(TestAction(2));

        let pending = log.actions_since(&initial_cursor()).unwrap();
        assert_eq!(pending, vec![TestAction(1), TestAction(2)]);
    }

    #[test]
    fn test_actions_since_intermediate_cursor() {
        let mut log = ActionLog::new();
        let after_first = log.dispatch(TestAction(1));
        log.dispatch(TestAction(2));
        log.dispatch(TestAction(3));

        let pending = log.actions_since(&after_first).unwrap();
        assert_eq!(pending, vec![TestAction(2), TestAction(3)]);
    }

    #[test]
    fn test_unknown_cursor_rejected() {
        let log: ActionLog<TestAction> = ActionLog::new();
        let result = log.actions_since(&u64_to_field(99));
        assert!(matches!(result, Err(LedgerError::UnknownActionCursor(_))));
    }

    #[test]
    fn test_replaying_chain_reproduces_cursor() {
        let mut log = ActionLog::new();
        log.dispatch(TestAction(1));
        log.dispatch(TestAction(2));

        let mut cursor = initial_cursor();
        for action in log.actions_since(&initial_cursor()).unwrap() {
            cursor = chain(&cursor, &action.digest());
        }
        assert_eq!(&cursor, log.cursor());
    }
}
