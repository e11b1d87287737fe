//! Multisig value types
//!
//! Proposals, signer states and proposal states are immutable values with
//! canonical hashes under distinct domain tags. A vote produces a new
//! `ProposalState` via [`ProposalState::with_vote`] rather than mutating the
//! old one, so both ends of a transition stay addressable by hash.

use serde::{Deserialize, Serialize};

use arbor_ledger::PublicKey;
use arbor_merkle::{hash_fields, u64_to_field, Hash, SparseMerkleTree};

/// A payout proposal put to the signers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub amount: u64,
    pub receiver: PublicKey,
}

impl Proposal {
    /// Canonical hash of this proposal; the message signers vote over.
    pub fn hash(&self) -> Hash {
        hash_fields(
            b"arbor_multisig_proposal",
            &[u64_to_field(self.amount), self.receiver.to_field()],
        )
    }
}

/// One signer's leaf in the signer-eligibility tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerState {
    pub pubkey: PublicKey,
    pub voted: bool,
}

impl SignerState {
    /// An eligible signer who has not voted on the current proposal.
    pub fn unvoted(pubkey: PublicKey) -> Self {
        Self {
            pubkey,
            voted: false,
        }
    }

    /// This signer after casting their vote.
    pub fn after_vote(&self) -> Self {
        Self {
            pubkey: self.pubkey,
            voted: true,
        }
    }

    /// Leaf hash of this signer state.
    pub fn hash(&self) -> Hash {
        hash_fields(
            b"arbor_multisig_signer",
            &[self.pubkey.to_field(), u64_to_field(u64::from(self.voted))],
        )
    }
}

/// Voting state of one proposal round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalState {
    pub proposal: Proposal,
    pub votes_for: u64,
    pub votes_against: u64,
    /// Root of the signer tree, advanced as signers are marked voted.
    pub signer_state_root: Hash,
}

impl ProposalState {
    /// A fresh round for a proposal over the given signer tree.
    pub fn fresh(proposal: Proposal, signer_state_root: Hash) -> Self {
        Self {
            proposal,
            votes_for: 0,
            votes_against: 0,
            signer_state_root,
        }
    }

    /// Whether this state could open a new round.
    pub fn can_be_new(&self) -> bool {
        self.votes_for == 0 && self.votes_against == 0
    }

    /// The state after one vote, under the signer root that marks the voter.
    pub fn with_vote(&self, new_signer_root: Hash, vote: bool) -> Self {
        Self {
            proposal: self.proposal,
            votes_for: self.votes_for + u64::from(vote),
            votes_against: self.votes_against + u64::from(!vote),
            signer_state_root: new_signer_root,
        }
    }

    /// Canonical hash of this voting state.
    pub fn hash(&self) -> Hash {
        hash_fields(
            b"arbor_multisig_state",
            &[
                self.proposal.hash(),
                u64_to_field(self.votes_for),
                u64_to_field(self.votes_against),
                self.signer_state_root,
            ],
        )
    }
}

/// The canonical field message a signer signs to cast a vote.
pub fn vote_message_fields(proposal: &Proposal, vote: bool) -> [Hash; 2] {
    [proposal.hash(), u64_to_field(u64::from(vote))]
}

/// Build the signer-eligibility tree for a signer set, everyone unvoted.
pub fn build_signer_tree(signers: &[PublicKey]) -> SparseMerkleTree {
    let mut tree = SparseMerkleTree::new();
    for signer in signers {
        tree.set_leaf(signer.tree_index(), SignerState::unvoted(*signer).hash());
    }
    tree
}
