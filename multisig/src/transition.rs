//! Proposal state transitions
//!
//! An approval proof is a claim that one vote moves the proposal state from
//! `from` to `to`; a merge proof glues two adjacent claims into one. Both are
//! verified purely over hashes, so independently produced single-vote claims
//! from the same base compose in any adjacency-preserving order.

use serde::{Deserialize, Serialize};

use arbor_ledger::{PublicKey, Signature};
use arbor_merkle::MerkleWitness;

use crate::errors::{MultiSigError, MultiSigResult};
use crate::model::{vote_message_fields, ProposalState, SignerState};

/// A proposal state addressed by value; equality is hash equality.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ProgramState {
    pub state: ProposalState,
}

impl ProgramState {
    pub fn new(state: ProposalState) -> Self {
        Self { state }
    }

    /// Whether two program states commit to the same voting state.
    pub fn matches(&self, other: &ProgramState) -> bool {
        self.state.hash() == other.state.hash()
    }
}

/// A claimed step from one proposal state to another.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: ProgramState,
    pub to: ProgramState,
}

impl StateTransition {
    pub fn new(from: ProposalState, to: ProposalState) -> Self {
        Self {
            from: ProgramState::new(from),
            to: ProgramState::new(to),
        }
    }
}

/// Derive the proposal state after `signer` casts `vote`, using a witness for
/// the signer's leaf at the pre-vote signer root.
pub fn apply_vote(
    state: &ProposalState,
    signer: &PublicKey,
    signer_witness: &MerkleWitness,
    vote: bool,
) -> ProposalState {
    let new_root = signer_witness.calculate_root(&SignerState::unvoted(*signer).after_vote().hash());
    state.with_vote(new_root, vote)
}

/// Verify a single-vote transition.
///
/// The signature covers the proposal hash and the vote; the witness must
/// index the signer and prove their unvoted membership at the base signer
/// root; and the claimed target must equal the state derived from the base.
pub fn approve(
    transition: &StateTransition,
    signer: &PublicKey,
    signature: &Signature,
    vote: bool,
    signer_witness: &MerkleWitness,
) -> MultiSigResult<()> {
    let from = &transition.from.state;

    let message = vote_message_fields(&from.proposal, vote);
    if !signer.verify_fields(signature, &message) {
        return Err(MultiSigError::InvalidVoteSignature);
    }

    if signer_witness.calculate_index() != signer.tree_index() {
        return Err(MultiSigError::WitnessIndexMismatch);
    }
    let membership_root = signer_witness.calculate_root(&SignerState::unvoted(*signer).hash());
    if membership_root != from.signer_state_root {
        return Err(MultiSigError::SignerMembershipFailed);
    }

    let derived = apply_vote(from, signer, signer_witness, vote);
    if derived.hash() != transition.to.state.hash() {
        return Err(MultiSigError::StateMismatch);
    }
    Ok(())
}

/// Verify that two adjacent transitions compose into `transition`.
pub fn merge(
    transition: &StateTransition,
    left: &StateTransition,
    right: &StateTransition,
) -> MultiSigResult<()> {
    if !transition.from.matches(&left.from) {
        return Err(MultiSigError::MergeBaseMismatch);
    }
    if !left.to.matches(&right.from) {
        return Err(MultiSigError::MergeChainMismatch);
    }
    if !right.to.matches(&transition.to) {
        return Err(MultiSigError::MergeTargetMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{build_signer_tree, Proposal};
    use arbor_ledger::Keypair;
    use arbor_merkle::SparseMerkleTree;

    fn signers() -> Vec<Keypair> {
        (1u8..=3).map(|n| Keypair::from_seed([n; 32])).collect()
    }

    fn proposal() -> Proposal {
        Proposal {
            amount: 1_000,
            receiver: Keypair::from_seed([50u8; 32]).public(),
        }
    }

    fn vote_transition(
        tree: &mut SparseMerkleTree,
        from: &ProposalState,
        signer: &Keypair,
        vote: bool,
    ) -> (StateTransition, Signature, MerkleWitness) {
        let witness = tree.witness(signer.public().tree_index());
        let to = apply_vote(from, &signer.public(), &witness, vote);
        tree.set_leaf(
            signer.public().tree_index(),
            SignerState::unvoted(signer.public()).after_vote().hash(),
        );
        let signature = signer.sign_fields(&vote_message_fields(&from.proposal, vote));
        (StateTransition::new(*from, to), signature, witness)
    }

    #[test]
    fn test_approve_valid_vote() {
        let signers = signers();
        let mut tree = build_signer_tree(&[signers[0].public(), signers[1].public()]);
        let fresh = ProposalState::fresh(proposal(), tree.root());

        let (transition, signature, witness) =
            vote_transition(&mut tree, &fresh, &signers[0], true);
        approve(&transition, &signers[0].public(), &signature, true, &witness).unwrap();
        assert_eq!(transition.to.state.votes_for, 1);
        assert_eq!(transition.to.state.signer_state_root, tree.root());
    }

    #[test]
    fn test_approve_rejects_non_member() {
        let signers = signers();
        let mut tree = build_signer_tree(&[signers[0].public()]);
        let fresh = ProposalState::fresh(proposal(), tree.root());

        let outsider = Keypair::from_seed([99u8; 32]);
        let (transition, _, _) = vote_transition(&mut tree, &fresh, &signers[0], true);
        let signature = outsider.sign_fields(&vote_message_fields(&fresh.proposal, true));
        let witness = build_signer_tree(&[signers[0].public()])
            .witness(outsider.public().tree_index());

        let result = approve(&transition, &outsider.public(), &signature, true, &witness);
        assert!(matches!(result, Err(MultiSigError::SignerMembershipFailed)));
    }

    #[test]
    fn test_approve_rejects_double_vote() {
        let signers = signers();
        let mut tree = build_signer_tree(&[signers[0].public(), signers[1].public()]);
        let fresh = ProposalState::fresh(proposal(), tree.root());

        let (first, signature, witness) = vote_transition(&mut tree, &fresh, &signers[0], true);
        approve(&first, &signers[0].public(), &signature, true, &witness).unwrap();

        // Same signer again, now against the advanced root.
        let after = first.to.state;
        let stale_witness = tree.witness(signers[0].public().tree_index());
        let second = StateTransition::new(
            after,
            apply_vote(&after, &signers[0].public(), &stale_witness, true),
        );
        let result = approve(
            &second,
            &signers[0].public(),
            &signature,
            true,
            &stale_witness,
        );
        assert!(matches!(result, Err(MultiSigError::SignerMembershipFailed)));
    }

    #[test]
    fn test_approve_rejects_wrong_target() {
        let signers = signers();
        let mut tree = build_signer_tree(&[signers[0].public(), signers[1].public()]);
        let fresh = ProposalState::fresh(proposal(), tree.root());

        let (transition, signature, witness) =
            vote_transition(&mut tree, &fresh, &signers[0], true);
        // Claim a no vote while the signature and derivation say yes.
        let forged = StateTransition::new(
            transition.from.state,
            transition.from.state.with_vote(tree.root(), false),
        );
        let result = approve(&forged, &signers[0].public(), &signature, true, &witness);
        assert!(matches!(result, Err(MultiSigError::StateMismatch)));
    }

    #[test]
    fn test_merge_chains_adjacent_votes() {
        let signers = signers();
        let mut tree =
            build_signer_tree(&signers.iter().map(|k| k.public()).collect::<Vec<_>>());
        let fresh = ProposalState::fresh(proposal(), tree.root());

        let (first, _, _) = vote_transition(&mut tree, &fresh, &signers[0], true);
        let (second, _, _) = vote_transition(&mut tree, &first.to.state, &signers[1], false);

        let combined = StateTransition::new(fresh, second.to.state);
        merge(&combined, &first, &second).unwrap();
        assert_eq!(combined.to.state.votes_for, 1);
        assert_eq!(combined.to.state.votes_against, 1);
    }

    #[test]
    fn test_merge_rejects_non_adjacent_legs() {
        let signers = signers();
        let mut tree =
            build_signer_tree(&signers.iter().map(|k| k.public()).collect::<Vec<_>>());
        let fresh = ProposalState::fresh(proposal(), tree.root());

        let (first, _, _) = vote_transition(&mut tree, &fresh, &signers[0], true);
        let (second, _, _) = vote_transition(&mut tree, &first.to.state, &signers[1], true);
        let (third, _, _) = vote_transition(&mut tree, &second.to.state, &signers[2], true);

        let combined = StateTransition::new(fresh, third.to.state);
        let result = merge(&combined, &first, &third);
        assert!(matches!(result, Err(MultiSigError::MergeChainMismatch)));
    }

    #[test]
    fn test_merge_is_associative() {
        let signers = signers();
        let mut tree =
            build_signer_tree(&signers.iter().map(|k| k.public()).collect::<Vec<_>>());
        let fresh = ProposalState::fresh(proposal(), tree.root());

        let (a, _, _) = vote_transition(&mut tree, &fresh, &signers[0], true);
        let (b, _, _) = vote_transition(&mut tree, &a.to.state, &signers[1], true);
        let (c, _, _) = vote_transition(&mut tree, &b.to.state, &signers[2], false);

        // (a ∘ b) ∘ c
        let ab = StateTransition::new(a.from.state, b.to.state);
        merge(&ab, &a, &b).unwrap();
        let abc_left = StateTransition::new(a.from.state, c.to.state);
        merge(&abc_left, &ab, &c).unwrap();

        // a ∘ (b ∘ c)
        let bc = StateTransition::new(b.from.state, c.to.state);
        merge(&bc, &b, &c).unwrap();
        let abc_right = StateTransition::new(a.from.state, c.to.state);
        merge(&abc_right, &a, &bc).unwrap();

        assert!(abc_left.to.matches(&abc_right.to));
    }
}
