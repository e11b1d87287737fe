//! Sparse Merkle Tree Primitive
//!
//! Fixed-height (255) sparse Merkle trees used for every state commitment in
//! Arbor: the global user-liquidity tree, the per-user token-liquidity trees
//! and the multisig signer-eligibility tree.
//!
//! # Key Properties
//! - **255-bit keys**: tree indices are derived from a public key's 32-byte
//!   encoding with the top bit cleared, so every key addresses one leaf
//! - **Zero-default leaves**: an untouched slot holds the all-zero leaf, which
//!   doubles as the canonical "absent" sentinel for record hashes
//! - **Self-verifying witnesses**: a witness recomputes the root for any
//!   candidate leaf value, enabling old-leaf/new-leaf transition proofs
//!   without re-querying the tree

pub mod hash;
pub mod tree;
pub mod witness;

pub use hash::{field_to_u64, hash_fields, u64_to_field, Hash, ZERO_HASH};
pub use tree::{empty_root, SparseMerkleTree, TreeIndex, TREE_HEIGHT};
pub use witness::MerkleWitness;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untouched_tree_has_empty_root() {
        let tree = SparseMerkleTree::new();
        assert_eq!(tree.root(), empty_root());
    }

    #[test]
    fn test_zero_leaf_keeps_empty_root() {
        let mut tree = SparseMerkleTree::new();
        tree.set_leaf([7u8; 32].into(), ZERO_HASH);
        assert_eq!(tree.root(), empty_root());
    }
}
