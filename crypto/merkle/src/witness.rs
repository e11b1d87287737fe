//! Merkle inclusion witnesses
//!
//! A witness carries the sibling hashes along one leaf-to-root path. It is
//! self-contained: given any candidate leaf value it recomputes the root, so
//! a single witness proves both the pre-state membership and the post-state
//! root of a one-leaf transition.

use serde::{Deserialize, Serialize};

use crate::hash::Hash;
use crate::tree::{node_hash, TreeIndex};

/// Inclusion witness for one leaf of a [`crate::SparseMerkleTree`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleWitness {
    /// Sibling hashes, leaf level first.
    pub siblings: Vec<Hash>,
    /// Path direction per level; true means the tracked node is the right child.
    pub path_bits: Vec<bool>,
}

impl MerkleWitness {
    /// The tree index this witness describes.
    pub fn calculate_index(&self) -> TreeIndex {
        TreeIndex::from_bits(&self.path_bits)
    }

    /// Recompute the root for a candidate leaf value.
    pub fn calculate_root(&self, leaf: &Hash) -> Hash {
        let mut current = *leaf;
        for (sibling, right_child) in self.siblings.iter().zip(&self.path_bits) {
            current = if *right_child {
                node_hash(sibling, &current)
            } else {
                node_hash(&current, sibling)
            };
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::u64_to_field;
    use crate::tree::{SparseMerkleTree, TreeIndex};

    #[test]
    fn test_index_recovery() {
        let tree = SparseMerkleTree::new();
        let key = TreeIndex::from_bytes([0x5a; 32]);
        let witness = tree.witness(key);
        assert_eq!(witness.calculate_index(), key);
    }

    #[test]
    fn test_wrong_leaf_gives_wrong_root() {
        let mut tree = SparseMerkleTree::new();
        let key = TreeIndex::from_bytes([3; 32]);
        tree.set_leaf(key, u64_to_field(9));

        let witness = tree.witness(key);
        assert_ne!(witness.calculate_root(&u64_to_field(8)), tree.root());
    }
}
