//! Sparse Merkle tree over 255-bit keys
//!
//! Nodes are stored sparsely per level; absent subtrees fall back to the
//! precomputed empty-subtree hash for their depth. Leaf values are raw
//! 32-byte field encodings, so the empty leaf is the all-zero field and an
//! untouched tree hashes to [`empty_root`].

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::hash::{hash_fields, Hash, ZERO_HASH};
use crate::witness::MerkleWitness;

/// Number of key bits / levels below the root.
pub const TREE_HEIGHT: usize = 255;

/// A 255-bit tree index, little-endian with the top bit always clear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeIndex([u8; 32]);

impl TreeIndex {
    /// Build an index from raw bytes, clearing the unused top bit.
    pub fn from_bytes(mut bytes: [u8; 32]) -> Self {
        bytes[31] &= 0x7f;
        Self(bytes)
    }

    /// Reassemble an index from its path bits, least significant first.
    pub fn from_bits(bits: &[bool]) -> Self {
        let mut bytes = [0u8; 32];
        for (i, bit) in bits.iter().enumerate().take(TREE_HEIGHT) {
            if *bit {
                bytes[i / 8] |= 1 << (i % 8);
            }
        }
        Self(bytes)
    }

    /// Raw little-endian bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The bit selecting left (false) or right (true) at the given depth.
    pub fn bit(&self, depth: usize) -> bool {
        (self.0[depth / 8] >> (depth % 8)) & 1 == 1
    }
}

impl From<[u8; 32]> for TreeIndex {
    fn from(bytes: [u8; 32]) -> Self {
        Self::from_bytes(bytes)
    }
}

/// Hash an internal node from its children.
pub fn node_hash(left: &Hash, right: &Hash) -> Hash {
    hash_fields(b"arbor_smt_node", &[*left, *right])
}

/// Per-depth empty-subtree hashes, `[0]` being the empty leaf.
fn empty_hashes() -> &'static [Hash; TREE_HEIGHT + 1] {
    static EMPTY: OnceLock<[Hash; TREE_HEIGHT + 1]> = OnceLock::new();
    EMPTY.get_or_init(|| {
        let mut hashes = [ZERO_HASH; TREE_HEIGHT + 1];
        for level in 0..TREE_HEIGHT {
            hashes[level + 1] = node_hash(&hashes[level], &hashes[level]);
        }
        hashes
    })
}

/// Root of a tree with no leaves set.
pub fn empty_root() -> Hash {
    empty_hashes()[TREE_HEIGHT]
}

fn shr1(bytes: &mut [u8; 32]) {
    for i in 0..31 {
        bytes[i] = (bytes[i] >> 1) | (bytes[i + 1] << 7);
    }
    bytes[31] >>= 1;
}

/// Sparse Merkle tree of fixed height [`TREE_HEIGHT`].
#[derive(Clone, Debug)]
pub struct SparseMerkleTree {
    /// Filled nodes per level; level 0 holds leaves, the last level the root.
    levels: Vec<HashMap<[u8; 32], Hash>>,
}

impl SparseMerkleTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            levels: vec![HashMap::new(); TREE_HEIGHT + 1],
        }
    }

    fn node_at(&self, level: usize, index: &[u8; 32]) -> Hash {
        self.levels[level]
            .get(index)
            .copied()
            .unwrap_or(empty_hashes()[level])
    }

    /// Current root hash.
    pub fn root(&self) -> Hash {
        self.node_at(TREE_HEIGHT, &[0u8; 32])
    }

    /// Read a leaf value, the all-zero field if untouched.
    pub fn leaf(&self, key: TreeIndex) -> Hash {
        self.node_at(0, key.as_bytes())
    }

    /// Write a leaf and recompute the path up to the root.
    pub fn set_leaf(&mut self, key: TreeIndex, value: Hash) {
        let mut index = *key.as_bytes();
        self.levels[0].insert(index, value);

        let mut current = value;
        for level in 0..TREE_HEIGHT {
            let right_child = index[0] & 1 == 1;
            let mut sibling_index = index;
            sibling_index[0] ^= 1;
            let sibling = self.node_at(level, &sibling_index);

            current = if right_child {
                node_hash(&sibling, &current)
            } else {
                node_hash(&current, &sibling)
            };

            shr1(&mut index);
            self.levels[level + 1].insert(index, current);
        }
    }

    /// Produce an inclusion witness for the given key at the current root.
    pub fn witness(&self, key: TreeIndex) -> MerkleWitness {
        let mut index = *key.as_bytes();
        let mut siblings = Vec::with_capacity(TREE_HEIGHT);
        let mut path_bits = Vec::with_capacity(TREE_HEIGHT);

        for level in 0..TREE_HEIGHT {
            path_bits.push(index[0] & 1 == 1);
            let mut sibling_index = index;
            sibling_index[0] ^= 1;
            siblings.push(self.node_at(level, &sibling_index));
            shr1(&mut index);
        }

        MerkleWitness { siblings, path_bits }
    }
}

impl Default for SparseMerkleTree {
    fn default() -> Self {
        Self::new()
    }
}
