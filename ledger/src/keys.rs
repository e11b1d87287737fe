//! Keys and the canonical field-message signature scheme
//!
//! Every protocol message that gets signed is a sequence of 32-byte fields
//! (numeric prefixes, amounts, key encodings, hashes). The scheme signs the
//! domain-prefixed concatenation of those fields with ed25519, and a public
//! key's 32-byte encoding doubles as its 255-bit Merkle tree index.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use arbor_merkle::{Hash, TreeIndex};

const SIGNATURE_DOMAIN: &[u8] = b"arbor_sig_v1";

/// A public key, stored as its 32-byte ed25519 encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Wrap a raw 32-byte key encoding.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The key as a 32-byte field for hashing and signing.
    pub fn to_field(&self) -> Hash {
        self.0
    }

    /// The 255-bit Merkle index this key addresses.
    pub fn tree_index(&self) -> TreeIndex {
        TreeIndex::from_bytes(self.0)
    }

    /// Verify a signature over a canonical field message.
    pub fn verify_fields(&self, signature: &Signature, fields: &[Hash]) -> bool {
        let Ok(verifying) = VerifyingKey::from_bytes(&self.0) else {
            return false;
        };
        verifying
            .verify(&message_bytes(fields), &signature.0)
            .is_ok()
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", hex::encode(&self.0[..8]))
    }
}

/// An ed25519 signature over a canonical field message.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(ed25519_dalek::Signature);

impl Signature {
    /// Raw 64-byte signature encoding.
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.to_bytes()
    }

    /// Decode from raw bytes.
    pub fn from_bytes(bytes: &[u8; 64]) -> Self {
        Self(ed25519_dalek::Signature::from_bytes(bytes))
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", hex::encode(&self.to_bytes()[..8]))
    }
}

/// A signing keypair.
pub struct Keypair {
    signing: SigningKey,
}

impl Keypair {
    /// Generate a fresh keypair from the OS rng.
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        Self::from_seed(seed)
    }

    /// Deterministic keypair from a seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing: SigningKey::from_bytes(&seed),
        }
    }

    /// The corresponding public key.
    pub fn public(&self) -> PublicKey {
        PublicKey(self.signing.verifying_key().to_bytes())
    }

    /// Sign a canonical field message.
    pub fn sign_fields(&self, fields: &[Hash]) -> Signature {
        Signature(self.signing.sign(&message_bytes(fields)))
    }
}

fn message_bytes(fields: &[Hash]) -> Vec<u8> {
    let mut message = Vec::with_capacity(SIGNATURE_DOMAIN.len() + 32 * fields.len());
    message.extend_from_slice(SIGNATURE_DOMAIN);
    for field in fields {
        message.extend_from_slice(field);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_merkle::u64_to_field;

    #[test]
    fn test_sign_verify_roundtrip() {
        let keypair = Keypair::from_seed([1u8; 32]);
        let fields = [u64_to_field(1001), u64_to_field(5000)];

        let signature = keypair.sign_fields(&fields);
        assert!(keypair.public().verify_fields(&signature, &fields));
    }

    #[test]
    fn test_tampered_fields_rejected() {
        let keypair = Keypair::from_seed([1u8; 32]);
        let signature = keypair.sign_fields(&[u64_to_field(5000)]);
        assert!(!keypair
            .public()
            .verify_fields(&signature, &[u64_to_field(5001)]));
    }

    #[test]
    fn test_wrong_signer_rejected() {
        let alice = Keypair::from_seed([1u8; 32]);
        let bob = Keypair::from_seed([2u8; 32]);
        let fields = [u64_to_field(7)];

        let signature = alice.sign_fields(&fields);
        assert!(!bob.public().verify_fields(&signature, &fields));
    }

    #[test]
    fn test_tree_index_is_deterministic() {
        let keypair = Keypair::from_seed([3u8; 32]);
        assert_eq!(
            keypair.public().tree_index(),
            keypair.public().tree_index()
        );
    }
}
