//! Domain-tagged hashing and field encoding
//!
//! All commitments in Arbor hash 32-byte field encodings through blake3 with
//! an ASCII domain prefix, keeping leaf, node and record hashes in disjoint
//! domains.

/// A 32-byte hash / field encoding.
pub type Hash = [u8; 32];

/// The all-zero hash: empty leaf value and canonical "absent" sentinel.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Encode a `u64` as a 32-byte field (little-endian, high bytes zero).
pub fn u64_to_field(value: u64) -> Hash {
    let mut field = [0u8; 32];
    field[..8].copy_from_slice(&value.to_le_bytes());
    field
}

/// Decode the `u64` carried in the low 8 bytes of a field encoding.
pub fn field_to_u64(field: &Hash) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&field[..8]);
    u64::from_le_bytes(bytes)
}

/// Hash a sequence of 32-byte fields under a domain tag.
pub fn hash_fields(domain: &[u8], fields: &[Hash]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(domain);
    for field in fields {
        hasher.update(field);
    }
    *hasher.finalize().as_bytes()
}

/// Hex rendering for diagnostics.
pub fn to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u64_field_encoding() {
        let field = u64_to_field(0x0102_0304);
        assert_eq!(field[0], 0x04);
        assert_eq!(field[3], 0x01);
        assert_eq!(&field[8..], &[0u8; 24]);
    }

    #[test]
    fn test_u64_field_roundtrip() {
        assert_eq!(field_to_u64(&u64_to_field(u64::MAX)), u64::MAX);
        assert_eq!(field_to_u64(&u64_to_field(0)), 0);
    }

    #[test]
    fn test_hash_fields_deterministic() {
        let a = hash_fields(b"arbor_test", &[u64_to_field(1), u64_to_field(2)]);
        let b = hash_fields(b"arbor_test", &[u64_to_field(1), u64_to_field(2)]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_fields_domain_separated() {
        let fields = [u64_to_field(1)];
        let a = hash_fields(b"arbor_domain_a", &fields);
        let b = hash_fields(b"arbor_domain_b", &fields);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_fields_order_matters() {
        let a = hash_fields(b"arbor_test", &[u64_to_field(1), u64_to_field(2)]);
        let b = hash_fields(b"arbor_test", &[u64_to_field(2), u64_to_field(1)]);
        assert_ne!(a, b);
    }
}
