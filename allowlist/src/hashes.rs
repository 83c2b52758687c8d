use crate::bytes::{Bytes32, concat_sorted};
use sha3::{Digest, Keccak256};

#[must_use]
pub fn keccak256(data: &[u8]) -> Bytes32 {
    Keccak256::digest(data).into()
}

/// Parent of two nodes. Children are sorted before hashing, matching
/// OpenZeppelin's `MerkleProof.verify`, so the proof carries no left/right flags.
#[must_use]
pub fn hash_pair(a: &Bytes32, b: &Bytes32) -> Bytes32 {
    keccak256(&concat_sorted(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytes::bytes32_to_hex;

    #[test]
    fn test_keccak256_known_value() {
        let hash = keccak256(b"hello");
        assert_eq!(
            bytes32_to_hex(&hash),
            "0x1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn test_keccak256_empty() {
        let hash = keccak256(b"");
        assert_eq!(
            bytes32_to_hex(&hash),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_hash_pair_commutative() {
        let a = keccak256(b"a");
        let b = keccak256(b"b");
        assert_eq!(hash_pair(&a, &b), hash_pair(&b, &a));
    }

    #[test]
    fn test_hash_pair_sorted_concat() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        let mut concatenated = Vec::with_capacity(64);
        concatenated.extend_from_slice(&a);
        concatenated.extend_from_slice(&b);
        assert_eq!(hash_pair(&b, &a), keccak256(&concatenated));
    }
}
