use crate::error::{AllowlistError, Result};
use alloy_primitives::B256;
use std::cmp::Ordering;

pub type Bytes32 = [u8; 32];
pub type HexString = String;

/// Conversion into a 32-byte tree node.
pub trait ToBytes32 {
    fn to_bytes32(&self) -> Result<Bytes32>;
}

impl ToBytes32 for [u8; 32] {
    fn to_bytes32(&self) -> Result<Bytes32> {
        Ok(*self)
    }
}

impl ToBytes32 for &[u8] {
    fn to_bytes32(&self) -> Result<Bytes32> {
        Bytes32::try_from(*self).map_err(|_| AllowlistError::InvalidNodeLength)
    }
}

impl ToBytes32 for &str {
    fn to_bytes32(&self) -> Result<Bytes32> {
        hex_to_bytes32(self)
    }
}

impl ToBytes32 for String {
    fn to_bytes32(&self) -> Result<Bytes32> {
        hex_to_bytes32(self)
    }
}

impl ToBytes32 for B256 {
    fn to_bytes32(&self) -> Result<Bytes32> {
        Ok(self.0)
    }
}

/// Parses a 32-byte hex string, `0x` prefix optional.
pub fn hex_to_bytes32(s: &str) -> Result<Bytes32> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s).map_err(|e| AllowlistError::HexDecode(e.to_string()))?;
    bytes.as_slice().to_bytes32()
}

/// Lower-case, `0x`-prefixed hex, the form the verifier contract takes for `bytes32[]`.
#[must_use]
pub fn bytes32_to_hex(bytes: &Bytes32) -> HexString {
    format!("0x{}", hex::encode(bytes))
}

/// Big-endian byte order of two nodes, the order pair hashing sorts by.
#[must_use]
pub fn compare_bytes32(a: &Bytes32, b: &Bytes32) -> Ordering {
    a.cmp(b)
}

#[must_use]
pub fn sorted_pair<'a>(a: &'a Bytes32, b: &'a Bytes32) -> (&'a Bytes32, &'a Bytes32) {
    match compare_bytes32(a, b) {
        Ordering::Greater => (b, a),
        _ => (a, b),
    }
}

#[must_use]
pub fn concat_sorted(a: &Bytes32, b: &Bytes32) -> [u8; 64] {
    let (low, high) = sorted_pair(a, b);
    let mut out = [0u8; 64];
    out[..32].copy_from_slice(low);
    out[32..].copy_from_slice(high);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AllowlistError;

    #[test]
    fn test_hex_roundtrip() {
        let node = [0xab; 32];
        let hex = bytes32_to_hex(&node);
        assert!(hex.starts_with("0x"));
        assert_eq!(hex_to_bytes32(&hex).unwrap(), node);
    }

    #[test]
    fn test_hex_without_prefix() {
        let hex = "0000000000000000000000000000000000000000000000000000000000000001";
        let bytes = hex_to_bytes32(hex).unwrap();
        assert_eq!(bytes[31], 1);
    }

    #[test]
    fn test_invalid_hex_length() {
        let result = hex_to_bytes32("0x00");
        assert!(matches!(result, Err(AllowlistError::InvalidNodeLength)));
    }

    #[test]
    fn test_invalid_hex_chars() {
        let result = hex_to_bytes32("0xzz");
        assert!(matches!(result, Err(AllowlistError::HexDecode(_))));
    }

    #[test]
    fn test_compare_bytes32() {
        let a = [0u8; 32];
        let mut b = [0u8; 32];
        b[31] = 1;

        assert_eq!(compare_bytes32(&a, &b), Ordering::Less);
        assert_eq!(compare_bytes32(&b, &a), Ordering::Greater);
        assert_eq!(compare_bytes32(&a, &a), Ordering::Equal);

        let mut c = [0u8; 32];
        c[0] = 1;
        assert_eq!(compare_bytes32(&c, &b), Ordering::Greater);
    }

    #[test]
    fn test_sorted_pair_first_byte_decides() {
        let mut a = [0u8; 32];
        let mut b = [0xffu8; 32];
        a[0] = 2;
        b[0] = 1;
        let (low, high) = sorted_pair(&a, &b);
        assert_eq!(low, &b);
        assert_eq!(high, &a);
    }

    #[test]
    fn test_concat_sorted_is_symmetric() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        assert_eq!(concat_sorted(&a, &b), concat_sorted(&b, &a));
        assert_eq!(&concat_sorted(&a, &b)[..32], &a);
    }

    #[test]
    fn test_to_bytes32_wrong_length() {
        let slice: &[u8] = &[1u8; 31];
        assert!(matches!(
            slice.to_bytes32(),
            Err(AllowlistError::InvalidNodeLength)
        ));
    }

    #[test]
    fn test_to_bytes32_from_b256() {
        let value = B256::repeat_byte(7);
        assert_eq!(value.to_bytes32().unwrap(), [7u8; 32]);
    }
}
