//! Digest type and the two hashing primitives the ledger is built on.
//!
//! Internal nodes use sorted-pair combination: the smaller of the two
//! children (byte-wise) is hashed first. Proofs therefore carry no left/right
//! markers, and `build` and `verify` must both go through [`hash_pair`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, Result};

pub const HASH_LEN: usize = 32;

/// A SHA-256 digest. Leaves and internal nodes share this representation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash([u8; HASH_LEN]);

impl Hash {
    pub const fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse 64 hex characters into a digest.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| LedgerError::MalformedDigest(format!("{:?}: {}", s, e)))?;
        Self::try_from(bytes.as_slice())
    }
}

impl TryFrom<&[u8]> for Hash {
    type Error = LedgerError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let array: [u8; HASH_LEN] = bytes.try_into().map_err(|_| {
            LedgerError::MalformedDigest(format!(
                "expected {} bytes, got {}",
                HASH_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }
}

impl FromStr for Hash {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// SHA-256 of the UTF-8 bytes of `input`.
pub fn hash_leaf(input: &str) -> Hash {
    Hash(Sha256::digest(input.as_bytes()).into())
}

/// SHA-256 of `min(a, b) || max(a, b)`.
pub fn hash_pair(a: &Hash, b: &Hash) -> Hash {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Sha256::new();
    hasher.update(first.as_bytes());
    hasher.update(second.as_bytes());
    Hash(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_hash_known_vector() {
        assert_eq!(
            hash_leaf("abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_pair_order_independent() {
        let a = hash_leaf("a");
        let b = hash_leaf("b");
        assert_eq!(hash_pair(&a, &b), hash_pair(&b, &a));
        assert_ne!(hash_pair(&a, &b), hash_pair(&a, &a));
    }

    #[test]
    fn test_pair_hashes_smaller_first() {
        let a = hash_leaf("a");
        let b = hash_leaf("b");
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };

        let mut hasher = Sha256::new();
        hasher.update(lo.as_bytes());
        hasher.update(hi.as_bytes());
        let expected = Hash::from_bytes(hasher.finalize().into());

        assert_eq!(hash_pair(&hi, &lo), expected);
    }

    #[test]
    fn test_hex_roundtrip_and_rejects_bad_length() {
        let h = hash_leaf("alice->bob:10");
        assert_eq!(Hash::from_hex(&h.to_hex()).unwrap(), h);
        assert!(matches!(
            Hash::from_hex("abcd"),
            Err(LedgerError::MalformedDigest(_))
        ));
        assert!(matches!(
            Hash::from_hex("zz"),
            Err(LedgerError::MalformedDigest(_))
        ));
    }

    #[test]
    fn test_serde_as_hex_string() {
        let h = hash_leaf("x");
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{}\"", h.to_hex()));
        let back: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }
}
