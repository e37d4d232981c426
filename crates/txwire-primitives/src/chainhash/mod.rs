//! 32-byte identifier type for transactions and the outpoints that spend them.
//!
//! A `Hash` is stored in internal (wire) byte order and displayed
//! byte-reversed, which is how transaction ids are conventionally written.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Size of a Hash in bytes.
pub const HASH_SIZE: usize = 32;

/// Length of the display hex form (64 hex characters).
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;

/// A 32-byte identifier in internal byte order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    /// The all-zero identifier referenced by coinbase inputs.
    pub const ZERO: Hash = Hash([0u8; HASH_SIZE]);

    /// Create a Hash from a raw 32-byte array in internal byte order.
    pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }

    /// Create a Hash from a byte slice in internal byte order.
    ///
    /// # Arguments
    /// * `bytes` - A slice that must be exactly 32 bytes.
    ///
    /// # Returns
    /// `Ok(Hash)` if the slice is 32 bytes, or an error otherwise.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let arr: [u8; HASH_SIZE] = bytes.try_into().map_err(|_| {
            PrimitivesError::InvalidHash(format!(
                "invalid hash length of {}, want {}",
                bytes.len(),
                HASH_SIZE
            ))
        })?;
        Ok(Hash(arr))
    }

    /// Parse the display form: 64 hex characters, byte-reversed relative to
    /// internal order.
    ///
    /// # Arguments
    /// * `hex_str` - Exactly 64 hex characters.
    ///
    /// # Returns
    /// `Ok(Hash)` on success, or an error for wrong length or bad characters.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.len() != HASH_HEX_SIZE {
            return Err(PrimitivesError::InvalidHash(format!(
                "hash string must be {} hex characters, got {}",
                HASH_HEX_SIZE,
                hex_str.len()
            )));
        }
        let mut bytes = [0u8; HASH_SIZE];
        hex::decode_to_slice(hex_str, &mut bytes)?;
        bytes.reverse();
        Ok(Hash(bytes))
    }

    /// Double SHA-256 of `data`, kept in internal byte order.
    pub fn sha256d(data: &[u8]) -> Self {
        Hash(sha256d(data))
    }

    /// Access the internal byte array.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Whether every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HASH_SIZE]
    }
}

impl From<[u8; HASH_SIZE]> for Hash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }
}

/// Display the hash as byte-reversed hex.
///
/// Internal bytes `[0x06, 0xe5, ...]` display as `"...e506"`.
impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        f.write_str(&hex::encode(reversed))
    }
}

impl FromStr for Hash {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash::from_hex(s)
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Genesis block hash bytes in internal (little-endian) order.
    const MAIN_NET_GENESIS_HASH: Hash = Hash([
        0x6f, 0xe2, 0x8c, 0x0a, 0xb6, 0xf1, 0xb3, 0x72,
        0xc1, 0xa6, 0xa2, 0x46, 0xae, 0x63, 0xf7, 0x4f,
        0x93, 0x1e, 0x83, 0x65, 0xe1, 0x5a, 0x08, 0x9c,
        0x68, 0xd6, 0x19, 0x00, 0x00, 0x00, 0x00, 0x00,
    ]);

    #[test]
    fn test_from_hex_reverses() {
        let result = Hash::from_hex(
            "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f",
        )
        .unwrap();
        assert_eq!(result, MAIN_NET_GENESIS_HASH);
        assert_eq!(
            result.to_string(),
            "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"
        );
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        // Short strings are not padded.
        assert!(Hash::from_hex("19d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f").is_err());
        assert!(Hash::from_hex("").is_err());
        // Too long.
        assert!(Hash::from_hex(&"00".repeat(33)).is_err());
        // Right length, bad character.
        let mut bad = "00".repeat(32);
        bad.replace_range(0..1, "g");
        assert!(matches!(Hash::from_hex(&bad), Err(PrimitivesError::InvalidHex(_))));
    }

    #[test]
    fn test_from_bytes_length() {
        assert!(Hash::from_bytes(&[0u8; HASH_SIZE + 1]).is_err());
        assert!(Hash::from_bytes(&[0u8; HASH_SIZE - 1]).is_err());
        let hash = Hash::from_bytes(&[7u8; HASH_SIZE]).unwrap();
        assert_eq!(hash.as_bytes(), &[7u8; HASH_SIZE]);
    }

    #[test]
    fn test_zero() {
        assert!(Hash::ZERO.is_zero());
        assert!(Hash::default().is_zero());
        assert!(!MAIN_NET_GENESIS_HASH.is_zero());
    }

    #[test]
    fn test_sha256d_display() {
        // Display is the byte-reversed digest.
        assert_eq!(
            Hash::sha256d(b"hello").to_string(),
            "503d8319a48348cdc610a582f7bf754b5833df65038606eb48510790dfc99595"
        );
    }

    #[test]
    fn test_serde_hex_string() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            hash: Hash,
        }

        let data = Wrapper { hash: MAIN_NET_GENESIS_HASH };
        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(
            json,
            r#"{"hash":"000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"}"#
        );

        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back.hash, MAIN_NET_GENESIS_HASH);
    }
}
