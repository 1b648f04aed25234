//! Account and contract addresses.
//!
//! An account address is the last 20 bytes of SHA-256 over the account's
//! Ed25519 public key. Contract addresses live in the same 20-byte space
//! and are derived from the deployer address and nonce by the ledger.
//!
//! Textual form is `0x` followed by 40 lowercase hex digits. The `0x`
//! prefix is optional when parsing.

use std::str::FromStr;

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::ParseError;

/// A 20-byte account or contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Derive the account address for a public key.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self::from_digest(&Sha256::digest(key.as_bytes()).into())
    }

    /// Take the trailing 20 bytes of a 32-byte digest.
    pub fn from_digest(digest: &[u8; 32]) -> Self {
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest[12..]);
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Abbreviated form for log lines: `0x1234…abcd`.
    pub fn short(&self) -> String {
        let full = hex::encode(self.0);
        format!("0x{}…{}", &full[..4], &full[36..])
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(decode_prefixed_hex(s)?))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Decode `0x`-prefixed (or bare) hex into a fixed-size array.
pub(crate) fn decode_prefixed_hex<const N: usize>(s: &str) -> Result<[u8; N], ParseError> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);

    let bytes = hex::decode(digits).map_err(|e| ParseError::InvalidHex(format!("{s}: {e}")))?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| ParseError::InvalidLength {
            expected: N,
            actual,
        })
}
