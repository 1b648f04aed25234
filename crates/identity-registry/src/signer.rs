//! Signer: a named ledger account backed by an Ed25519 key pair.
//!
//! The public key determines the account [`Address`]; the private key signs
//! transaction hashes. Signers are persisted through
//! [`crate::storage::keystore`].

use ed25519_dalek::{SigningKey, VerifyingKey};

use crate::address::Address;
use crate::crypto::keys::Ed25519KeyPair;
use crate::crypto::signing;

/// A ledger account that can sign transactions.
///
/// The signing key is zeroized on drop.
pub struct Signer {
    key_pair: Ed25519KeyPair,
    /// Account name (keystore file stem).
    pub name: String,
    /// Creation timestamp (microseconds since Unix epoch).
    pub created_at: u64,
}

impl Signer {
    /// Create a signer with a fresh key pair.
    pub fn generate(name: impl Into<String>) -> Self {
        Self {
            key_pair: Ed25519KeyPair::generate(),
            name: name.into(),
            created_at: crate::time::now_micros(),
        }
    }

    /// Reconstruct from stored key bytes and metadata.
    pub fn from_parts(signing_key_bytes: &[u8; 32], name: String, created_at: u64) -> Self {
        Self {
            key_pair: Ed25519KeyPair::from_signing_key_bytes(signing_key_bytes),
            name,
            created_at,
        }
    }

    /// The account address derived from the public key.
    pub fn address(&self) -> Address {
        Address::from_verifying_key(self.key_pair.verifying_key())
    }

    pub fn signing_key(&self) -> &SigningKey {
        self.key_pair.signing_key()
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        self.key_pair.verifying_key()
    }

    /// Return the signing key bytes. Caller must zeroize after use.
    pub fn signing_key_bytes(&self) -> [u8; 32] {
        self.key_pair.signing_key_bytes()
    }

    /// Public key as base64.
    pub fn public_key_base64(&self) -> String {
        base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            self.key_pair.verifying_key_bytes(),
        )
    }

    /// Sign a transaction hash string, returning a base64 signature.
    pub fn sign_hash(&self, hash: &str) -> String {
        signing::sign_to_base64(self.signing_key(), hash.as_bytes())
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("name", &self.name)
            .field("address", &self.address())
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}
