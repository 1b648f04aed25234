//! Cryptographic primitives used by signers and the keystore.
//!
//! - Ed25519 key pairs, transaction signing and verification
//! - HKDF-SHA256 key derivation
//! - Argon2id passphrase-based key derivation
//! - ChaCha20-Poly1305 authenticated encryption
//! - Random salts and nonces

pub mod derivation;
pub mod encryption;
pub mod keys;
pub mod random;
pub mod signing;
