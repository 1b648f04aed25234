//! HKDF-SHA256 key derivation.

use hkdf::Hkdf;
use sha2::Sha256;

use crate::error::{LedgerError, Result};

/// Context for the keystore encryption key. Must remain stable across versions.
pub const KEYSTORE_ENCRYPTION_CONTEXT: &str = "identity-registry/keystore-encryption";

/// Derive a 32-byte key from input key material and a context string.
pub fn derive_key(ikm: &[u8; 32], context: &str) -> Result<[u8; 32]> {
    let hk = Hkdf::<Sha256>::new(None, ikm);
    let mut output = [0u8; 32];
    hk.expand(context.as_bytes(), &mut output)
        .map_err(|e| LedgerError::DerivationFailed(format!("HKDF expand failed: {e}")))?;
    Ok(output)
}
