//! Passphrase-based key derivation (Argon2id) and authenticated encryption
//! (ChaCha20-Poly1305) for signer keys at rest.

use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use serde::{Deserialize, Serialize};

use crate::crypto::random::random_nonce_12;
use crate::error::{LedgerError, Result};

/// Argon2id cost parameters, stored next to the ciphertext so a keystore
/// file stays readable if the defaults change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub m_cost: u32,
    /// Iterations.
    pub t_cost: u32,
    /// Parallel lanes.
    pub p_cost: u32,
}

/// Largest accepted memory cost: 1 GiB.
pub const MAX_M_COST: u32 = 1024 * 1024;
/// Largest accepted iteration count.
pub const MAX_T_COST: u32 = 64;
/// Largest accepted lane count.
pub const MAX_P_COST: u32 = 16;

impl KdfParams {
    /// Reject costs above the accepted ceilings.
    ///
    /// Parameters read from a keystore file are untrusted input.
    pub fn check_limits(&self) -> Result<()> {
        if self.m_cost > MAX_M_COST || self.t_cost > MAX_T_COST || self.p_cost > MAX_P_COST {
            return Err(LedgerError::DerivationFailed(format!(
                "Argon2 params exceed limits: m_cost={} (max {MAX_M_COST}), t_cost={} (max {MAX_T_COST}), p_cost={} (max {MAX_P_COST})",
                self.m_cost, self.t_cost, self.p_cost
            )));
        }
        Ok(())
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost: 19 * 1024,
            t_cost: 2,
            p_cost: 1,
        }
    }
}

/// Derive a 32-byte key from a passphrase and salt using Argon2id.
pub fn derive_passphrase_key(
    passphrase: &[u8],
    salt: &[u8; 16],
    params: &KdfParams,
) -> Result<[u8; 32]> {
    params.check_limits()?;
    let argon_params = Params::new(params.m_cost, params.t_cost, params.p_cost, Some(32))
        .map_err(|e| LedgerError::DerivationFailed(format!("Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let mut output = [0u8; 32];
    argon2
        .hash_password_into(passphrase, salt, &mut output)
        .map_err(|e| LedgerError::DerivationFailed(format!("Argon2 hash: {e}")))?;

    Ok(output)
}

/// Encrypt plaintext with ChaCha20-Poly1305 under a fresh random nonce.
///
/// Returns `(nonce, ciphertext)`.
pub fn encrypt(key: &[u8; 32], plaintext: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    let nonce_bytes = random_nonce_12();
    let cipher = ChaCha20Poly1305::new_from_slice(key)
        .map_err(|e| LedgerError::EncryptionFailed(format!("cipher init: {e}")))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| LedgerError::EncryptionFailed(format!("encrypt: {e}")))?;
    Ok((nonce_bytes.to_vec(), ciphertext))
}

/// Decrypt ciphertext with ChaCha20-Poly1305.
///
/// Authentication failure is reported as `InvalidPassphrase`: with a key
/// derived from a passphrase that is the only realistic cause.
pub fn decrypt(key: &[u8; 32], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if nonce.len() != 12 {
        return Err(LedgerError::DecryptionFailed(format!(
            "nonce must be 12 bytes, got {}",
            nonce.len()
        )));
    }
    let cipher = ChaCha20Poly1305::new_from_slice(key)
        .map_err(|e| LedgerError::DecryptionFailed(format!("cipher init: {e}")))?;
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| LedgerError::InvalidPassphrase)
}
