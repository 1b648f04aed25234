//! Keystore files: encrypted signer storage.
//!
//! A keystore file holds one signer's Ed25519 private key encrypted with
//! ChaCha20-Poly1305 under a key derived from a passphrase via Argon2id and
//! HKDF. The account's name, address and public key are stored in plaintext
//! so accounts can be listed without a passphrase.
//!
//! File format (JSON):
//! ```json
//! {
//!     "version": 1,
//!     "format": "idreg-key-v1",
//!     "encryption": {
//!         "algorithm": "chacha20-poly1305",
//!         "kdf": "argon2id",
//!         "kdf_params": { "m_cost": 19456, "t_cost": 2, "p_cost": 1 },
//!         "salt": "<base64-16-bytes>",
//!         "nonce": "<base64-12-bytes>"
//!     },
//!     "encrypted_key": "<base64-ciphertext>",
//!     "account": { "name": "...", "address": "0x...", "public_key": "...", "created_at": 0 }
//! }
//! ```

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::address::Address;
use crate::crypto::derivation::{self, KEYSTORE_ENCRYPTION_CONTEXT};
use crate::crypto::encryption::{self, KdfParams};
use crate::error::{LedgerError, Result};
use crate::signer::Signer;

use super::write_atomic;

// ── File format constants ─────────────────────────────────────────────────────

const KEY_VERSION: u32 = 1;
const KEY_FORMAT: &str = "idreg-key-v1";
const KEY_ALGORITHM: &str = "chacha20-poly1305";
const KEY_KDF: &str = "argon2id";

/// Extension of keystore files.
pub const KEY_EXTENSION: &str = "json";

// ── On-disk structures ────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct KeystoreFile {
    version: u32,
    format: String,
    encryption: EncryptionMetadata,
    encrypted_key: String,
    account: KeystoreAccount,
}

#[derive(Debug, Serialize, Deserialize)]
struct EncryptionMetadata {
    algorithm: String,
    kdf: String,
    kdf_params: KdfParams,
    salt: String,
    nonce: String,
}

/// Public part of a keystore file, readable without the passphrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreAccount {
    pub name: String,
    pub address: Address,
    /// Ed25519 public key (base64).
    pub public_key: String,
    pub created_at: u64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Path of the keystore file for account `name` in `dir`.
pub fn key_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.{KEY_EXTENSION}"))
}

/// Check that an account name is usable as a file stem.
pub fn validate_account_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(LedgerError::InvalidKey(format!(
            "account name '{name}' must be 1-64 characters of [A-Za-z0-9_-]"
        )))
    }
}

/// Save a signer to `path`, encrypting its key with `passphrase`.
pub fn save_signer(signer: &Signer, path: &Path, passphrase: &str) -> Result<()> {
    save_signer_with_params(signer, path, passphrase, &KdfParams::default())
}

/// Save a signer with explicit Argon2id cost parameters.
///
/// The file is written atomically through a sibling temporary file.
pub fn save_signer_with_params(
    signer: &Signer,
    path: &Path,
    passphrase: &str,
    params: &KdfParams,
) -> Result<()> {
    let mut plaintext = signer.signing_key_bytes();

    // passphrase → Argon2id(passphrase, salt) → HKDF(context) → key
    let salt = crate::crypto::random::random_salt_16();
    let mut master_key = encryption::derive_passphrase_key(passphrase.as_bytes(), &salt, params)?;
    let mut encryption_key = derivation::derive_key(&master_key, KEYSTORE_ENCRYPTION_CONTEXT)?;
    master_key.zeroize();

    let encrypted = encryption::encrypt(&encryption_key, &plaintext);
    encryption_key.zeroize();
    plaintext.zeroize();
    let (nonce, ciphertext) = encrypted?;

    let file = KeystoreFile {
        version: KEY_VERSION,
        format: KEY_FORMAT.to_string(),
        encryption: EncryptionMetadata {
            algorithm: KEY_ALGORITHM.to_string(),
            kdf: KEY_KDF.to_string(),
            kdf_params: *params,
            salt: STANDARD.encode(salt),
            nonce: STANDARD.encode(&nonce),
        },
        encrypted_key: STANDARD.encode(&ciphertext),
        account: KeystoreAccount {
            name: signer.name.clone(),
            address: signer.address(),
            public_key: signer.public_key_base64(),
            created_at: signer.created_at,
        },
    };

    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| LedgerError::SerializationError(e.to_string()))?;
    write_atomic(path, json.as_bytes())
}

/// Load and decrypt a signer.
///
/// # Errors
///
/// `InvalidPassphrase` if authentication fails, `InvalidFileFormat` for a
/// malformed file, `InvalidKey` if the decrypted key does not match the
/// stored address.
pub fn load_signer(path: &Path, passphrase: &str) -> Result<Signer> {
    let file = read_file(path)?;

    let salt: [u8; 16] = decode_field(&file.encryption.salt, "salt")?
        .try_into()
        .map_err(|_| LedgerError::InvalidFileFormat("salt must be 16 bytes".into()))?;
    let nonce = decode_field(&file.encryption.nonce, "nonce")?;
    let ciphertext = decode_field(&file.encrypted_key, "ciphertext")?;

    let mut master_key = encryption::derive_passphrase_key(
        passphrase.as_bytes(),
        &salt,
        &file.encryption.kdf_params,
    )?;
    let mut encryption_key = derivation::derive_key(&master_key, KEYSTORE_ENCRYPTION_CONTEXT)?;
    master_key.zeroize();

    let decrypted = encryption::decrypt(&encryption_key, &nonce, &ciphertext);
    encryption_key.zeroize();
    let mut plaintext = decrypted?;

    let key_bytes: std::result::Result<[u8; 32], _> = plaintext.as_slice().try_into();
    plaintext.zeroize();
    let mut key_bytes =
        key_bytes.map_err(|_| LedgerError::InvalidKey("signing key must be 32 bytes".into()))?;

    let signer = Signer::from_parts(&key_bytes, file.account.name, file.account.created_at);
    key_bytes.zeroize();

    if signer.address() != file.account.address {
        return Err(LedgerError::InvalidKey(format!(
            "key does not match stored address {}",
            file.account.address
        )));
    }
    Ok(signer)
}

/// Read the public account info without decrypting.
pub fn read_public_info(path: &Path) -> Result<KeystoreAccount> {
    Ok(read_file(path)?.account)
}

/// All accounts in a keystore directory, ordered by name.
///
/// A missing directory has no accounts. Files that are not keystore files
/// are skipped.
pub fn list_accounts(dir: &Path) -> Result<Vec<KeystoreAccount>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut accounts = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(KEY_EXTENSION) {
            continue;
        }
        match read_public_info(&path) {
            Ok(account) => accounts.push(account),
            Err(e) => log::warn!("skipping {}: {e}", path.display()),
        }
    }
    accounts.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(accounts)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn read_file(path: &Path) -> Result<KeystoreFile> {
    let bytes = std::fs::read(path)?;
    let file: KeystoreFile = serde_json::from_slice(&bytes).map_err(|e| {
        LedgerError::InvalidFileFormat(format!("failed to parse keystore file: {e}"))
    })?;
    if file.version != KEY_VERSION || file.format != KEY_FORMAT {
        return Err(LedgerError::InvalidFileFormat(format!(
            "unsupported keystore version={} format={}",
            file.version, file.format
        )));
    }
    Ok(file)
}

fn decode_field(value: &str, what: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| LedgerError::InvalidFileFormat(format!("invalid {what} base64: {e}")))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
