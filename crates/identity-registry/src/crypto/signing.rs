//! Ed25519 signatures over transaction hashes.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::error::{LedgerError, Result};

/// Sign a message.
pub fn sign(signing_key: &SigningKey, message: &[u8]) -> Signature {
    signing_key.sign(message)
}

/// Verify a signature against a public key and message.
pub fn verify(verifying_key: &VerifyingKey, message: &[u8], signature: &Signature) -> Result<()> {
    verifying_key
        .verify(message, signature)
        .map_err(|_| LedgerError::SignatureInvalid)
}

/// Sign a message and return the signature base64-encoded.
pub fn sign_to_base64(signing_key: &SigningKey, message: &[u8]) -> String {
    let sig = sign(signing_key, message);
    base64::Engine::encode(&base64::engine::general_purpose::STANDARD, sig.to_bytes())
}

/// Verify a base64-encoded signature.
///
/// A signature that does not decode to 64 bytes is reported as
/// `SignatureInvalid`, same as a signature that fails verification.
pub fn verify_from_base64(
    verifying_key: &VerifyingKey,
    message: &[u8],
    signature_b64: &str,
) -> Result<()> {
    let sig_bytes =
        base64::Engine::decode(&base64::engine::general_purpose::STANDARD, signature_b64)
            .map_err(|_| LedgerError::SignatureInvalid)?;

    let sig_array: [u8; 64] = sig_bytes
        .try_into()
        .map_err(|_| LedgerError::SignatureInvalid)?;

    verify(verifying_key, message, &Signature::from_bytes(&sig_array))
}
