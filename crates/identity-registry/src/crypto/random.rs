//! Secure random bytes for salts and nonces.

use rand::RngCore;

/// Fill a buffer with cryptographically secure random bytes.
pub fn fill_random(buf: &mut [u8]) {
    rand::thread_rng().fill_bytes(buf);
}

/// Generate a fixed-size array of cryptographically secure random bytes.
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    fill_random(&mut buf);
    buf
}

/// 12-byte nonce for ChaCha20-Poly1305.
pub fn random_nonce_12() -> [u8; 12] {
    random_bytes()
}

/// 16-byte Argon2id salt.
pub fn random_salt_16() -> [u8; 16] {
    random_bytes()
}
