//! Error types for the identity registry and its hosting ledger.
//!
//! Two layers: [`RegistryError`] covers precondition violations inside the
//! registry state machine, [`LedgerError`] covers everything the hosting
//! environment can reject (fees, gas, signatures, storage) and wraps the
//! former. Private key material is never included in error messages.

use crate::address::Address;
use crate::ledger::Wei;

/// Precondition violations reported by registry operations.
///
/// A call that returns one of these has not changed any state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Caller {0} has no registered identity")]
    NotRegistered(Address),

    #[error("Unknown credential '{credential_type}' for {subject}")]
    UnknownCredential {
        subject: Address,
        credential_type: String,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Malformed textual input (addresses, hashes, amounts, decisions).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid decision '{0}' (expected approve or reject)")]
    InvalidDecision(String),
}

/// Errors raised by the ledger, the stores and the deployment flow.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Insufficient funds: required {required} wei, available {available} wei")]
    InsufficientFunds { required: Wei, available: Wei },

    #[error("Intrinsic gas too low: required {required}, gas limit {provided}")]
    GasLimitTooLow { required: u64, provided: u64 },

    #[error("Gas limit {provided} exceeds block gas limit {limit}")]
    GasLimitExceedsBlock { limit: u64, provided: u64 },

    #[error("Nonce mismatch: expected {expected}, got {provided}")]
    NonceMismatch { expected: u64, provided: u64 },

    #[error("Chain id mismatch: expected {expected}, got {provided}")]
    ChainIdMismatch { expected: u64, provided: u64 },

    #[error("Signature verification failed")]
    SignatureInvalid,

    #[error("Sender {sender} does not match signing key address {key_address}")]
    SenderMismatch { sender: Address, key_address: Address },

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("No contract deployed at {0}")]
    UnknownContract(Address),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid passphrase")]
    InvalidPassphrase,

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// The registry precondition behind this error, if any.
    pub fn registry_error(&self) -> Option<&RegistryError> {
        match self {
            Self::Registry(e) => Some(e),
            _ => None,
        }
    }
}

/// Result alias for registry operations.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, LedgerError>;
