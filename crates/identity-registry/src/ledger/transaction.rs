//! Transactions: signed registry calls.
//!
//! A transaction body names the sender, the target registry (absent for a
//! deployment), the sender's nonce, gas parameters and exactly one
//! [`Call`]. Its hash is SHA-256 over the bincode encoding of the body;
//! the sender signs that hash with the key whose address is `from`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::address::Address;
use crate::crypto::keys::Ed25519KeyPair;
use crate::crypto::signing;
use crate::error::{LedgerError, Result};
use crate::registry::{ContentHash, Decision};
use crate::signer::Signer;

use super::units::Wei;

/// Gas charged per byte of variable-length call data.
pub const GAS_PER_CALLDATA_BYTE: u64 = 16;

const DEPLOY_GAS: u64 = 1_200_000;
const CREATE_IDENTITY_GAS: u64 = 90_000;
const ADD_CREDENTIAL_GAS: u64 = 70_000;
const REQUEST_VERIFICATION_GAS: u64 = 60_000;
const RESOLVE_VERIFICATION_GAS: u64 = 45_000;
const SET_VERIFIER_GAS: u64 = 30_000;

/// Hex transaction hash, `0x`-prefixed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TxHash(pub String);

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registry operation carried by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Call {
    /// Create a new registry owned by the sender.
    Deploy,
    CreateIdentity {
        name: String,
        contact: String,
    },
    AddCredential {
        credential_type: String,
        hash: ContentHash,
    },
    RequestVerification {
        credential_type: String,
        hash: ContentHash,
    },
    ResolveVerification {
        subject: Address,
        credential_type: String,
        decision: Decision,
    },
    SetAuthorizedVerifier {
        verifier: Address,
        enabled: bool,
    },
}

impl Call {
    /// Contract-level method name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Deploy => "deploy",
            Self::CreateIdentity { .. } => "createIdentity",
            Self::AddCredential { .. } => "addCredential",
            Self::RequestVerification { .. } => "requestVerification",
            Self::ResolveVerification { .. } => "resolveVerification",
            Self::SetAuthorizedVerifier { .. } => "setAuthorizedVerifier",
        }
    }

    pub fn is_deploy(&self) -> bool {
        matches!(self, Self::Deploy)
    }

    fn base_gas(&self) -> u64 {
        match self {
            Self::Deploy => DEPLOY_GAS,
            Self::CreateIdentity { .. } => CREATE_IDENTITY_GAS,
            Self::AddCredential { .. } => ADD_CREDENTIAL_GAS,
            Self::RequestVerification { .. } => REQUEST_VERIFICATION_GAS,
            Self::ResolveVerification { .. } => RESOLVE_VERIFICATION_GAS,
            Self::SetAuthorizedVerifier { .. } => SET_VERIFIER_GAS,
        }
    }

    /// Bytes of free-form string data in the call.
    fn calldata_len(&self) -> usize {
        match self {
            Self::Deploy | Self::SetAuthorizedVerifier { .. } => 0,
            Self::CreateIdentity { name, contact } => name.len() + contact.len(),
            Self::AddCredential {
                credential_type, ..
            }
            | Self::RequestVerification {
                credential_type, ..
            }
            | Self::ResolveVerification {
                credential_type, ..
            } => credential_type.len(),
        }
    }

    /// Gas this call costs: fixed base plus per-byte call data.
    pub fn intrinsic_gas(&self) -> u64 {
        self.base_gas()
            .saturating_add((self.calldata_len() as u64).saturating_mul(GAS_PER_CALLDATA_BYTE))
    }
}

/// The signed portion of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionBody {
    pub chain_id: u64,
    pub from: Address,
    /// Target registry; `None` for a deployment.
    pub to: Option<Address>,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: Wei,
    pub call: Call,
}

impl TransactionBody {
    /// SHA-256 over the canonical (bincode) encoding.
    pub fn hash(&self) -> Result<TxHash> {
        let bytes = bincode::serialize(self)
            .map_err(|e| LedgerError::SerializationError(format!("transaction body: {e}")))?;
        Ok(TxHash(format!("0x{}", hex::encode(Sha256::digest(&bytes)))))
    }

    /// The most this transaction can cost the sender.
    pub fn max_fee(&self) -> Option<Wei> {
        Wei::from(self.gas_limit).checked_mul(self.gas_price)
    }
}

/// A transaction body with the sender's public key and signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub body: TransactionBody,
    pub hash: TxHash,
    /// Sender's Ed25519 public key (base64).
    pub public_key: String,
    /// Signature over `hash` (base64).
    pub signature: String,
}

impl SignedTransaction {
    /// Check hash integrity, that the key belongs to `from`, and the signature.
    pub fn verify(&self) -> Result<()> {
        let expected = self.body.hash()?;
        if expected != self.hash {
            return Err(LedgerError::InvalidTransaction(format!(
                "hash mismatch: body hashes to {expected}, transaction claims {}",
                self.hash
            )));
        }

        let verifying_key = Ed25519KeyPair::verifying_key_from_base64(&self.public_key)?;
        let key_address = Address::from_verifying_key(&verifying_key);
        if key_address != self.body.from {
            return Err(LedgerError::SenderMismatch {
                sender: self.body.from,
                key_address,
            });
        }

        signing::verify_from_base64(&verifying_key, self.hash.0.as_bytes(), &self.signature)
    }
}

/// Builder for signed transactions.
pub struct TransactionBuilder {
    chain_id: u64,
    call: Call,
    to: Option<Address>,
    nonce: u64,
    gas_limit: Option<u64>,
    gas_price: Wei,
}

impl TransactionBuilder {
    /// Start a transaction for `call` on `chain_id`.
    ///
    /// Defaults: nonce 0, gas price 0, gas limit equal to the call's
    /// intrinsic gas.
    pub fn new(chain_id: u64, call: Call) -> Self {
        Self {
            chain_id,
            call,
            to: None,
            nonce: 0,
            gas_limit: None,
            gas_price: 0,
        }
    }

    /// Target registry address.
    pub fn to(mut self, contract: Address) -> Self {
        self.to = Some(contract);
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    pub fn gas_price(mut self, gas_price: Wei) -> Self {
        self.gas_price = gas_price;
        self
    }

    /// Hash the body and sign it as `signer`.
    pub fn sign(self, signer: &Signer) -> Result<SignedTransaction> {
        let gas_limit = self
            .gas_limit
            .unwrap_or_else(|| self.call.intrinsic_gas());
        let body = TransactionBody {
            chain_id: self.chain_id,
            from: signer.address(),
            to: self.to,
            nonce: self.nonce,
            gas_limit,
            gas_price: self.gas_price,
            call: self.call,
        };
        let hash = body.hash()?;
        let signature = signer.sign_hash(&hash.0);

        Ok(SignedTransaction {
            body,
            hash,
            public_key: signer.public_key_base64(),
            signature,
        })
    }
}
