//! Events emitted by registry state transitions.
//!
//! Operations return the events they produced; the ledger attaches them to
//! the transaction receipt.

use serde::{Deserialize, Serialize};

use crate::address::Address;

use super::types::{ContentHash, RequestId, VerificationStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryEvent {
    RegistryDeployed {
        owner: Address,
    },
    IdentityCreated {
        subject: Address,
        name: String,
    },
    CredentialAdded {
        subject: Address,
        credential_type: String,
        hash: ContentHash,
        /// An earlier credential of the same type was overwritten.
        replaced: bool,
    },
    VerificationRequested {
        request_id: RequestId,
        subject: Address,
        credential_type: String,
        hash: ContentHash,
    },
    VerificationWithdrawn {
        request_id: RequestId,
        subject: Address,
        credential_type: String,
    },
    VerificationResolved {
        request_id: RequestId,
        subject: Address,
        credential_type: String,
        verifier: Address,
        status: VerificationStatus,
    },
    VerifierAuthorizationChanged {
        verifier: Address,
        enabled: bool,
    },
}

impl RegistryEvent {
    /// Stable event name, as shown in receipts and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RegistryDeployed { .. } => "RegistryDeployed",
            Self::IdentityCreated { .. } => "IdentityCreated",
            Self::CredentialAdded { .. } => "CredentialAdded",
            Self::VerificationRequested { .. } => "VerificationRequested",
            Self::VerificationWithdrawn { .. } => "VerificationWithdrawn",
            Self::VerificationResolved { .. } => "VerificationResolved",
            Self::VerifierAuthorizationChanged { .. } => "VerifierAuthorizationChanged",
        }
    }
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RegistryDeployed { owner } => write!(f, "RegistryDeployed(owner={owner})"),
            Self::IdentityCreated { subject, name } => {
                write!(f, "IdentityCreated(subject={subject}, name={name:?})")
            }
            Self::CredentialAdded {
                subject,
                credential_type,
                hash,
                replaced,
            } => write!(
                f,
                "CredentialAdded(subject={subject}, type={credential_type:?}, hash={hash}, replaced={replaced})"
            ),
            Self::VerificationRequested {
                request_id,
                subject,
                credential_type,
                ..
            } => write!(
                f,
                "VerificationRequested(id={request_id}, subject={subject}, type={credential_type:?})"
            ),
            Self::VerificationWithdrawn {
                request_id,
                subject,
                credential_type,
            } => write!(
                f,
                "VerificationWithdrawn(id={request_id}, subject={subject}, type={credential_type:?})"
            ),
            Self::VerificationResolved {
                request_id,
                subject,
                credential_type,
                verifier,
                status,
            } => write!(
                f,
                "VerificationResolved(id={request_id}, subject={subject}, type={credential_type:?}, verifier={verifier}, status={status})"
            ),
            Self::VerifierAuthorizationChanged { verifier, enabled } => write!(
                f,
                "VerifierAuthorizationChanged(verifier={verifier}, enabled={enabled})"
            ),
        }
    }
}
