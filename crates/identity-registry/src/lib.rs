//! Identity Registry: decentralized identities, credentials and
//! verifier-gated verification requests.
//!
//! The [`registry`] module is the core state machine. Everything around it
//! is the hosting environment: a single-writer [`ledger`] that authenticates
//! callers by signature and meters gas, an encrypted [`storage`] layer for
//! signer keys and ledger snapshots, named [`config`] network presets, and
//! the [`deploy`] flow that provisions a registry and reports its initial
//! state.

pub mod address;
pub mod client;
pub mod config;
pub mod crypto;
pub mod deploy;
pub mod error;
pub mod ledger;
pub mod registry;
pub mod signer;
pub mod storage;
pub mod time;

// Re-export primary types
pub use address::Address;
pub use error::{LedgerError, ParseError, RegistryError, RegistryResult, Result};
pub use registry::{
    CallContext, ContentHash, Credential, Decision, Identity, IdentityRegistry, RegistryEvent,
    RegistryStats, RequestId, VerificationRequest, VerificationStatus,
};
pub use signer::Signer;

// Re-export ledger types
pub use ledger::{
    format_ether, parse_ether, Account, Call, Ledger, SignedTransaction, TransactionBody,
    TransactionBuilder, TxHash, TxReceipt, Wei, ETHER, GWEI,
};

// Re-export collaborator types
pub use client::{GasSettings, RegistryClient};
pub use config::{NetworkConfig, Networks};
pub use deploy::{deploy_registry, remediation_hint, DeploymentInfo, DeploymentOutcome};
