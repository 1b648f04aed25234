//! Identity registry: the core state machine.
//!
//! The registry owns three tables (identities, credentials, verification
//! requests) plus the verifier authorization map, and enforces who may
//! touch what:
//!
//! - any address may register exactly one identity for itself;
//! - an identity owner adds credentials and asks for their verification;
//! - an authorized verifier resolves pending requests;
//! - the contract owner (the deployer) grants and revokes verifier status.
//!
//! ## Verification request lifecycle
//!
//! ```text
//! Pending ──▶ Approved   (terminal)
//!    │
//!    └──────▶ Rejected   (terminal)
//! ```
//!
//! A pending request whose credential is overwritten with a different hash
//! is withdrawn. A terminal request is never re-opened; the subject may open
//! a new request with a new id instead.

pub mod event;
pub mod state;
pub mod types;

pub use event::RegistryEvent;
pub use state::IdentityRegistry;
pub use types::{
    CallContext, ContentHash, Credential, Decision, Identity, RegistryStats, RequestId,
    VerificationRequest, VerificationStatus,
};
