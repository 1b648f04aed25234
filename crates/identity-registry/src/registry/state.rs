//! The registry tables and the five state-changing operations.
//!
//! Every operation checks all of its preconditions before it writes
//! anything, so an `Err` return always leaves the registry untouched.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::{RegistryError, RegistryResult};

use super::event::RegistryEvent;
use super::types::{
    CallContext, ContentHash, Credential, Decision, Identity, RegistryStats, RequestId,
    VerificationRequest, VerificationStatus,
};

/// One deployed identity registry.
///
/// Maps are ordered and key-unique. A missing key means "never written":
/// no identity, no credential, no request, and for the verifier map, not
/// authorized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRegistry {
    owner: Address,
    deployed_at: u64,
    deployed_block: u64,
    next_request_id: u64,
    verifiers: BTreeMap<Address, bool>,
    identities: BTreeMap<Address, Identity>,
    credentials: BTreeMap<Address, BTreeMap<String, Credential>>,
    /// Request history per (subject, type); only the last entry can be pending.
    requests: BTreeMap<Address, BTreeMap<String, Vec<VerificationRequest>>>,
}

impl IdentityRegistry {
    /// Create an empty registry owned by the deploying caller.
    ///
    /// The deployer is not an authorized verifier until it grants itself
    /// that status.
    pub fn new(ctx: &CallContext) -> Self {
        Self {
            owner: ctx.caller,
            deployed_at: ctx.timestamp,
            deployed_block: ctx.block_number,
            next_request_id: 1,
            verifiers: BTreeMap::new(),
            identities: BTreeMap::new(),
            credentials: BTreeMap::new(),
            requests: BTreeMap::new(),
        }
    }

    // ── Operations ────────────────────────────────────────────────────────────

    /// Register the caller's identity.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if the caller already has an identity.
    pub fn create_identity(
        &mut self,
        ctx: &CallContext,
        name: &str,
        contact: &str,
    ) -> RegistryResult<Vec<RegistryEvent>> {
        if self.identities.contains_key(&ctx.caller) {
            return Err(RegistryError::AlreadyExists(format!(
                "identity for {}",
                ctx.caller
            )));
        }

        self.identities.insert(
            ctx.caller,
            Identity {
                owner: ctx.caller,
                name: name.to_string(),
                contact: contact.to_string(),
                created_at: ctx.timestamp,
                created_block: ctx.block_number,
            },
        );
        debug!("identity created for {}", ctx.caller.short());

        Ok(vec![RegistryEvent::IdentityCreated {
            subject: ctx.caller,
            name: name.to_string(),
        }])
    }

    /// Add or overwrite the caller's credential of the given type.
    ///
    /// Overwriting with a different hash withdraws a pending verification
    /// request for that type, since it refers to the old hash.
    ///
    /// # Errors
    ///
    /// `NotRegistered` if the caller has no identity.
    pub fn add_credential(
        &mut self,
        ctx: &CallContext,
        credential_type: &str,
        hash: ContentHash,
    ) -> RegistryResult<Vec<RegistryEvent>> {
        self.require_identity(&ctx.caller)?;

        let previous = self
            .credentials
            .entry(ctx.caller)
            .or_default()
            .insert(
                credential_type.to_string(),
                Credential {
                    subject: ctx.caller,
                    credential_type: credential_type.to_string(),
                    hash,
                    added_at: ctx.timestamp,
                    added_block: ctx.block_number,
                },
            );

        let mut events = vec![RegistryEvent::CredentialAdded {
            subject: ctx.caller,
            credential_type: credential_type.to_string(),
            hash,
            replaced: previous.is_some(),
        }];

        if previous.is_some_and(|old| old.hash != hash) {
            if let Some(withdrawn) = self.withdraw_pending(&ctx.caller, credential_type) {
                debug!(
                    "verification {} withdrawn: credential '{}' replaced",
                    withdrawn.id, credential_type
                );
                events.push(RegistryEvent::VerificationWithdrawn {
                    request_id: withdrawn.id,
                    subject: ctx.caller,
                    credential_type: credential_type.to_string(),
                });
            }
        }

        debug!(
            "credential '{}' recorded for {}",
            credential_type,
            ctx.caller.short()
        );
        Ok(events)
    }

    /// Ask for verification of one of the caller's credentials.
    ///
    /// # Errors
    ///
    /// - `NotRegistered` if the caller has no identity.
    /// - `UnknownCredential` if the caller holds no credential of this type
    ///   with this hash.
    /// - `AlreadyExists` if a request for this type is already pending.
    pub fn request_verification(
        &mut self,
        ctx: &CallContext,
        credential_type: &str,
        hash: ContentHash,
    ) -> RegistryResult<Vec<RegistryEvent>> {
        self.require_identity(&ctx.caller)?;

        match self.credential(&ctx.caller, credential_type) {
            Some(credential) if credential.hash == hash => {}
            _ => {
                return Err(RegistryError::UnknownCredential {
                    subject: ctx.caller,
                    credential_type: credential_type.to_string(),
                })
            }
        }

        if let Some(pending) = self.pending_request(&ctx.caller, credential_type) {
            return Err(RegistryError::AlreadyExists(format!(
                "verification {} for '{}' is still pending",
                pending.id, credential_type
            )));
        }

        let id = RequestId(self.next_request_id);
        self.next_request_id += 1;

        self.requests
            .entry(ctx.caller)
            .or_default()
            .entry(credential_type.to_string())
            .or_default()
            .push(VerificationRequest {
                id,
                subject: ctx.caller,
                credential_type: credential_type.to_string(),
                hash,
                status: VerificationStatus::Pending,
                requested_at: ctx.timestamp,
                resolved_by: None,
                resolved_at: None,
            });
        debug!(
            "verification {} requested by {} for '{}'",
            id,
            ctx.caller.short(),
            credential_type
        );

        Ok(vec![RegistryEvent::VerificationRequested {
            request_id: id,
            subject: ctx.caller,
            credential_type: credential_type.to_string(),
            hash,
        }])
    }

    /// Approve or reject a subject's pending request.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if the caller is not an authorized verifier. This is
    ///   checked before the request lookup.
    /// - `NotFound` if no request for (subject, type) is pending.
    pub fn resolve_verification(
        &mut self,
        ctx: &CallContext,
        subject: &Address,
        credential_type: &str,
        decision: Decision,
    ) -> RegistryResult<Vec<RegistryEvent>> {
        if !self.is_authorized_verifier(&ctx.caller) {
            return Err(RegistryError::Unauthorized(format!(
                "{} is not an authorized verifier",
                ctx.caller
            )));
        }

        let request = self
            .requests
            .get_mut(subject)
            .and_then(|by_type| by_type.get_mut(credential_type))
            .and_then(|history| history.last_mut())
            .filter(|r| r.status == VerificationStatus::Pending)
            .ok_or_else(|| {
                RegistryError::NotFound(format!(
                    "no pending verification for '{credential_type}' of {subject}"
                ))
            })?;

        request.status = decision.status();
        request.resolved_by = Some(ctx.caller);
        request.resolved_at = Some(ctx.timestamp);
        debug!(
            "verification {} {} by {}",
            request.id,
            request.status,
            ctx.caller.short()
        );

        Ok(vec![RegistryEvent::VerificationResolved {
            request_id: request.id,
            subject: *subject,
            credential_type: credential_type.to_string(),
            verifier: ctx.caller,
            status: request.status,
        }])
    }

    /// Grant or revoke verifier status. Owner only.
    ///
    /// Revocation stores an explicit `false` rather than removing the entry.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the caller is not the contract owner.
    pub fn set_authorized_verifier(
        &mut self,
        ctx: &CallContext,
        verifier: Address,
        enabled: bool,
    ) -> RegistryResult<Vec<RegistryEvent>> {
        if ctx.caller != self.owner {
            return Err(RegistryError::Unauthorized(format!(
                "{} is not the contract owner",
                ctx.caller
            )));
        }

        self.verifiers.insert(verifier, enabled);
        debug!("verifier {} enabled={}", verifier.short(), enabled);

        Ok(vec![RegistryEvent::VerifierAuthorizationChanged { verifier, enabled }])
    }

    // ── Reads ─────────────────────────────────────────────────────────────────

    pub fn contract_owner(&self) -> Address {
        self.owner
    }

    pub fn deployed_at(&self) -> u64 {
        self.deployed_at
    }

    pub fn deployed_block(&self) -> u64 {
        self.deployed_block
    }

    /// `true` only for an explicit `true` entry; absent reads as `false`.
    pub fn is_authorized_verifier(&self, address: &Address) -> bool {
        self.verifiers.get(address).copied().unwrap_or(false)
    }

    /// The raw verifier entry: `None` if the owner never wrote one.
    pub fn verifier_entry(&self, address: &Address) -> Option<bool> {
        self.verifiers.get(address).copied()
    }

    /// Currently authorized verifiers, in address order.
    pub fn authorized_verifiers(&self) -> Vec<Address> {
        self.verifiers
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(addr, _)| *addr)
            .collect()
    }

    pub fn identity(&self, address: &Address) -> Option<&Identity> {
        self.identities.get(address)
    }

    pub fn has_identity(&self, address: &Address) -> bool {
        self.identities.contains_key(address)
    }

    pub fn credential(&self, subject: &Address, credential_type: &str) -> Option<&Credential> {
        self.credentials
            .get(subject)
            .and_then(|by_type| by_type.get(credential_type))
    }

    /// All credentials of a subject, ordered by type.
    pub fn credentials(&self, subject: &Address) -> Vec<&Credential> {
        self.credentials
            .get(subject)
            .map(|by_type| by_type.values().collect())
            .unwrap_or_default()
    }

    /// The most recent request for (subject, type), whatever its status.
    pub fn verification(
        &self,
        subject: &Address,
        credential_type: &str,
    ) -> Option<&VerificationRequest> {
        self.verification_history(subject, credential_type).last()
    }

    /// Every request ever made for (subject, type), oldest first.
    /// Withdrawn requests are not kept.
    pub fn verification_history(
        &self,
        subject: &Address,
        credential_type: &str,
    ) -> &[VerificationRequest] {
        self.requests
            .get(subject)
            .and_then(|by_type| by_type.get(credential_type))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All pending requests, ordered by request id.
    pub fn pending_verifications(&self) -> Vec<&VerificationRequest> {
        let mut pending: Vec<&VerificationRequest> = self
            .requests
            .values()
            .flat_map(|by_type| by_type.values())
            .filter_map(|history| history.last())
            .filter(|r| r.status == VerificationStatus::Pending)
            .collect();
        pending.sort_by_key(|r| r.id);
        pending
    }

    /// Whether the subject's current credential of this type carries an
    /// approval for exactly its current hash.
    pub fn is_credential_verified(&self, subject: &Address, credential_type: &str) -> bool {
        let Some(credential) = self.credential(subject, credential_type) else {
            return false;
        };
        self.verification_history(subject, credential_type)
            .iter()
            .rev()
            .find(|r| r.status.is_terminal())
            .is_some_and(|r| r.status == VerificationStatus::Approved && r.hash == credential.hash)
    }

    pub fn stats(&self) -> RegistryStats {
        let mut stats = RegistryStats {
            identities: self.identities.len(),
            credentials: self.credentials.values().map(BTreeMap::len).sum(),
            authorized_verifiers: self.verifiers.values().filter(|v| **v).count(),
            ..RegistryStats::default()
        };
        for request in self
            .requests
            .values()
            .flat_map(|by_type| by_type.values())
            .flatten()
        {
            if request.status.is_terminal() {
                stats.resolved_requests += 1;
            } else {
                stats.pending_requests += 1;
            }
        }
        stats
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn require_identity(&self, caller: &Address) -> RegistryResult<()> {
        if self.identities.contains_key(caller) {
            Ok(())
        } else {
            Err(RegistryError::NotRegistered(*caller))
        }
    }

    fn pending_request(
        &self,
        subject: &Address,
        credential_type: &str,
    ) -> Option<&VerificationRequest> {
        self.verification(subject, credential_type)
            .filter(|r| r.status == VerificationStatus::Pending)
    }

    /// Remove and return the pending request for (subject, type), if any.
    fn withdraw_pending(
        &mut self,
        subject: &Address,
        credential_type: &str,
    ) -> Option<VerificationRequest> {
        let by_type = self.requests.get_mut(subject)?;
        let history = by_type.get_mut(credential_type)?;
        if history.last()?.status != VerificationStatus::Pending {
            return None;
        }
        let withdrawn = history.pop();
        if history.is_empty() {
            by_type.remove(credential_type);
        }
        withdrawn
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
