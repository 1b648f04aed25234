//! Edge case tests for the registry state machine.
//!
//! Drives `IdentityRegistry` directly through `CallContext`s, without a
//! ledger, to pin down error precedence and atomicity.

use identity_registry::{
    Address, CallContext, ContentHash, Decision, IdentityRegistry, RegistryError, RegistryEvent,
    Signer, VerificationStatus,
};

fn ctx(who: &Address, block: u64) -> CallContext {
    CallContext::new(*who, block, block * 1_000_000)
}

struct World {
    registry: IdentityRegistry,
    owner: Address,
    block: u64,
}

impl World {
    fn new() -> Self {
        let owner = Signer::generate("owner").address();
        Self {
            registry: IdentityRegistry::new(&ctx(&owner, 1)),
            owner,
            block: 1,
        }
    }

    fn at(&mut self, who: &Address) -> CallContext {
        self.block += 1;
        ctx(who, self.block)
    }

    fn register(&mut self, who: &Address) {
        let c = self.at(who);
        self.registry.create_identity(&c, "name", "contact").unwrap();
    }

    fn authorize(&mut self, verifier: &Address) {
        let owner = self.owner;
        let c = self.at(&owner);
        self.registry
            .set_authorized_verifier(&c, *verifier, true)
            .unwrap();
    }
}

fn addr(seed: u8) -> Address {
    Address([seed; 20])
}

#[test]
fn create_identity_twice_fails() {
    let mut w = World::new();
    let a = addr(1);
    w.register(&a);

    let c = w.at(&a);
    let err = w
        .registry
        .create_identity(&c, "other", "other@example.com")
        .unwrap_err();
    assert!(matches!(err, RegistryError::AlreadyExists(_)));
    assert_eq!(w.registry.identity(&a).unwrap().name, "name");
}

#[test]
fn empty_name_and_contact_accepted() {
    let mut w = World::new();
    let a = addr(1);
    let c = w.at(&a);
    w.registry.create_identity(&c, "", "").unwrap();
    assert!(w.registry.has_identity(&a));
}

#[test]
fn add_credential_requires_identity() {
    let mut w = World::new();
    let a = addr(1);
    let c = w.at(&a);
    let err = w
        .registry
        .add_credential(&c, "education", ContentHash::of(b"x"))
        .unwrap_err();
    assert_eq!(err, RegistryError::NotRegistered(a));
    assert!(w.registry.credentials(&a).is_empty());
}

#[test]
fn request_for_unknown_credential_fails() {
    let mut w = World::new();
    let a = addr(1);
    w.register(&a);

    let c = w.at(&a);
    let err = w
        .registry
        .request_verification(&c, "education", ContentHash::of(b"x"))
        .unwrap_err();
    assert!(matches!(err, RegistryError::UnknownCredential { .. }));
}

#[test]
fn request_with_mismatched_hash_fails() {
    let mut w = World::new();
    let a = addr(1);
    w.register(&a);
    let c = w.at(&a);
    w.registry
        .add_credential(&c, "education", ContentHash::of(b"real"))
        .unwrap();

    let c = w.at(&a);
    let err = w
        .registry
        .request_verification(&c, "education", ContentHash::of(b"forged"))
        .unwrap_err();
    assert!(matches!(err, RegistryError::UnknownCredential { .. }));
}

#[test]
fn request_without_identity_is_not_registered() {
    let mut w = World::new();
    let c = w.at(&addr(9));
    let err = w
        .registry
        .request_verification(&c, "education", ContentHash::of(b"x"))
        .unwrap_err();
    assert_eq!(err, RegistryError::NotRegistered(addr(9)));
}

#[test]
fn duplicate_pending_request_fails() {
    let mut w = World::new();
    let a = addr(1);
    let h = ContentHash::of(b"doc");
    w.register(&a);
    let c = w.at(&a);
    w.registry.add_credential(&c, "education", h).unwrap();
    let c = w.at(&a);
    w.registry.request_verification(&c, "education", h).unwrap();

    let c = w.at(&a);
    let err = w
        .registry
        .request_verification(&c, "education", h)
        .unwrap_err();
    assert!(matches!(err, RegistryError::AlreadyExists(_)));
    assert_eq!(w.registry.pending_verifications().len(), 1);
}

#[test]
fn unauthorized_resolution_checked_before_lookup() {
    let mut w = World::new();
    let stranger = addr(7);

    // No request exists at all: still Unauthorized, not NotFound.
    let c = w.at(&stranger);
    let err = w
        .registry
        .resolve_verification(&c, &addr(1), "education", Decision::Approve)
        .unwrap_err();
    assert!(matches!(err, RegistryError::Unauthorized(_)));

    // The owner is not implicitly a verifier.
    let owner = w.owner;
    let c = w.at(&owner);
    let err = w
        .registry
        .resolve_verification(&c, &addr(1), "education", Decision::Approve)
        .unwrap_err();
    assert!(matches!(err, RegistryError::Unauthorized(_)));
}

#[test]
fn authorized_verifier_without_request_gets_not_found() {
    let mut w = World::new();
    let v = addr(5);
    w.authorize(&v);

    let c = w.at(&v);
    let err = w
        .registry
        .resolve_verification(&c, &addr(1), "education", Decision::Reject)
        .unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(_)));
}

#[test]
fn resolved_request_cannot_be_resolved_again() {
    for decision in [Decision::Approve, Decision::Reject] {
        let mut w = World::new();
        let (a, v) = (addr(1), addr(2));
        let h = ContentHash::of(b"doc");
        w.register(&a);
        let c = w.at(&a);
        w.registry.add_credential(&c, "education", h).unwrap();
        let c = w.at(&a);
        w.registry.request_verification(&c, "education", h).unwrap();
        w.authorize(&v);

        let c = w.at(&v);
        w.registry
            .resolve_verification(&c, &a, "education", decision)
            .unwrap();
        let status = w.registry.verification(&a, "education").unwrap().status;
        assert_eq!(status, decision.status());

        for flip in [Decision::Approve, Decision::Reject] {
            let c = w.at(&v);
            let err = w
                .registry
                .resolve_verification(&c, &a, "education", flip)
                .unwrap_err();
            assert!(matches!(err, RegistryError::NotFound(_)));
        }
        assert_eq!(
            w.registry.verification(&a, "education").unwrap().status,
            status
        );
    }
}

#[test]
fn only_owner_sets_verifiers() {
    let mut w = World::new();
    let v = addr(3);

    let c = w.at(&v);
    let err = w
        .registry
        .set_authorized_verifier(&c, v, true)
        .unwrap_err();
    assert!(matches!(err, RegistryError::Unauthorized(_)));
    assert_eq!(w.registry.verifier_entry(&v), None);

    w.authorize(&v);
    assert!(w.registry.is_authorized_verifier(&v));

    let owner = w.owner;
    let c = w.at(&owner);
    w.registry.set_authorized_verifier(&c, v, false).unwrap();
    assert!(!w.registry.is_authorized_verifier(&v));
    assert_eq!(w.registry.verifier_entry(&v), Some(false));
    assert!(w.registry.authorized_verifiers().is_empty());
}

#[test]
fn revoked_verifier_loses_power() {
    let mut w = World::new();
    let (a, v) = (addr(1), addr(2));
    let h = ContentHash::of(b"doc");
    w.register(&a);
    let c = w.at(&a);
    w.registry.add_credential(&c, "education", h).unwrap();
    let c = w.at(&a);
    w.registry.request_verification(&c, "education", h).unwrap();
    w.authorize(&v);

    let owner = w.owner;
    let c = w.at(&owner);
    w.registry.set_authorized_verifier(&c, v, false).unwrap();

    let c = w.at(&v);
    let err = w
        .registry
        .resolve_verification(&c, &a, "education", Decision::Approve)
        .unwrap_err();
    assert!(matches!(err, RegistryError::Unauthorized(_)));
    assert_eq!(
        w.registry.verification(&a, "education").unwrap().status,
        VerificationStatus::Pending
    );
}

#[test]
fn overwriting_credential_withdraws_pending_request() {
    let mut w = World::new();
    let (a, v) = (addr(1), addr(2));
    w.register(&a);
    w.authorize(&v);
    let c = w.at(&a);
    w.registry
        .add_credential(&c, "education", ContentHash::of(b"v1"))
        .unwrap();
    let c = w.at(&a);
    w.registry
        .request_verification(&c, "education", ContentHash::of(b"v1"))
        .unwrap();

    let c = w.at(&a);
    let events = w
        .registry
        .add_credential(&c, "education", ContentHash::of(b"v2"))
        .unwrap();
    assert!(matches!(
        events.as_slice(),
        [
            RegistryEvent::CredentialAdded { replaced: true, .. },
            RegistryEvent::VerificationWithdrawn { .. }
        ]
    ));
    assert!(w.registry.pending_verifications().is_empty());

    let c = w.at(&v);
    let err = w
        .registry
        .resolve_verification(&c, &a, "education", Decision::Approve)
        .unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(_)));
}

#[test]
fn re_adding_same_hash_keeps_pending_request() {
    let mut w = World::new();
    let a = addr(1);
    let h = ContentHash::of(b"same");
    w.register(&a);
    let c = w.at(&a);
    w.registry.add_credential(&c, "education", h).unwrap();
    let c = w.at(&a);
    w.registry.request_verification(&c, "education", h).unwrap();

    let c = w.at(&a);
    let events = w.registry.add_credential(&c, "education", h).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(w.registry.pending_verifications().len(), 1);
}

#[test]
fn self_verification_allowed_for_authorized_verifier() {
    let mut w = World::new();
    let v = addr(2);
    let h = ContentHash::of(b"own doc");
    w.register(&v);
    w.authorize(&v);
    let c = w.at(&v);
    w.registry.add_credential(&c, "education", h).unwrap();
    let c = w.at(&v);
    w.registry.request_verification(&c, "education", h).unwrap();

    let c = w.at(&v);
    w.registry
        .resolve_verification(&c, &v, "education", Decision::Approve)
        .unwrap();
    assert!(w.registry.is_credential_verified(&v, "education"));
}

#[test]
fn credential_types_are_independent() {
    let mut w = World::new();
    let a = addr(1);
    w.register(&a);
    for t in ["education", "employment", "Education", ""] {
        let c = w.at(&a);
        w.registry
            .add_credential(&c, t, ContentHash::of(t.as_bytes()))
            .unwrap();
    }
    assert_eq!(w.registry.credentials(&a).len(), 4);
    assert_eq!(
        w.registry.credential(&a, "Education").unwrap().hash,
        ContentHash::of(b"Education")
    );
}

#[test]
fn failed_operations_leave_state_unchanged() {
    let mut w = World::new();
    let a = addr(1);
    w.register(&a);
    let before = w.registry.clone();

    let c = w.at(&a);
    let _ = w.registry.create_identity(&c, "again", "again");
    let _ = w
        .registry
        .request_verification(&c, "missing", ContentHash::of(b"x"));
    let _ = w
        .registry
        .resolve_verification(&c, &a, "missing", Decision::Approve);
    let _ = w.registry.set_authorized_verifier(&c, a, true);
    let _ = w
        .registry
        .add_credential(&ctx(&addr(8), 99), "education", ContentHash::of(b"x"));

    assert_eq!(w.registry, before);
}
