//! Integration test: full end-to-end workflow.
//!
//! Tests the complete lifecycle on a local ledger:
//! 1. Deploy a registry
//! 2. Register an identity and attach a credential
//! 3. Request verification
//! 4. Authorize a verifier and resolve the request
//! 5. Persist the ledger and deployment record, reload, and continue

use identity_registry::client::{GasSettings, RegistryClient};
use identity_registry::config::NetworkConfig;
use identity_registry::deploy::deploy_registry;
use identity_registry::storage::{DeploymentStore, LedgerStore};
use identity_registry::{
    ContentHash, Decision, Ledger, RegistryError, RegistryEvent, Signer, VerificationStatus,
};

#[test]
fn full_workflow_deploy_to_approval() {
    let network = NetworkConfig::hardhat();
    let owner = Signer::generate("owner");
    let alice = Signer::generate("alice");
    let verifier = Signer::generate("verifier");
    let mut ledger = Ledger::genesis(
        &network,
        &[owner.address(), alice.address(), verifier.address()],
    );
    let gas = GasSettings::for_network(&network);

    // ── Step 1: Deploy ──────────────────────────────────────────────────
    let outcome = deploy_registry(&mut ledger, &network, &owner, &gas)
        .expect("deployment should succeed on a funded account");
    let contract = outcome.contract_address;

    assert_eq!(outcome.contract_owner, owner.address());
    assert!(
        !outcome.deployer_is_verifier,
        "deployer must not be an authorized verifier right after deployment"
    );
    assert!(!ledger
        .registry(&contract)
        .unwrap()
        .is_authorized_verifier(&owner.address()));

    // ── Step 2: Identity and credential ─────────────────────────────────
    let h = ContentHash::of(b"BSc Computer Science, 2020");
    {
        let mut client = RegistryClient::new(&mut ledger, &alice, contract, gas);
        client
            .create_identity("John Doe", "john@example.com")
            .expect("createIdentity should succeed");
        client
            .add_credential("education", h)
            .expect("addCredential should succeed");

        // ── Step 3: Request verification ────────────────────────────────
        let receipt = client
            .request_verification("education", h)
            .expect("requestVerification should succeed");
        assert_eq!(receipt.event_names(), vec!["VerificationRequested"]);
    }

    let registry = ledger.registry(&contract).unwrap();
    let request = registry.verification(&alice.address(), "education").unwrap();
    assert_eq!(request.status, VerificationStatus::Pending);
    assert_eq!(request.hash, h);
    assert_eq!(registry.pending_verifications().len(), 1);

    // ── Step 4: Authorize and resolve ───────────────────────────────────
    RegistryClient::new(&mut ledger, &owner, contract, gas)
        .set_authorized_verifier(verifier.address(), true)
        .expect("owner can authorize verifiers");

    let mut v = RegistryClient::new(&mut ledger, &verifier, contract, gas);
    let receipt = v
        .resolve_verification(alice.address(), "education", Decision::Approve)
        .expect("authorized verifier resolves pending request");
    assert!(matches!(
        receipt.events.as_slice(),
        [RegistryEvent::VerificationResolved {
            status: VerificationStatus::Approved,
            ..
        }]
    ));

    let again = v
        .resolve_verification(alice.address(), "education", Decision::Approve)
        .unwrap_err();
    assert!(matches!(
        again.registry_error(),
        Some(RegistryError::NotFound(_))
    ));

    let registry = ledger.registry(&contract).unwrap();
    let request = registry.verification(&alice.address(), "education").unwrap();
    assert_eq!(request.status, VerificationStatus::Approved);
    assert_eq!(request.resolved_by, Some(verifier.address()));
    assert!(registry.is_credential_verified(&alice.address(), "education"));
    assert!(registry.pending_verifications().is_empty());

    // ── Step 5: Persist, reload, continue ───────────────────────────────
    let dir = tempfile::tempdir().unwrap();
    let ledger_store = LedgerStore::new(dir.path().join("networks").join("localhost"));
    let deployments = DeploymentStore::new(dir.path().join("deployments")).unwrap();
    ledger_store.save(&ledger).unwrap();
    deployments.save(&outcome.info).unwrap();

    let mut reloaded = ledger_store.load().unwrap();
    let recorded = deployments.load_latest("hardhat").unwrap().unwrap();
    assert_eq!(recorded.contract_address, contract);
    assert_eq!(reloaded.height(), ledger.height());

    // Alice updates the credential; the approval no longer covers it.
    let h2 = ContentHash::of(b"MSc Computer Science, 2022");
    RegistryClient::new(&mut reloaded, &alice, contract, gas)
        .add_credential("education", h2)
        .unwrap();
    let registry = reloaded.registry(&contract).unwrap();
    assert!(!registry.is_credential_verified(&alice.address(), "education"));
    assert_eq!(
        registry
            .verification_history(&alice.address(), "education")
            .len(),
        1
    );
}

#[test]
fn full_workflow_rejection_then_new_request() {
    let network = NetworkConfig::hardhat();
    let owner = Signer::generate("owner");
    let bob = Signer::generate("bob");
    let mut ledger = Ledger::genesis(&network, &[owner.address(), bob.address()]);
    let gas = GasSettings::for_network(&network);
    let contract = deploy_registry(&mut ledger, &network, &owner, &gas)
        .unwrap()
        .contract_address;

    // The owner authorizes itself.
    RegistryClient::new(&mut ledger, &owner, contract, gas)
        .set_authorized_verifier(owner.address(), true)
        .unwrap();

    let h = ContentHash::of(b"employment letter");
    {
        let mut client = RegistryClient::new(&mut ledger, &bob, contract, gas);
        client.create_identity("Bob", "bob@example.com").unwrap();
        client.add_credential("employment", h).unwrap();
        client.request_verification("employment", h).unwrap();
    }

    RegistryClient::new(&mut ledger, &owner, contract, gas)
        .resolve_verification(bob.address(), "employment", Decision::Reject)
        .unwrap();
    assert!(!ledger
        .registry(&contract)
        .unwrap()
        .is_credential_verified(&bob.address(), "employment"));

    // A rejected request can be followed by a fresh one.
    RegistryClient::new(&mut ledger, &bob, contract, gas)
        .request_verification("employment", h)
        .unwrap();
    RegistryClient::new(&mut ledger, &owner, contract, gas)
        .resolve_verification(bob.address(), "employment", Decision::Approve)
        .unwrap();

    let registry = ledger.registry(&contract).unwrap();
    let history = registry.verification_history(&bob.address(), "employment");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, VerificationStatus::Rejected);
    assert_eq!(history[1].status, VerificationStatus::Approved);
    assert!(history[0].id < history[1].id);
    assert!(registry.is_credential_verified(&bob.address(), "employment"));
}
