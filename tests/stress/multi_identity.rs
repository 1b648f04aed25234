//! Stress test: many identities, credentials and verifications on one
//! registry.

use identity_registry::client::{GasSettings, RegistryClient};
use identity_registry::ledger::GWEI;
use identity_registry::{
    Call, ContentHash, Decision, Ledger, Signer, TransactionBuilder, VerificationStatus, ETHER,
};

const CHAIN: u64 = 31337;

fn setup(subjects: usize) -> (Ledger, Signer, Signer, Vec<Signer>, GasSettings) {
    let owner = Signer::generate("owner");
    let verifier = Signer::generate("verifier");
    let subjects: Vec<Signer> = (0..subjects)
        .map(|i| Signer::generate(format!("subject-{i}")))
        .collect();

    let mut ledger = Ledger::new(CHAIN, 30_000_000);
    ledger.fund(owner.address(), 100 * ETHER);
    ledger.fund(verifier.address(), 100 * ETHER);
    for s in &subjects {
        ledger.fund(s.address(), ETHER);
    }
    (
        ledger,
        owner,
        verifier,
        subjects,
        GasSettings {
            gas_price: GWEI,
            gas_limit: None,
        },
    )
}

#[test]
fn stress_100_identities_with_three_credentials() {
    let (mut ledger, owner, verifier, subjects, gas) = setup(100);
    let tx = TransactionBuilder::new(CHAIN, Call::Deploy)
        .gas_price(GWEI)
        .sign(&owner)
        .unwrap();
    let contract = ledger.submit(&tx).unwrap().contract_address.unwrap();

    RegistryClient::new(&mut ledger, &owner, contract, gas)
        .set_authorized_verifier(verifier.address(), true)
        .unwrap();

    let types = ["education", "employment", "license"];
    for (i, subject) in subjects.iter().enumerate() {
        let mut client = RegistryClient::new(&mut ledger, subject, contract, gas);
        client
            .create_identity(&format!("Subject {i}"), &format!("s{i}@example.com"))
            .unwrap();
        for t in types {
            let h = ContentHash::of(format!("{t}-{i}").as_bytes());
            client.add_credential(t, h).unwrap();
            client.request_verification(t, h).unwrap();
        }
    }

    let stats = ledger.registry(&contract).unwrap().stats();
    assert_eq!(stats.identities, 100);
    assert_eq!(stats.credentials, 300);
    assert_eq!(stats.pending_requests, 300);

    // Approve even subjects, reject odd ones.
    let mut v = RegistryClient::new(&mut ledger, &verifier, contract, gas);
    for (i, subject) in subjects.iter().enumerate() {
        let decision = if i % 2 == 0 {
            Decision::Approve
        } else {
            Decision::Reject
        };
        for t in types {
            v.resolve_verification(subject.address(), t, decision)
                .unwrap();
        }
    }

    let registry = ledger.registry(&contract).unwrap();
    let stats = registry.stats();
    assert_eq!(stats.pending_requests, 0);
    assert_eq!(stats.resolved_requests, 300);
    assert!(registry.pending_verifications().is_empty());

    for (i, subject) in subjects.iter().enumerate() {
        let expected = if i % 2 == 0 {
            VerificationStatus::Approved
        } else {
            VerificationStatus::Rejected
        };
        for t in types {
            assert_eq!(
                registry.verification(&subject.address(), t).unwrap().status,
                expected
            );
        }
    }

    // 1 deploy + 1 authorization + 100 * (1 + 3 + 3) + 300 resolutions.
    assert_eq!(ledger.height(), 1 + 1 + 700 + 300);
    assert_eq!(ledger.receipt_count() as u64, ledger.height());
}

#[test]
fn stress_request_ids_are_unique_and_increasing() {
    let (mut ledger, owner, _, subjects, gas) = setup(50);
    let tx = TransactionBuilder::new(CHAIN, Call::Deploy)
        .sign(&owner)
        .unwrap();
    let contract = ledger.submit(&tx).unwrap().contract_address.unwrap();

    for subject in &subjects {
        let mut client = RegistryClient::new(&mut ledger, subject, contract, gas);
        let h = ContentHash::of(subject.address().as_bytes());
        client.create_identity("s", "c").unwrap();
        client.add_credential("education", h).unwrap();
        client.request_verification("education", h).unwrap();
    }

    let pending = ledger.registry(&contract).unwrap().pending_verifications();
    assert_eq!(pending.len(), 50);
    for pair in pending.windows(2) {
        assert!(pair[0].id < pair[1].id);
    }
}

#[test]
fn stress_fees_accumulate_per_transaction() {
    let (mut ledger, owner, _, subjects, gas) = setup(1);
    let subject = &subjects[0];
    let tx = TransactionBuilder::new(CHAIN, Call::Deploy)
        .sign(&owner)
        .unwrap();
    let contract = ledger.submit(&tx).unwrap().contract_address.unwrap();

    let start = ledger.balance(&subject.address());
    let mut spent = 0;
    let mut client = RegistryClient::new(&mut ledger, subject, contract, gas);
    spent += client.create_identity("s", "c").unwrap().fee;
    for i in 0u8..20 {
        let h = ContentHash::of(&[i]);
        spent += client.add_credential("education", h).unwrap().fee;
    }
    // Failed calls cost nothing.
    assert!(client.create_identity("s", "c").is_err());

    assert_eq!(ledger.balance(&subject.address()), start - spent);
    assert_eq!(ledger.nonce(&subject.address()), 21);
}
