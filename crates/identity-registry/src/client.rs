//! Per-signer registry client.
//!
//! [`RegistryClient`] turns registry operations into signed transactions:
//! it looks up the signer's current nonce, applies the network's gas
//! settings, signs, and submits to the ledger.

use log::debug;

use crate::address::Address;
use crate::config::NetworkConfig;
use crate::error::Result;
use crate::ledger::{Call, Ledger, TransactionBuilder, TxReceipt, Wei};
use crate::registry::{ContentHash, Decision, IdentityRegistry};
use crate::signer::Signer;

/// Gas parameters attached to outgoing transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasSettings {
    pub gas_price: Wei,
    /// Fixed limit; `None` uses each call's intrinsic gas.
    pub gas_limit: Option<u64>,
}

impl GasSettings {
    /// The network's configured price and limit.
    pub fn for_network(network: &NetworkConfig) -> Self {
        Self {
            gas_price: network.gas_price,
            gas_limit: network.gas_limit,
        }
    }

    /// Override the gas limit.
    pub fn with_gas_limit(mut self, gas_limit: Option<u64>) -> Self {
        if gas_limit.is_some() {
            self.gas_limit = gas_limit;
        }
        self
    }

    pub(crate) fn apply(&self, builder: TransactionBuilder) -> TransactionBuilder {
        let builder = builder.gas_price(self.gas_price);
        match self.gas_limit {
            Some(limit) => builder.gas_limit(limit),
            None => builder,
        }
    }
}

/// A signer bound to one deployed registry on a ledger.
pub struct RegistryClient<'a> {
    ledger: &'a mut Ledger,
    signer: &'a Signer,
    contract: Address,
    gas: GasSettings,
}

impl<'a> RegistryClient<'a> {
    pub fn new(
        ledger: &'a mut Ledger,
        signer: &'a Signer,
        contract: Address,
        gas: GasSettings,
    ) -> Self {
        Self {
            ledger,
            signer,
            contract,
            gas,
        }
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Read-only view of the registry.
    pub fn registry(&self) -> Result<&IdentityRegistry> {
        self.ledger.registry(&self.contract)
    }

    pub fn create_identity(&mut self, name: &str, contact: &str) -> Result<TxReceipt> {
        self.send(Call::CreateIdentity {
            name: name.to_string(),
            contact: contact.to_string(),
        })
    }

    pub fn add_credential(
        &mut self,
        credential_type: &str,
        hash: ContentHash,
    ) -> Result<TxReceipt> {
        self.send(Call::AddCredential {
            credential_type: credential_type.to_string(),
            hash,
        })
    }

    pub fn request_verification(
        &mut self,
        credential_type: &str,
        hash: ContentHash,
    ) -> Result<TxReceipt> {
        self.send(Call::RequestVerification {
            credential_type: credential_type.to_string(),
            hash,
        })
    }

    pub fn resolve_verification(
        &mut self,
        subject: Address,
        credential_type: &str,
        decision: Decision,
    ) -> Result<TxReceipt> {
        self.send(Call::ResolveVerification {
            subject,
            credential_type: credential_type.to_string(),
            decision,
        })
    }

    pub fn set_authorized_verifier(
        &mut self,
        verifier: Address,
        enabled: bool,
    ) -> Result<TxReceipt> {
        self.send(Call::SetAuthorizedVerifier { verifier, enabled })
    }

    fn send(&mut self, call: Call) -> Result<TxReceipt> {
        let nonce = self.ledger.nonce(&self.signer.address());
        debug!(
            "{} sending {} (nonce {nonce})",
            self.signer.address().short(),
            call.name()
        );
        let builder = TransactionBuilder::new(self.ledger.chain_id(), call)
            .to(self.contract)
            .nonce(nonce);
        let tx = self.gas.apply(builder).sign(self.signer)?;
        self.ledger.submit(&tx)
    }
}
