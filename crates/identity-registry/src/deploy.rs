//! Registry deployment.
//!
//! [`deploy_registry`] submits the deployment transaction, then reads back
//! the initial state (owner, and whether the deployer is an authorized
//! verifier, which it is not until the owner says so) and produces a
//! [`DeploymentInfo`] summary for the deployment store.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::client::GasSettings;
use crate::config::NetworkConfig;
use crate::error::{LedgerError, Result};
use crate::ledger::{format_ether, Call, Ledger, TransactionBuilder, TxHash, TxReceipt, Wei};
use crate::signer::Signer;

/// Balance below which deployment logs a warning (0.01 ETH).
pub const LOW_BALANCE_THRESHOLD: Wei = 10_000_000_000_000_000;

/// Summary of a deployment, persisted per network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentInfo {
    pub network: String,
    pub contract_address: Address,
    pub deployer_address: Address,
    pub transaction_hash: TxHash,
    pub block_number: u64,
    /// RFC 3339.
    pub timestamp: String,
    pub gas_used: u64,
    pub contract_owner: Address,
}

/// Result of a successful deployment.
#[derive(Debug, Clone)]
pub struct DeploymentOutcome {
    pub contract_address: Address,
    pub receipt: TxReceipt,
    pub contract_owner: Address,
    pub deployer_is_verifier: bool,
    /// Deployer balance before deployment was below [`LOW_BALANCE_THRESHOLD`].
    pub low_balance: bool,
    pub info: DeploymentInfo,
}

/// Deploy a new registry owned by `deployer`.
///
/// # Errors
///
/// Any ledger rejection, typically `InsufficientFunds` or a gas limit
/// error. See [`remediation_hint`].
pub fn deploy_registry(
    ledger: &mut Ledger,
    network: &NetworkConfig,
    deployer: &Signer,
    gas: &GasSettings,
) -> Result<DeploymentOutcome> {
    let deployer_address = deployer.address();
    let balance = ledger.balance(&deployer_address);
    info!(
        "deploying registry on {} from {} (balance {} ETH)",
        network.name,
        deployer_address,
        format_ether(balance)
    );
    let low_balance = balance < LOW_BALANCE_THRESHOLD;
    if low_balance {
        warn!("low balance: make sure the deployer has enough ETH for deployment");
    }

    let builder = TransactionBuilder::new(ledger.chain_id(), Call::Deploy)
        .nonce(ledger.nonce(&deployer_address));
    let tx = gas.apply(builder).sign(deployer)?;
    let receipt = ledger.submit(&tx)?;

    let contract_address = receipt.contract_address.ok_or_else(|| {
        LedgerError::InvalidTransaction("deployment receipt has no contract address".into())
    })?;
    let registry = ledger.registry(&contract_address)?;
    let contract_owner = registry.contract_owner();
    let deployer_is_verifier = registry.is_authorized_verifier(&deployer_address);

    let info = DeploymentInfo {
        network: network.name.clone(),
        contract_address,
        deployer_address,
        transaction_hash: receipt.tx_hash.clone(),
        block_number: receipt.block_number,
        timestamp: crate::time::micros_to_rfc3339(receipt.timestamp),
        gas_used: receipt.gas_used,
        contract_owner,
    };
    info!("registry deployed at {contract_address} in block {}", receipt.block_number);

    Ok(DeploymentOutcome {
        contract_address,
        receipt,
        contract_owner,
        deployer_is_verifier,
        low_balance,
        info,
    })
}

/// A suggested fix for a failed deployment, when one applies.
pub fn remediation_hint(error: &LedgerError) -> Option<&'static str> {
    match error {
        LedgerError::InsufficientFunds { .. } => Some("Add more ETH to your deployer account"),
        LedgerError::Network(_) => {
            Some("Check the network name and that its node has been initialized")
        }
        LedgerError::GasLimitTooLow { .. } | LedgerError::GasLimitExceedsBlock { .. } => {
            Some("Try increasing gas limit or gas price")
        }
        _ => None,
    }
}

/// Explorer link for a deployed contract, if the network has an explorer.
pub fn contract_url(network: &NetworkConfig, contract: &Address) -> Option<String> {
    network.address_url(contract)
}
