//! The ledger: a single-writer host for registry deployments.
//!
//! Each accepted transaction is mined into its own block. Validation runs
//! in full before anything is written: a rejected transaction costs no fee,
//! does not consume the sender's nonce and does not advance the chain.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::address::Address;
use crate::error::{LedgerError, RegistryResult, Result};
use crate::registry::{CallContext, IdentityRegistry, RegistryEvent};

use super::receipt::TxReceipt;
use super::transaction::{Call, SignedTransaction, TxHash};
use super::units::Wei;

/// Balance and nonce of one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub balance: Wei,
    /// Number of transactions this account has committed.
    pub nonce: u64,
}

/// Chain state: accounts, deployed registries and receipts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    chain_id: u64,
    block_gas_limit: u64,
    height: u64,
    accounts: BTreeMap<Address, Account>,
    contracts: BTreeMap<Address, IdentityRegistry>,
    receipts: BTreeMap<TxHash, TxReceipt>,
}

impl Ledger {
    /// An empty chain at height 0.
    pub fn new(chain_id: u64, block_gas_limit: u64) -> Self {
        Self {
            chain_id,
            block_gas_limit,
            height: 0,
            accounts: BTreeMap::new(),
            contracts: BTreeMap::new(),
            receipts: BTreeMap::new(),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn block_gas_limit(&self) -> u64 {
        self.block_gas_limit
    }

    /// Number of the latest block.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Credit an account (faucet / genesis allocation).
    pub fn fund(&mut self, address: Address, amount: Wei) {
        let account = self.accounts.entry(address).or_default();
        account.balance = account.balance.saturating_add(amount);
        debug!("funded {} with {} wei", address.short(), amount);
    }

    /// Account state; unknown accounts read as zero balance, nonce 0.
    pub fn account(&self, address: &Address) -> Account {
        self.accounts.get(address).copied().unwrap_or_default()
    }

    pub fn balance(&self, address: &Address) -> Wei {
        self.account(address).balance
    }

    pub fn nonce(&self, address: &Address) -> u64 {
        self.account(address).nonce
    }

    /// The registry deployed at `contract`.
    ///
    /// # Errors
    ///
    /// `UnknownContract` if nothing is deployed there.
    pub fn registry(&self, contract: &Address) -> Result<&IdentityRegistry> {
        self.contracts
            .get(contract)
            .ok_or(LedgerError::UnknownContract(*contract))
    }

    /// Addresses of all deployed registries.
    pub fn contracts(&self) -> Vec<Address> {
        self.contracts.keys().copied().collect()
    }

    pub fn receipt(&self, hash: &TxHash) -> Option<&TxReceipt> {
        self.receipts.get(hash)
    }

    pub fn receipt_count(&self) -> usize {
        self.receipts.len()
    }

    /// Validate, execute and mine one transaction.
    ///
    /// Checks, in order: chain id, hash/key/signature, nonce, target
    /// presence, gas limit against intrinsic gas and block limit, sender
    /// balance against the maximum fee, then the registry operation itself.
    ///
    /// # Errors
    ///
    /// Any failed check. State is unchanged on error.
    pub fn submit(&mut self, tx: &SignedTransaction) -> Result<TxReceipt> {
        let result = self.apply(tx);
        if let Err(e) = &result {
            debug!("rejected {} {}: {e}", tx.body.call.name(), tx.hash);
        }
        result
    }

    fn apply(&mut self, tx: &SignedTransaction) -> Result<TxReceipt> {
        let body = &tx.body;

        if body.chain_id != self.chain_id {
            return Err(LedgerError::ChainIdMismatch {
                expected: self.chain_id,
                provided: body.chain_id,
            });
        }

        tx.verify()?;

        let sender = self.account(&body.from);
        if body.nonce != sender.nonce {
            return Err(LedgerError::NonceMismatch {
                expected: sender.nonce,
                provided: body.nonce,
            });
        }

        match (body.call.is_deploy(), body.to) {
            (true, Some(_)) => {
                return Err(LedgerError::InvalidTransaction(
                    "deployment must not name a target address".into(),
                ))
            }
            (false, None) => {
                return Err(LedgerError::InvalidTransaction(format!(
                    "{} needs a target registry address",
                    body.call.name()
                )))
            }
            _ => {}
        }

        let gas_used = body.call.intrinsic_gas();
        if body.gas_limit < gas_used {
            return Err(LedgerError::GasLimitTooLow {
                required: gas_used,
                provided: body.gas_limit,
            });
        }
        if body.gas_limit > self.block_gas_limit {
            return Err(LedgerError::GasLimitExceedsBlock {
                limit: self.block_gas_limit,
                provided: body.gas_limit,
            });
        }

        let max_fee = body
            .max_fee()
            .ok_or_else(|| LedgerError::InvalidTransaction("fee overflows".into()))?;
        if sender.balance < max_fee {
            return Err(LedgerError::InsufficientFunds {
                required: max_fee,
                available: sender.balance,
            });
        }

        let block_number = self.height + 1;
        let ctx = CallContext::new(body.from, block_number, crate::time::now_micros());

        // Execute. Both arms leave state untouched on error.
        let (contract_address, events) = match (&body.call, body.to) {
            (Call::Deploy, _) => {
                let address = contract_address(&body.from, body.nonce)?;
                if self.contracts.contains_key(&address) {
                    return Err(LedgerError::InvalidTransaction(format!(
                        "contract already deployed at {address}"
                    )));
                }
                self.contracts
                    .insert(address, IdentityRegistry::new(&ctx));
                (
                    Some(address),
                    vec![RegistryEvent::RegistryDeployed { owner: body.from }],
                )
            }
            (_, None) => {
                return Err(LedgerError::InvalidTransaction(
                    "missing target registry address".into(),
                ))
            }
            (call, Some(to)) => {
                let registry = self
                    .contracts
                    .get_mut(&to)
                    .ok_or(LedgerError::UnknownContract(to))?;
                (None, execute(registry, &ctx, call)?)
            }
        };

        // Commit.
        let fee = Wei::from(gas_used) * body.gas_price;
        let account = self.accounts.entry(body.from).or_default();
        account.balance -= fee;
        account.nonce += 1;
        self.height = block_number;

        let receipt = TxReceipt {
            tx_hash: tx.hash.clone(),
            block_number,
            timestamp: ctx.timestamp,
            from: body.from,
            to: body.to,
            contract_address,
            method: body.call.name().to_string(),
            gas_used,
            gas_price: body.gas_price,
            fee,
            events,
        };
        self.receipts.insert(tx.hash.clone(), receipt.clone());

        info!(
            "block {}: {} from {} ({} gas)",
            block_number,
            body.call.name(),
            body.from.short(),
            gas_used
        );
        Ok(receipt)
    }
}

/// Dispatch a non-deploy call to the registry.
fn execute(
    registry: &mut IdentityRegistry,
    ctx: &CallContext,
    call: &Call,
) -> RegistryResult<Vec<RegistryEvent>> {
    match call {
        Call::CreateIdentity { name, contact } => registry.create_identity(ctx, name, contact),
        Call::AddCredential {
            credential_type,
            hash,
        } => registry.add_credential(ctx, credential_type, *hash),
        Call::RequestVerification {
            credential_type,
            hash,
        } => registry.request_verification(ctx, credential_type, *hash),
        Call::ResolveVerification {
            subject,
            credential_type,
            decision,
        } => registry.resolve_verification(ctx, subject, credential_type, *decision),
        Call::SetAuthorizedVerifier { verifier, enabled } => {
            registry.set_authorized_verifier(ctx, *verifier, *enabled)
        }
        // Deployments are handled by the ledger before dispatch.
        Call::Deploy => Ok(Vec::new()),
    }
}

/// Address of a registry deployed by `deployer` at `nonce`.
pub fn contract_address(deployer: &Address, nonce: u64) -> Result<Address> {
    let bytes = bincode::serialize(&(deployer, nonce))
        .map_err(|e| LedgerError::SerializationError(format!("contract address: {e}")))?;
    Ok(Address::from_digest(&Sha256::digest(&bytes).into()))
}
