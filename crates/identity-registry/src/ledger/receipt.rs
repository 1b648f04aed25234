//! Transaction receipts.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::registry::RegistryEvent;

use super::transaction::TxHash;
use super::units::Wei;

/// Record of a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// Block timestamp (microseconds since epoch).
    pub timestamp: u64,
    pub from: Address,
    pub to: Option<Address>,
    /// Set for deployments.
    pub contract_address: Option<Address>,
    /// Contract-level method name (`createIdentity`, ...).
    pub method: String,
    pub gas_used: u64,
    pub gas_price: Wei,
    pub fee: Wei,
    pub events: Vec<RegistryEvent>,
}

impl TxReceipt {
    /// Names of the emitted events, in order.
    pub fn event_names(&self) -> Vec<&'static str> {
        self.events.iter().map(RegistryEvent::name).collect()
    }
}
