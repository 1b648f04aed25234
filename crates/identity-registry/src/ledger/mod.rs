//! Ledger: the single-writer environment that hosts registries.
//!
//! - [`units`]: wei/ether amounts
//! - [`transaction`]: registry calls, signed transactions, gas costs
//! - [`receipt`]: receipts of committed transactions
//! - [`chain`]: accounts, deployments, block production

pub mod chain;
pub mod receipt;
pub mod transaction;
pub mod units;

pub use chain::{contract_address, Account, Ledger};
pub use receipt::TxReceipt;
pub use transaction::{Call, SignedTransaction, TransactionBody, TransactionBuilder, TxHash};
pub use units::{format_ether, parse_ether, Wei, ETHER, GWEI};
