//! Network presets.
//!
//! Three networks are built in: `hardhat` (in-memory, discarded after each
//! command), `localhost` (a persistent local ledger) and `core_testnet2`.
//! A `networks.json` file in the data directory can override a preset or
//! add new networks; entries are whole [`NetworkConfig`] values keyed by
//! name.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::{LedgerError, Result};
use crate::ledger::{Ledger, Wei, ETHER, GWEI};

/// Name of the override file inside the data directory.
pub const NETWORKS_FILE: &str = "networks.json";

/// Default network for commands that do not name one.
pub const DEFAULT_NETWORK: &str = "localhost";

const LOCAL_CHAIN_ID: u64 = 31337;
const LOCAL_BLOCK_GAS_LIMIT: u64 = 30_000_000;
const DEV_ACCOUNT_COUNT: usize = 10;

/// Connection and gas parameters of one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub chain_id: u64,
    /// Gas price attached to transactions, in wei.
    pub gas_price: Wei,
    /// Fixed gas limit per transaction; `None` uses each call's intrinsic gas.
    #[serde(default)]
    pub gas_limit: Option<u64>,
    pub block_gas_limit: u64,
    /// Ephemeral networks start from genesis on every command.
    #[serde(default)]
    pub ephemeral: bool,
    /// How many accounts genesis funds.
    #[serde(default)]
    pub dev_accounts: usize,
    /// Genesis balance per funded account.
    #[serde(default)]
    pub initial_balance: Option<Wei>,
    #[serde(default)]
    pub explorer_url: Option<String>,
}

impl NetworkConfig {
    /// In-memory development network with ten funded accounts.
    pub fn hardhat() -> Self {
        Self {
            name: "hardhat".into(),
            chain_id: LOCAL_CHAIN_ID,
            gas_price: GWEI,
            gas_limit: None,
            block_gas_limit: LOCAL_BLOCK_GAS_LIMIT,
            ephemeral: true,
            dev_accounts: DEV_ACCOUNT_COUNT,
            initial_balance: Some(1000 * ETHER),
            explorer_url: None,
        }
    }

    /// Persistent local network.
    pub fn localhost() -> Self {
        Self {
            name: "localhost".into(),
            ephemeral: false,
            ..Self::hardhat()
        }
    }

    /// Core Testnet 2. Accounts start unfunded.
    pub fn core_testnet2() -> Self {
        Self {
            name: "core_testnet2".into(),
            chain_id: 1115,
            gas_price: 20 * GWEI,
            gas_limit: Some(8_000_000),
            block_gas_limit: 50_000_000,
            ephemeral: false,
            dev_accounts: 0,
            initial_balance: None,
            explorer_url: Some("https://scan.test2.btcs.network".into()),
        }
    }

    /// Explorer link for an address, if this network has an explorer.
    pub fn address_url(&self, address: &Address) -> Option<String> {
        self.explorer_url
            .as_ref()
            .map(|base| format!("{}/address/{address}", base.trim_end_matches('/')))
    }
}

impl Ledger {
    /// A fresh ledger for `config`, funding the first `dev_accounts` of
    /// `accounts` with the configured initial balance.
    pub fn genesis(config: &NetworkConfig, accounts: &[Address]) -> Self {
        let mut ledger = Ledger::new(config.chain_id, config.block_gas_limit);
        if let Some(balance) = config.initial_balance {
            for address in accounts.iter().take(config.dev_accounts) {
                ledger.fund(*address, balance);
            }
        }
        ledger
    }
}

/// The set of known networks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Networks {
    networks: BTreeMap<String, NetworkConfig>,
}

impl Default for Networks {
    fn default() -> Self {
        let networks = [
            NetworkConfig::hardhat(),
            NetworkConfig::localhost(),
            NetworkConfig::core_testnet2(),
        ]
        .into_iter()
        .map(|n| (n.name.clone(), n))
        .collect();
        Self { networks }
    }
}

impl Networks {
    /// Built-in presets merged with `{data_dir}/networks.json`, if present.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let mut networks = Self::default();
        let path = data_dir.join(NETWORKS_FILE);
        if !path.exists() {
            return Ok(networks);
        }

        let json = std::fs::read_to_string(&path)?;
        let overrides: BTreeMap<String, NetworkConfig> = serde_json::from_str(&json)
            .map_err(|e| LedgerError::InvalidFileFormat(format!("{}: {e}", path.display())))?;
        for (name, mut config) in overrides {
            config.name = name.clone();
            log::debug!("network override: {name}");
            networks.networks.insert(name, config);
        }
        Ok(networks)
    }

    /// Look up a network by name.
    pub fn get(&self, name: &str) -> Result<&NetworkConfig> {
        self.networks.get(name).ok_or_else(|| {
            LedgerError::Network(format!(
                "unknown network '{name}' (known: {})",
                self.names().join(", ")
            ))
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.networks.keys().map(String::as_str).collect()
    }
}
