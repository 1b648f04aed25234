//! Storage layer for signer keys, ledger snapshots and deployment records.
//!
//! # Directory layout
//!
//! The default root is `~/.idreg/`:
//!
//! ```text
//! ~/.idreg/
//! ├── networks.json            (optional network overrides)
//! ├── keystore/
//! │   └── {account}.json
//! ├── networks/
//! │   └── {network}/
//! │       └── ledger.json
//! └── deployments/
//!     └── {network}.json
//! ```
//!
//! # Modules
//!
//! - [`keystore`]: encrypted signer files.
//! - [`ledger_store`]: ledger snapshots for persistent networks.
//! - [`deployment_store`]: latest deployment summary per network.

pub mod deployment_store;
pub mod keystore;
pub mod ledger_store;

use std::path::Path;

use crate::error::Result;

pub use deployment_store::DeploymentStore;
pub use keystore::{list_accounts, load_signer, read_public_info, save_signer, KeystoreAccount};
pub use ledger_store::LedgerStore;

/// Write `data` to `path` through a sibling temporary file and a rename.
///
/// Creates the parent directory if needed.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    std::fs::write(&tmp_path, data)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
