//! Ledger snapshots for persistent networks.
//!
//! File format:
//! ```json
//! {
//!     "version": 1,
//!     "saved_at": 1700000000000000,
//!     "ledger": { ... Ledger ... }
//! }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::ledger::Ledger;

use super::write_atomic;

const LEDGER_FILE_VERSION: u32 = 1;
const LEDGER_FILE_NAME: &str = "ledger.json";

#[derive(Debug, Serialize, Deserialize)]
struct LedgerFile {
    version: u32,
    saved_at: u64,
    ledger: Ledger,
}

/// Filesystem-backed snapshot of one network's ledger.
///
/// Safe for single-process use; concurrent writers are not coordinated.
pub struct LedgerStore {
    dir: PathBuf,
}

impl LedgerStore {
    /// Store rooted at `dir`. Nothing is created until the first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(LEDGER_FILE_NAME)
    }

    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Load the snapshot.
    ///
    /// # Errors
    ///
    /// `Network` if no snapshot exists (the node was never initialized),
    /// `InvalidFileFormat` for a malformed or unsupported file.
    pub fn load(&self) -> Result<Ledger> {
        let path = self.path();
        if !path.exists() {
            return Err(LedgerError::Network(format!(
                "no ledger at {} (run `idreg node init` first)",
                self.dir.display()
            )));
        }

        let bytes = std::fs::read(&path)?;
        let file: LedgerFile = serde_json::from_slice(&bytes).map_err(|e| {
            LedgerError::InvalidFileFormat(format!("failed to parse ledger file: {e}"))
        })?;
        if file.version != LEDGER_FILE_VERSION {
            return Err(LedgerError::InvalidFileFormat(format!(
                "unsupported ledger file version {}",
                file.version
            )));
        }
        log::debug!(
            "loaded ledger at height {} from {}",
            file.ledger.height(),
            path.display()
        );
        Ok(file.ledger)
    }

    /// Write the snapshot atomically, replacing any previous one.
    pub fn save(&self, ledger: &Ledger) -> Result<()> {
        let file = LedgerFile {
            version: LEDGER_FILE_VERSION,
            saved_at: crate::time::now_micros(),
            ledger: ledger.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| LedgerError::SerializationError(e.to_string()))?;
        write_atomic(&self.path(), json.as_bytes())
    }
}
