//! Deployment records: the latest [`DeploymentInfo`] per network.
//!
//! File format, at `{dir}/{network}.json`:
//! ```json
//! {
//!     "version": 1,
//!     "deployment": { ... DeploymentInfo ... }
//! }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::deploy::DeploymentInfo;
use crate::error::{LedgerError, Result};

use super::write_atomic;

const DEPLOYMENT_FILE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct DeploymentFile {
    version: u32,
    deployment: DeploymentInfo,
}

/// Filesystem-backed store of deployment summaries.
pub struct DeploymentStore {
    base_dir: PathBuf,
}

impl DeploymentStore {
    /// Store rooted at `base_dir`, created if missing.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Record a deployment, replacing the previous one for its network.
    pub fn save(&self, info: &DeploymentInfo) -> Result<()> {
        let file = DeploymentFile {
            version: DEPLOYMENT_FILE_VERSION,
            deployment: info.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| LedgerError::SerializationError(e.to_string()))?;
        write_atomic(&self.path_for(&info.network), json.as_bytes())
    }

    /// The latest deployment on `network`, if any.
    pub fn load_latest(&self, network: &str) -> Result<Option<DeploymentInfo>> {
        let path = self.path_for(network);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path)?;
        let file: DeploymentFile = serde_json::from_slice(&bytes).map_err(|e| {
            LedgerError::InvalidFileFormat(format!("failed to parse deployment file: {e}"))
        })?;
        Ok(Some(file.deployment))
    }

    /// Latest deployments of every network, ordered by network name.
    pub fn list(&self) -> Result<Vec<DeploymentInfo>> {
        let mut deployments = Vec::new();
        for entry in std::fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(network) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(info) = self.load_latest(network)? {
                deployments.push(info);
            }
        }
        deployments.sort_by(|a, b| a.network.cmp(&b.network));
        Ok(deployments)
    }

    fn path_for(&self, network: &str) -> PathBuf {
        self.base_dir.join(format!("{network}.json"))
    }
}
