//! Durable record of which contracts are deployed where.
//!
//! The registry file maps protocol chain ids to [`DeploymentRecord`]s. It is
//! loaded at the start of a run, merged into, and rewritten wholesale on
//! [`DeploymentRegistry::save`].

use std::{
    collections::BTreeMap,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::CourierError;

/// What was deployed on one chain.
///
/// Sender and receiver addresses populate independently, possibly over
/// separate runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    #[serde(rename = "networkName")]
    pub network_name: String,
    #[serde(rename = "CrossChainSender", default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(rename = "CrossChainReceiver", default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    #[serde(rename = "deployedAt")]
    pub deployed_at: String,
}

/// Fields to merge into a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    /// Label used only when the record does not exist yet.
    pub network_name: String,
    pub sender: Option<String>,
    pub receiver: Option<String>,
}

impl RecordPatch {
    pub fn sender(network_name: impl Into<String>, address: impl ToString) -> Self {
        Self {
            network_name: network_name.into(),
            sender: Some(address.to_string()),
            receiver: None,
        }
    }

    pub fn receiver(network_name: impl Into<String>, address: impl ToString) -> Self {
        Self {
            network_name: network_name.into(),
            sender: None,
            receiver: Some(address.to_string()),
        }
    }
}

/// Chain id → deployment record map backed by a JSON file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRegistry {
    path: PathBuf,
    records: BTreeMap<u16, DeploymentRecord>,
}

impl DeploymentRegistry {
    /// Load the registry at `path`, or start empty if the file does not exist.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CourierError> {
        let path = path.into();

        let exists = path
            .try_exists()
            .map_err(|e| CourierError::persistence(&path, e))?;

        let records = if exists {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| CourierError::persistence(&path, format!("failed to read: {e}")))?;
            serde_json::from_str(&content)
                .map_err(|e| CourierError::persistence(&path, format!("malformed registry: {e}")))?
        } else {
            tracing::debug!(path = %path.display(), "No registry found, starting empty");
            BTreeMap::new()
        };

        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &BTreeMap<u16, DeploymentRecord> {
        &self.records
    }

    pub fn get(&self, chain_id: u16) -> Option<&DeploymentRecord> {
        self.records.get(&chain_id)
    }

    /// Merge `patch` into the record for `chain_id`, creating it if needed.
    ///
    /// Fields absent from the patch are preserved and the timestamp is refreshed.
    pub fn upsert(&mut self, chain_id: u16, patch: RecordPatch) -> &DeploymentRecord {
        self.upsert_at(chain_id, patch, Utc::now())
    }

    pub fn upsert_at(
        &mut self,
        chain_id: u16,
        patch: RecordPatch,
        now: DateTime<Utc>,
    ) -> &DeploymentRecord {
        let deployed_at = now.to_rfc3339_opts(SecondsFormat::Millis, true);

        let record = self
            .records
            .entry(chain_id)
            .or_insert_with(|| DeploymentRecord {
                network_name: patch.network_name,
                sender: None,
                receiver: None,
                deployed_at: deployed_at.clone(),
            });

        if let Some(sender) = patch.sender {
            record.sender = Some(sender);
        }
        if let Some(receiver) = patch.receiver {
            record.receiver = Some(receiver);
        }
        record.deployed_at = deployed_at;

        tracing::debug!(chain_id, record = ?record, "Registry record updated");
        record
    }

    /// Serialize the whole registry and atomically replace the file.
    ///
    /// The content is written to a sibling temporary file which is then
    /// renamed over the registry path.
    pub fn save(&self) -> Result<(), CourierError> {
        let content = serde_json::to_string_pretty(&self.records)
            .map_err(|e| CourierError::persistence(&self.path, format!("failed to serialize: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| CourierError::persistence(&self.path, format!("failed to create directory: {e}")))?;
        }

        let tmp_path = self.tmp_path();
        let write = || -> std::io::Result<()> {
            let mut file = std::fs::File::create(&tmp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
            std::fs::rename(&tmp_path, &self.path)
        };

        if let Err(e) = write() {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(CourierError::persistence(&self.path, format!("failed to write: {e}")));
        }

        tracing::info!(path = %self.path.display(), chains = self.records.len(), "Registry saved");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "registry.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
