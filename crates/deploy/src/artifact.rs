//! Compiled contract artifacts.

use std::path::Path;

use alloy_core::{json_abi::JsonAbi, primitives::Bytes};
use serde::Deserialize;

use crate::CourierError;

/// Functions the sender artifact must expose.
pub const SENDER_FUNCTIONS: &[&str] = &["quoteCrossChainCost", "sendMessage"];
/// Functions the receiver artifact must expose.
pub const RECEIVER_FUNCTIONS: &[&str] = &["setRegisteredSender"];

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Object { object: String },
    Hex(String),
}

#[derive(Debug, Deserialize)]
struct RawArtifact {
    abi: JsonAbi,
    bytecode: RawBytecode,
}

/// Interface description plus creation bytecode of a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractArtifact {
    pub name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Load a forge (`bytecode.object`) or plain (`bytecode: "0x.."`) JSON artifact.
    ///
    /// The artifact is named after the file stem.
    pub fn load(path: &Path) -> Result<Self, CourierError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CourierError::Configuration(format!(
                "failed to read contract artifact {}: {e}",
                path.display()
            ))
        })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "contract".to_string());

        Self::from_json(name, &content)
    }

    pub fn from_json(name: impl Into<String>, content: &str) -> Result<Self, CourierError> {
        let name = name.into();
        let raw: RawArtifact = serde_json::from_str(content).map_err(|e| {
            CourierError::Configuration(format!("malformed contract artifact {name}: {e}"))
        })?;

        let hex_code = match raw.bytecode {
            RawBytecode::Object { object } => object,
            RawBytecode::Hex(code) => code,
        };
        let code = hex::decode(hex_code.trim().trim_start_matches("0x")).map_err(|e| {
            CourierError::Configuration(format!("artifact {name} has invalid bytecode: {e}"))
        })?;

        if code.is_empty() {
            return Err(CourierError::Configuration(format!(
                "artifact {name} has no creation bytecode (abstract contract or interface?)"
            )));
        }

        Ok(Self {
            name,
            abi: raw.abi,
            bytecode: Bytes::from(code),
        })
    }

    /// Fail unless the interface declares every function in `names`.
    pub fn ensure_functions(&self, names: &[&str]) -> Result<(), CourierError> {
        match names.iter().find(|n| self.abi.function(n).is_none()) {
            Some(missing) => Err(CourierError::Configuration(format!(
                "artifact {} does not declare function {missing}",
                self.name
            ))),
            None => Ok(()),
        }
    }
}
