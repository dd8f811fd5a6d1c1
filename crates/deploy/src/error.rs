//! Error taxonomy for a courier run.
//!
//! Every variant is terminal for the current run: nothing is retried, the
//! binary reports the diagnostic and exits with [`CourierError::exit_code`].

use std::path::PathBuf;

use crate::selector::ChainRole;

/// Fatal conditions surfaced by the deployment and messaging workflows.
#[derive(Debug, thiserror::Error)]
pub enum CourierError {
    /// Malformed or missing descriptor data, unresolved placeholders, bad artifacts.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The operator picked an ordinal outside of the presented list.
    #[error("invalid {role} chain selection '{choice}': expected a number between 1 and {available}")]
    Selection {
        role: ChainRole,
        choice: String,
        available: usize,
    },

    /// The signing credential is missing or unusable.
    #[error("credential error: {0}")]
    Credential(String),

    /// Wallet balance is below the gas or quoted delivery cost.
    #[error("insufficient funds: {0}")]
    Funds(String),

    /// The RPC endpoint is unreachable or timed out.
    #[error("network error: {0}")]
    Network(String),

    /// Constructor or call reverted, or no address after a confirmed deployment.
    #[error("contract error: {0}")]
    Contract(String),

    /// The deployment registry could not be read or written.
    #[error("persistence error at {}: {message}", path.display())]
    Persistence { path: PathBuf, message: String },
}

impl CourierError {
    /// Process exit status associated with this error category.
    pub fn exit_code(&self) -> u8 {
        match self {
            CourierError::Configuration(_) => 2,
            CourierError::Selection { .. } => 3,
            CourierError::Credential(_) => 4,
            CourierError::Funds(_) => 5,
            CourierError::Network(_) => 6,
            CourierError::Contract(_) => 7,
            CourierError::Persistence { .. } => 8,
        }
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        CourierError::Persistence {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Classify a failed RPC interaction from its rendered message.
    ///
    /// `action` names what was being attempted and prefixes the diagnostic.
    pub fn from_rpc_message(action: &str, message: &str) -> Self {
        let lower = message.to_lowercase();
        let detail = format!("{action}: {message}");

        if lower.contains("insufficient funds")
            || lower.contains("insufficient balance")
            || lower.contains("gas required exceeds allowance")
        {
            CourierError::Funds(detail)
        } else if lower.contains("revert") || lower.contains("out of gas") {
            CourierError::Contract(detail)
        } else {
            CourierError::Network(detail)
        }
    }
}
