//! Chain selection by 1-based ordinal.

use url::Url;

use crate::{ChainDescriptor, CourierError};

/// Markers that betray a placeholder left unresolved in an endpoint.
pub const UNRESOLVED_MARKERS: &[&str] = &["__", "_RPC_"];

/// Role a selected chain plays in the deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ChainRole {
    /// Hosts the sender contract.
    Source,
    /// Hosts the receiver contract.
    Target,
}

/// Presents descriptors and returns the one the operator picked.
pub struct ChainSelector;

impl ChainSelector {
    /// Display lines for the descriptor list, numbered from 1.
    pub fn menu(chains: &[ChainDescriptor]) -> Vec<String> {
        chains
            .iter()
            .enumerate()
            .map(|(index, chain)| format!("{}: {}", index + 1, chain.description))
            .collect()
    }

    /// Parse an operator-supplied ordinal.
    pub fn parse_ordinal(
        role: ChainRole,
        input: &str,
        available: usize,
    ) -> Result<usize, CourierError> {
        input
            .trim()
            .parse::<usize>()
            .map_err(|_| CourierError::Selection {
                role,
                choice: input.trim().to_string(),
                available,
            })
    }

    /// Select the descriptor at the 1-based `ordinal` and check its endpoint is usable.
    pub fn select(
        chains: &[ChainDescriptor],
        ordinal: usize,
        role: ChainRole,
    ) -> Result<&ChainDescriptor, CourierError> {
        let chain = Self::at(chains, ordinal, role)?;
        Self::ensure_resolved(chain)?;
        Self::log_selected(chain, role);
        Ok(chain)
    }

    /// Select the descriptor at the 1-based `ordinal` without touching its endpoint.
    ///
    /// For chains that are only referenced by their Wormhole chain ID, such as
    /// the target of a message.
    pub fn select_listed(
        chains: &[ChainDescriptor],
        ordinal: usize,
        role: ChainRole,
    ) -> Result<&ChainDescriptor, CourierError> {
        let chain = Self::at(chains, ordinal, role)?;
        Self::log_selected(chain, role);
        Ok(chain)
    }

    fn at(
        chains: &[ChainDescriptor],
        ordinal: usize,
        role: ChainRole,
    ) -> Result<&ChainDescriptor, CourierError> {
        ordinal
            .checked_sub(1)
            .and_then(|index| chains.get(index))
            .ok_or_else(|| CourierError::Selection {
                role,
                choice: ordinal.to_string(),
                available: chains.len(),
            })
    }

    fn log_selected(chain: &ChainDescriptor, role: ChainRole) {
        tracing::info!(
            role = %role,
            chain = %chain.description,
            chain_id = chain.chain_id,
            "Selected chain"
        );
    }

    /// Reject endpoints that still carry placeholder markers or are not URLs.
    pub fn ensure_resolved(chain: &ChainDescriptor) -> Result<(), CourierError> {
        if UNRESOLVED_MARKERS.iter().any(|m| chain.rpc.contains(m)) {
            return Err(CourierError::Configuration(format!(
                "RPC URL for {} was not resolved (current RPC: {}); check your environment variables",
                chain.description, chain.rpc
            )));
        }

        Url::parse(&chain.rpc).map_err(|e| {
            CourierError::Configuration(format!(
                "RPC URL for {} is not a valid URL ({}): {e}",
                chain.description, chain.rpc
            ))
        })?;

        Ok(())
    }
}
