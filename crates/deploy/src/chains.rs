//! Chain descriptors and endpoint placeholder resolution.
//!
//! Descriptor endpoints may embed placeholder tokens such as `__CELO_RPC__` or
//! `_MANTLE_SEPOLIA_RPC_`. Each token names an environment binding; bound
//! tokens are substituted, unbound tokens are left in place and caught later
//! by [`crate::ChainSelector`].

use std::path::Path;

use alloy_core::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{CourierError, Environment};

/// Endpoint templates that replace the whole endpoint when their binding is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointTemplate {
    /// Marker searched for in the descriptor endpoint.
    pub marker: &'static str,
    /// Environment binding whose value completes the template.
    pub binding: &'static str,
    /// URL prefix the binding value is appended to.
    pub url_prefix: &'static str,
}

/// Known endpoint templates, applied before generic token substitution.
pub const ENDPOINT_TEMPLATES: &[EndpointTemplate] = &[EndpointTemplate {
    marker: "__SEPOLIA_RPC__",
    binding: "THIRDWEB_CLIENT_ID",
    url_prefix: "https://11155111.rpc.thirdweb.com/",
}];

/// Bridge infrastructure addresses passed to both contract constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeInfra {
    pub relayer: Address,
    pub token_bridge: Address,
    pub core_bridge: Address,
}

/// One network's endpoint and bridge infrastructure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    /// Human readable network name, also used as the registry network label.
    pub description: String,
    /// Protocol chain id (not the native EVM chain id).
    pub chain_id: u16,
    /// RPC endpoint, possibly containing placeholder tokens.
    pub rpc: String,
    pub token_bridge: Address,
    pub wormhole_relayer: Address,
    pub wormhole: Address,
}

impl ChainDescriptor {
    /// Constructor dependencies in deployment order: relayer, token bridge, core bridge.
    pub fn infra(&self) -> BridgeInfra {
        BridgeInfra {
            relayer: self.wormhole_relayer,
            token_bridge: self.token_bridge,
            core_bridge: self.wormhole,
        }
    }
}

/// Contents of the chain descriptor file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainsConfig {
    pub chains: Vec<ChainDescriptor>,
}

impl ChainsConfig {
    /// Load descriptors from a JSON file of the form `{ "chains": [...] }`.
    pub fn load(path: &Path) -> Result<Self, CourierError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CourierError::Configuration(format!(
                "failed to read chain descriptors from {}: {e}",
                path.display()
            ))
        })?;

        let config = Self::from_json(&content).map_err(|e| match e {
            CourierError::Configuration(msg) => {
                CourierError::Configuration(format!("{}: {msg}", path.display()))
            }
            other => other,
        })?;

        tracing::debug!(path = %path.display(), chains = config.chains.len(), "Chain descriptors loaded");
        Ok(config)
    }

    /// Parse descriptors from JSON text.
    pub fn from_json(content: &str) -> Result<Self, CourierError> {
        let config: Self = serde_json::from_str(content).map_err(|e| {
            CourierError::Configuration(format!("malformed chain descriptor file: {e}"))
        })?;

        if config.chains.is_empty() {
            return Err(CourierError::Configuration(
                "chain descriptor file lists no chains".to_string(),
            ));
        }

        Ok(config)
    }

    /// Resolve every descriptor endpoint against `env`, preserving order.
    pub fn resolve(self, env: &Environment) -> Vec<ChainDescriptor> {
        resolve_all(self.chains, env)
    }
}

/// Resolve the endpoint of every descriptor, preserving descriptor order.
pub fn resolve_all(chains: Vec<ChainDescriptor>, env: &Environment) -> Vec<ChainDescriptor> {
    chains
        .into_iter()
        .map(|mut chain| {
            let resolved = resolve_endpoint(&chain.rpc, env);
            if resolved != chain.rpc {
                tracing::debug!(chain = %chain.description, "Resolved endpoint placeholders");
            }
            chain.rpc = resolved;
            chain
        })
        .collect()
}

/// Substitute placeholder tokens in an endpoint template.
///
/// Endpoint templates are applied first, then `__NAME__` tokens, then
/// `_NAME_` tokens. A token is replaced everywhere it occurs when `NAME` is
/// bound, even to an empty value. Unbound tokens are left untouched.
pub fn resolve_endpoint(template: &str, env: &Environment) -> String {
    let mut endpoint = apply_endpoint_templates(template, env);

    for delim in [2, 1] {
        let tokens: Vec<String> = placeholder_tokens(&endpoint, delim)
            .into_iter()
            .map(str::to_owned)
            .collect();

        for token in tokens {
            let name = &token[delim..token.len() - delim];
            if let Some(value) = env.get(name) {
                endpoint = endpoint.replace(&token, value);
            }
        }
    }

    endpoint
}

fn apply_endpoint_templates(endpoint: &str, env: &Environment) -> String {
    ENDPOINT_TEMPLATES
        .iter()
        .find_map(|t| {
            if !endpoint.contains(t.marker) {
                return None;
            }
            env.get(t.binding)
                .map(|value| format!("{}{}", t.url_prefix, value))
        })
        .unwrap_or_else(|| endpoint.to_string())
}

fn is_token_char(c: u8) -> bool {
    c.is_ascii_uppercase() || c == b'_'
}

/// Distinct placeholder tokens delimited by `delim` underscores on each side,
/// in order of first appearance.
///
/// Matching is leftmost and greedy over runs of `A-Z` / `_` characters, and
/// matches never overlap.
fn placeholder_tokens(input: &str, delim: usize) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut tokens: Vec<&str> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if !is_token_char(bytes[i]) {
            i += 1;
            continue;
        }

        let run_start = i;
        while i < bytes.len() && is_token_char(bytes[i]) {
            i += 1;
        }

        for token in tokens_in_run(&input[run_start..i], delim) {
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
    }

    tokens
}

fn tokens_in_run(run: &str, delim: usize) -> Vec<&str> {
    let b = run.as_bytes();
    let is_delim = |at: usize| b[at..at + delim].iter().all(|c| *c == b'_');
    let mut out = Vec::new();
    let mut start = 0;

    // A token needs both delimiters and at least one character between them.
    while start + 2 * delim < b.len() {
        if is_delim(start) {
            let min_end = start + 2 * delim + 1;
            if let Some(end) = (min_end..=b.len()).rev().find(|end| is_delim(end - delim)) {
                out.push(&run[start..end]);
                start = end;
                continue;
            }
        }
        start += 1;
    }

    out
}
