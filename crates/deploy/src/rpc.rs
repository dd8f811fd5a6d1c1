//! Raw JSON-RPC helpers used to check endpoints before any transaction is sent.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::CourierError;

/// Default timeout for endpoint checks.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Create an HTTP client configured for JSON-RPC requests.
pub fn create_client() -> Result<reqwest::Client, CourierError> {
    reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .map_err(|e| CourierError::Network(format!("failed to create HTTP client: {e}")))
}

/// Make a JSON-RPC call and deserialize the result.
///
/// Transport failures, error responses and malformed results all surface as
/// [`CourierError::Network`].
pub async fn json_rpc_call<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: Vec<Value>,
) -> Result<T, CourierError> {
    let response = client
        .post(url)
        .json(&serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        }))
        .send()
        .await
        .map_err(|e| CourierError::Network(format!("failed to send {method} request: {e}")))?;

    let result: Value = response
        .json()
        .await
        .map_err(|e| CourierError::Network(format!("failed to parse {method} response: {e}")))?;

    if let Some(error) = result.get("error") {
        return Err(CourierError::Network(format!(
            "RPC error from {method}: {}",
            error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown")
        )));
    }

    let result_value = result
        .get("result")
        .cloned()
        .ok_or_else(|| CourierError::Network(format!("no result in {method} response")))?;

    serde_json::from_value(result_value)
        .map_err(|e| CourierError::Network(format!("failed to deserialize {method} result: {e}")))
}

/// Native EVM chain id reported by the endpoint.
pub async fn native_chain_id(client: &reqwest::Client, url: &str) -> Result<u64, CourierError> {
    let hex_id: String = json_rpc_call(client, url, "eth_chainId", vec![]).await?;
    parse_quantity(&hex_id)
}

/// Parse a `0x`-prefixed JSON-RPC quantity.
fn parse_quantity(quantity: &str) -> Result<u64, CourierError> {
    u64::from_str_radix(quantity.trim_start_matches("0x"), 16)
        .map_err(|e| CourierError::Network(format!("invalid quantity '{quantity}': {e}")))
}
