//! Quote and submit cross-chain payloads through a deployed sender.

use alloy_core::primitives::{Address, B256, U256, utils::format_ether};
use serde::{Deserialize, Serialize};

use crate::{CourierError, DeploymentRegistry, Sendable};

/// Wormholescan network the explorer link points to.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ExplorerNetwork {
    #[default]
    #[serde(alias = "TESTNET")]
    Testnet,
    #[serde(alias = "MAINNET")]
    Mainnet,
}

impl ExplorerNetwork {
    pub fn explorer_url(&self, tx_hash: B256) -> String {
        format!("https://wormholescan.io/#/tx/{tx_hash}?network={self}")
    }
}

/// Sender and receiver addresses for one source → target pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRoute {
    pub sender: Address,
    pub receiver: Address,
}

impl MessageRoute {
    /// Look up the sender on the source record and the receiver on the target record.
    pub fn resolve(
        registry: &DeploymentRegistry,
        source_chain_id: u16,
        target_chain_id: u16,
    ) -> Result<Self, CourierError> {
        Ok(Self {
            sender: Self::recorded_sender(registry, source_chain_id)?,
            receiver: Self::recorded_receiver(registry, target_chain_id)?,
        })
    }

    /// The sender recorded for `chain_id`.
    pub fn recorded_sender(
        registry: &DeploymentRegistry,
        chain_id: u16,
    ) -> Result<Address, CourierError> {
        let sender = registry
            .get(chain_id)
            .and_then(|r| r.sender.as_deref())
            .ok_or_else(|| {
                CourierError::Configuration(format!(
                    "no sender deployed on chain {chain_id} in {}",
                    registry.path().display()
                ))
            })?;
        parse_recorded(sender, chain_id)
    }

    /// The receiver recorded for `chain_id`.
    pub fn recorded_receiver(
        registry: &DeploymentRegistry,
        chain_id: u16,
    ) -> Result<Address, CourierError> {
        let receiver = registry
            .get(chain_id)
            .and_then(|r| r.receiver.as_deref())
            .ok_or_else(|| {
                CourierError::Configuration(format!(
                    "no receiver deployed on chain {chain_id} in {}",
                    registry.path().display()
                ))
            })?;
        parse_recorded(receiver, chain_id)
    }
}

fn parse_recorded(address: &str, chain_id: u16) -> Result<Address, CourierError> {
    address.parse().map_err(|e| {
        CourierError::Configuration(format!(
            "invalid address '{address}' recorded for chain {chain_id}: {e}"
        ))
    })
}

/// Outcome of a submitted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub value: U256,
    pub explorer_url: String,
}

/// Messaging operations against one deployed sender contract.
pub struct MessagingClient<'a, S> {
    client: &'a S,
    sender_contract: Address,
    explorer: ExplorerNetwork,
}

impl<'a, S: Sendable> MessagingClient<'a, S> {
    pub fn new(client: &'a S, sender_contract: Address, explorer: ExplorerNetwork) -> Self {
        Self {
            client,
            sender_contract,
            explorer,
        }
    }

    /// Delivery cost of one message to `target_chain`, in wei.
    pub async fn quote_cost(&self, target_chain: u16) -> Result<U256, CourierError> {
        let cost = self
            .client
            .quote_cross_chain_cost(self.sender_contract, target_chain)
            .await?;

        tracing::info!(
            sender = %self.sender_contract,
            target_chain,
            cost_eth = %format_ether(cost),
            "Quoted cross-chain cost"
        );

        Ok(cost)
    }

    /// Send `payload` to `target_address` on `target_chain`.
    ///
    /// Without an explicit `value` the quoted cost is attached. The wallet
    /// balance is checked first and nothing is submitted when it is short.
    pub async fn send(
        &self,
        target_chain: u16,
        target_address: Address,
        payload: &str,
        value: Option<U256>,
    ) -> Result<SentMessage, CourierError> {
        let value = match value {
            Some(value) => value,
            None => self.quote_cost(target_chain).await?,
        };

        let balance = self.client.balance().await?;
        if balance < value {
            return Err(CourierError::Funds(format!(
                "wallet balance {} ETH is below the required {} ETH",
                format_ether(balance),
                format_ether(value)
            )));
        }

        tracing::info!(
            target_chain,
            target = %target_address,
            payload_len = payload.len(),
            "Sending message..."
        );

        let confirmation = self
            .client
            .send_message(self.sender_contract, target_chain, target_address, payload, value)
            .await?;

        let explorer_url = self.explorer.explorer_url(confirmation.tx_hash);
        tracing::info!(
            tx_hash = %confirmation.tx_hash,
            explorer = %explorer_url,
            "Message sent"
        );

        Ok(SentMessage {
            tx_hash: confirmation.tx_hash,
            block_number: confirmation.block_number,
            value,
            explorer_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tempdir::TempDir;

    use super::*;
    use crate::{Confirmation, RecordPatch};

    struct MockSender {
        quote: U256,
        balance: U256,
        sent: Mutex<Vec<(u16, Address, String, U256)>>,
    }

    impl MockSender {
        fn new(quote: u64, balance: u64) -> Self {
            Self {
                quote: U256::from(quote),
                balance: U256::from(balance),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl Sendable for MockSender {
        async fn quote_cross_chain_cost(
            &self,
            _sender: Address,
            _target_chain: u16,
        ) -> Result<U256, CourierError> {
            Ok(self.quote)
        }

        async fn balance(&self) -> Result<U256, CourierError> {
            Ok(self.balance)
        }

        async fn send_message(
            &self,
            _sender: Address,
            target_chain: u16,
            target_address: Address,
            payload: &str,
            value: U256,
        ) -> Result<Confirmation, CourierError> {
            self.sent.lock().expect("lock poisoned").push((
                target_chain,
                target_address,
                payload.to_string(),
                value,
            ));
            Ok(Confirmation {
                tx_hash: B256::repeat_byte(0xcd),
                block_number: Some(42),
            })
        }
    }

    #[tokio::test]
    async fn test_send_attaches_quoted_value() {
        let mock = MockSender::new(1_000, 5_000);
        let messaging = MessagingClient::new(&mock, Address::repeat_byte(1), ExplorerNetwork::Testnet);
        let target = Address::repeat_byte(2);

        let sent = messaging
            .send(14, target, "Hello from Sepolia to Celo!", None)
            .await
            .expect("send should succeed");

        assert_eq!(sent.value, U256::from(1_000));
        let calls = mock.sent.lock().expect("lock poisoned");
        assert_eq!(
            calls.as_slice(),
            &[(14, target, "Hello from Sepolia to Celo!".to_string(), U256::from(1_000))]
        );
    }

    #[tokio::test]
    async fn test_insufficient_balance_sends_nothing() {
        let mock = MockSender::new(1_000, 999);
        let messaging = MessagingClient::new(&mock, Address::repeat_byte(1), ExplorerNetwork::Testnet);

        let result = messaging.send(14, Address::repeat_byte(2), "hi", None).await;

        assert!(matches!(result, Err(CourierError::Funds(_))));
        assert!(mock.sent.lock().expect("lock poisoned").is_empty());
    }

    #[tokio::test]
    async fn test_explicit_value_skips_quote() {
        let mock = MockSender::new(1_000, 600);
        let messaging = MessagingClient::new(&mock, Address::repeat_byte(1), ExplorerNetwork::Mainnet);

        let sent = messaging
            .send(14, Address::repeat_byte(2), "hi", Some(U256::from(500)))
            .await
            .expect("send should succeed");

        assert_eq!(sent.value, U256::from(500));
        assert!(sent.explorer_url.ends_with("?network=MAINNET"));
    }

    #[test]
    fn test_explorer_url() {
        let url = ExplorerNetwork::Testnet.explorer_url(B256::repeat_byte(0xab));
        assert_eq!(
            url,
            format!("https://wormholescan.io/#/tx/0x{}?network=TESTNET", "ab".repeat(32))
        );
    }

    #[test]
    fn test_route_resolution() {
        let temp_dir = TempDir::new("courier-test").expect("Failed to create temp dir");
        let mut registry = DeploymentRegistry::load(temp_dir.path().join("contracts.json"))
            .expect("registry should load");

        let sender = Address::repeat_byte(0xaa);
        let receiver = Address::repeat_byte(0xbb);
        registry.upsert(10002, RecordPatch::sender("Sepolia", sender));

        assert!(matches!(
            MessageRoute::resolve(&registry, 10002, 14),
            Err(CourierError::Configuration(_))
        ));

        registry.upsert(14, RecordPatch::receiver("Celo", receiver));
        let route = MessageRoute::resolve(&registry, 10002, 14).expect("route should resolve");
        assert_eq!(route, MessageRoute { sender, receiver });
    }
}
