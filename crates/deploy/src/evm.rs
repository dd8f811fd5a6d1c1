//! Signer-backed EVM client implementing the capability traits.

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
};
use alloy_core::primitives::{Address, B256, U256};
use alloy_signer_local::PrivateKeySigner;
use url::Url;

use crate::{
    BridgeInfra, ChainConnector, ChainDescriptor, Confirmation, ContractArtifact, CourierError,
    Credential, Deployable, Registrable, Sendable, contracts, rpc,
};

/// Client for one network, signing with the operator credential.
pub struct EvmChainClient {
    provider: DynProvider,
    signer_address: Address,
    chain: String,
}

impl EvmChainClient {
    /// Build a provider with a fresh signer for `chain`.
    pub fn new(chain: &ChainDescriptor, credential: &Credential) -> Result<Self, CourierError> {
        let signer: PrivateKeySigner = credential
            .expose()
            .parse()
            .map_err(|e| CourierError::Credential(format!("invalid private key: {e}")))?;
        let signer_address = signer.address();

        let url: Url = chain.rpc.parse().map_err(|e| {
            CourierError::Configuration(format!("invalid RPC URL for {}: {e}", chain.description))
        })?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();

        Ok(Self::with_provider(provider, signer_address, &chain.description))
    }

    fn with_provider(provider: DynProvider, signer_address: Address, chain: &str) -> Self {
        Self {
            provider,
            signer_address,
            chain: chain.to_string(),
        }
    }

    /// Address of the signing account.
    pub fn signer_address(&self) -> Address {
        self.signer_address
    }

    /// Send a transaction and wait until it is included.
    ///
    /// A receipt with a failed status is a [`CourierError::Contract`].
    async fn submit(
        &self,
        action: &str,
        tx: TransactionRequest,
    ) -> Result<TransactionReceipt, CourierError> {
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| CourierError::from_rpc_message(action, &e.to_string()))?;

        tracing::info!(
            chain = %self.chain,
            tx_hash = %pending.tx_hash(),
            "{action}: transaction sent, waiting for confirmation..."
        );

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| CourierError::from_rpc_message(action, &e.to_string()))?;

        self.check_receipt(action, receipt)
    }

    fn check_receipt(
        &self,
        action: &str,
        receipt: TransactionReceipt,
    ) -> Result<TransactionReceipt, CourierError> {
        if !receipt.status() {
            return Err(CourierError::Contract(format!(
                "{action}: transaction {} reverted on {}",
                receipt.transaction_hash, self.chain
            )));
        }
        Ok(receipt)
    }
}

fn deployed_address(action: &str, receipt: &TransactionReceipt) -> Result<Address, CourierError> {
    receipt.contract_address.ok_or_else(|| {
        CourierError::Contract(format!(
            "{action}: transaction {} was confirmed but no contract address was returned",
            receipt.transaction_hash
        ))
    })
}

fn send_request(
    sender: Address,
    target_chain: u16,
    target_address: Address,
    payload: &str,
    value: U256,
) -> TransactionRequest {
    TransactionRequest::default()
        .with_to(sender)
        .with_value(value)
        .with_input(contracts::send_calldata(target_chain, target_address, payload))
}

fn confirmation(receipt: &TransactionReceipt) -> Confirmation {
    Confirmation {
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
    }
}

impl Deployable for EvmChainClient {
    async fn deploy(
        &self,
        artifact: &ContractArtifact,
        infra: &BridgeInfra,
    ) -> Result<Address, CourierError> {
        let action = format!("deploy {}", artifact.name);
        let tx = TransactionRequest::default()
            .with_deploy_code(contracts::deploy_code(&artifact.bytecode, infra));

        let receipt = self.submit(&action, tx).await?;
        deployed_address(&action, &receipt)
    }
}

impl Registrable for EvmChainClient {
    async fn set_registered_sender(
        &self,
        receiver: Address,
        source_chain: u16,
        sender: B256,
    ) -> Result<Confirmation, CourierError> {
        let tx = TransactionRequest::default()
            .with_to(receiver)
            .with_input(contracts::register_calldata(source_chain, sender));

        let receipt = self.submit("register sender", tx).await?;
        Ok(confirmation(&receipt))
    }
}

impl Sendable for EvmChainClient {
    async fn quote_cross_chain_cost(
        &self,
        sender: Address,
        target_chain: u16,
    ) -> Result<U256, CourierError> {
        let tx = TransactionRequest::default()
            .with_to(sender)
            .with_input(contracts::quote_calldata(target_chain));

        let output = self
            .provider
            .call(tx)
            .await
            .map_err(|e| CourierError::from_rpc_message("quote cross-chain cost", &e.to_string()))?;

        contracts::decode_quote(&output)
    }

    async fn balance(&self) -> Result<U256, CourierError> {
        self.provider
            .get_balance(self.signer_address)
            .await
            .map_err(|e| CourierError::Network(format!("failed to read balance on {}: {e}", self.chain)))
    }

    async fn send_message(
        &self,
        sender: Address,
        target_chain: u16,
        target_address: Address,
        payload: &str,
        value: U256,
    ) -> Result<Confirmation, CourierError> {
        let tx = send_request(sender, target_chain, target_address, payload, value);
        let receipt = self.submit("send message", tx).await?;
        Ok(confirmation(&receipt))
    }
}

/// Connects [`EvmChainClient`]s with the operator credential.
///
/// Every connection checks the endpoint first, so an unreachable network is
/// reported before anything is deployed.
pub struct EvmConnector {
    credential: Credential,
    http: reqwest::Client,
}

impl EvmConnector {
    pub fn new(credential: Credential) -> Result<Self, CourierError> {
        Ok(Self {
            credential,
            http: rpc::create_client()?,
        })
    }
}

impl ChainConnector for EvmConnector {
    type Client = EvmChainClient;

    async fn connect(&self, chain: &ChainDescriptor) -> Result<EvmChainClient, CourierError> {
        let client = EvmChainClient::new(chain, &self.credential)?;

        let native_chain_id = rpc::native_chain_id(&self.http, &chain.rpc)
            .await
            .map_err(|e| match e {
                CourierError::Network(msg) => {
                    CourierError::Network(format!("{} is unreachable: {msg}", chain.description))
                }
                other => other,
            })?;

        tracing::info!(
            chain = %chain.description,
            chain_id = chain.chain_id,
            native_chain_id,
            signer = %client.signer_address(),
            "Connected to network"
        );

        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use alloy::providers::mock::Asserter;
    use alloy_core::primitives::{Bytes, TxKind};
    use serde_json::json;

    use super::*;

    // First anvil development key.
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn chain(rpc: &str) -> ChainDescriptor {
        ChainDescriptor {
            description: "Local".to_string(),
            chain_id: 2,
            rpc: rpc.to_string(),
            token_bridge: Address::ZERO,
            wormhole_relayer: Address::ZERO,
            wormhole: Address::ZERO,
        }
    }

    #[test]
    fn test_signer_address_from_credential() {
        let client = EvmChainClient::new(&chain("http://localhost:8545"), &Credential::new(DEV_KEY))
            .expect("client should build");

        assert_eq!(
            client.signer_address().to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
    }

    #[test]
    fn test_invalid_key_is_credential_error() {
        let result = EvmChainClient::new(&chain("http://localhost:8545"), &Credential::new("0x1234"));
        assert!(matches!(result, Err(CourierError::Credential(_))));
    }

    #[tokio::test]
    async fn test_connect_unreachable_endpoint() {
        let connector = EvmConnector::new(Credential::new(DEV_KEY)).expect("connector should build");
        let result = connector.connect(&chain("http://127.0.0.1:1")).await;
        assert!(matches!(result, Err(CourierError::Network(_))));
    }

    fn mocked_client() -> (EvmChainClient, Asserter) {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_mocked_client(asserter.clone())
            .erased();
        let client = EvmChainClient::with_provider(provider, Address::repeat_byte(0x11), "Local");
        (client, asserter)
    }

    /// A receipt as returned by `eth_getTransactionReceipt`.
    fn receipt_json(status: &str, contract_address: Option<Address>) -> serde_json::Value {
        json!({
            "type": "0x2",
            "status": status,
            "cumulativeGasUsed": "0x5208",
            "logs": [],
            "logsBloom": format!("0x{}", "00".repeat(256)),
            "transactionHash": B256::repeat_byte(0xaa),
            "transactionIndex": "0x0",
            "blockHash": B256::repeat_byte(0xbb),
            "blockNumber": "0x10",
            "gasUsed": "0x5208",
            "effectiveGasPrice": "0x3b9aca00",
            "from": Address::repeat_byte(0x11),
            "to": null,
            "contractAddress": contract_address,
        })
    }

    async fn fetch_receipt(
        client: &EvmChainClient,
        asserter: &Asserter,
        json: serde_json::Value,
    ) -> TransactionReceipt {
        asserter.push_success(&json);
        client
            .provider
            .get_transaction_receipt(B256::repeat_byte(0xaa))
            .await
            .expect("receipt request should succeed")
            .expect("receipt should be present")
    }

    #[tokio::test]
    async fn test_deploy_receipt_with_contract_address() {
        let (client, asserter) = mocked_client();
        let deployed = Address::repeat_byte(0x42);
        let receipt = fetch_receipt(&client, &asserter, receipt_json("0x1", Some(deployed))).await;

        let receipt = client
            .check_receipt("deploy Sender", receipt)
            .expect("receipt should be successful");
        assert_eq!(deployed_address("deploy Sender", &receipt).ok(), Some(deployed));
        assert_eq!(confirmation(&receipt).block_number, Some(16));
    }

    #[tokio::test]
    async fn test_deploy_receipt_without_contract_address() {
        let (client, asserter) = mocked_client();
        let receipt = fetch_receipt(&client, &asserter, receipt_json("0x1", None)).await;

        let receipt = client
            .check_receipt("deploy Sender", receipt)
            .expect("receipt should be successful");
        assert!(matches!(
            deployed_address("deploy Sender", &receipt),
            Err(CourierError::Contract(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_receipt_is_contract_error() {
        let (client, asserter) = mocked_client();
        let receipt =
            fetch_receipt(&client, &asserter, receipt_json("0x0", Some(Address::repeat_byte(0x42))))
                .await;

        match client.check_receipt("register sender", receipt) {
            Err(CourierError::Contract(msg)) => {
                assert!(msg.contains("reverted on Local"), "unexpected message: {msg}");
            }
            other => panic!("expected contract error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_quote_decodes_word() {
        let (client, asserter) = mocked_client();
        asserter.push_success(&Bytes::copy_from_slice(
            &U256::from(1_234_567u64).to_be_bytes::<32>(),
        ));

        let cost = client
            .quote_cross_chain_cost(Address::repeat_byte(0x22), 14)
            .await
            .expect("quote should decode");
        assert_eq!(cost, U256::from(1_234_567u64));
    }

    #[tokio::test]
    async fn test_quote_short_output_is_contract_error() {
        let (client, asserter) = mocked_client();
        asserter.push_success(&Bytes::from_static(&[0x01, 0x02]));

        let result = client.quote_cross_chain_cost(Address::repeat_byte(0x22), 14).await;
        assert!(matches!(result, Err(CourierError::Contract(_))));
    }

    #[tokio::test]
    async fn test_quote_revert_is_contract_error() {
        let (client, asserter) = mocked_client();
        asserter.push_failure_msg("execution reverted: unsupported chain");

        let result = client.quote_cross_chain_cost(Address::repeat_byte(0x22), 99).await;
        assert!(matches!(result, Err(CourierError::Contract(_))));
    }

    #[tokio::test]
    async fn test_balance_reads_signer_account() {
        let (client, asserter) = mocked_client();
        asserter.push_success(&U256::from(5_000u64));

        assert_eq!(client.balance().await.ok(), Some(U256::from(5_000u64)));
    }

    #[test]
    fn test_send_request_attaches_value() {
        let sender = Address::repeat_byte(0x22);
        let receiver = Address::repeat_byte(0x33);
        let value = U256::from(2_500u64);

        let request = send_request(sender, 14, receiver, "Hello from Sepolia to Celo!", value);

        assert_eq!(request.value, Some(value));
        assert_eq!(request.to, Some(TxKind::Call(sender)));
        assert_eq!(
            request.input.input(),
            Some(&contracts::send_calldata(14, receiver, "Hello from Sepolia to Celo!"))
        );
    }
}
