//! Deploys the sender then the receiver, in that order.

use alloy_core::primitives::Address;

use crate::{ChainConnector, ChainDescriptor, ContractArtifact, CourierError, Deployable};

/// Addresses of a freshly deployed pair plus the client bound to the target network.
pub struct PairDeployment<C> {
    pub sender_address: Address,
    pub receiver_address: Address,
    pub target_client: C,
}

pub struct DeploymentOrchestrator<'a, C> {
    connector: &'a C,
}

impl<'a, C: ChainConnector> DeploymentOrchestrator<'a, C> {
    pub fn new(connector: &'a C) -> Self {
        Self { connector }
    }

    /// Deploy the sender on `source` then the receiver on `target`.
    ///
    /// Both networks are connected before anything is deployed. The receiver
    /// deployment only starts once the sender is confirmed, and any failure
    /// aborts the pair.
    pub async fn deploy_pair(
        &self,
        source: &ChainDescriptor,
        target: &ChainDescriptor,
        sender_artifact: &ContractArtifact,
        receiver_artifact: &ContractArtifact,
    ) -> Result<PairDeployment<C::Client>, CourierError> {
        let source_client = self.connector.connect(source).await?;
        let target_client = self.connector.connect(target).await?;

        let sender_address = Self::deploy_on(&source_client, source, sender_artifact).await?;
        let receiver_address = Self::deploy_on(&target_client, target, receiver_artifact).await?;

        Ok(PairDeployment {
            sender_address,
            receiver_address,
            target_client,
        })
    }

    /// Deploy a single contract on `chain`, returning its address and the connected client.
    pub async fn deploy_single(
        &self,
        chain: &ChainDescriptor,
        artifact: &ContractArtifact,
    ) -> Result<(Address, C::Client), CourierError> {
        let client = self.connector.connect(chain).await?;
        let address = Self::deploy_on(&client, chain, artifact).await?;
        Ok((address, client))
    }

    async fn deploy_on(
        client: &C::Client,
        chain: &ChainDescriptor,
        artifact: &ContractArtifact,
    ) -> Result<Address, CourierError> {
        tracing::info!(
            chain = %chain.description,
            chain_id = chain.chain_id,
            "Deploying {}...",
            artifact.name
        );
        let address = client.deploy(artifact, &chain.infra()).await?;
        tracing::info!(
            chain = %chain.description,
            address = %address,
            "{} deployed",
            artifact.name
        );
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use alloy_core::primitives::{B256, Bytes, U256};

    use super::*;
    use crate::{BridgeInfra, Confirmation, Registrable, Sendable};

    type Log = Arc<Mutex<Vec<String>>>;

    struct MockConnector {
        log: Log,
        fail_deploy_on: Option<u16>,
    }

    struct MockClient {
        chain_id: u16,
        log: Log,
        fail_deploy: bool,
    }

    impl ChainConnector for MockConnector {
        type Client = MockClient;

        async fn connect(&self, chain: &ChainDescriptor) -> Result<MockClient, CourierError> {
            self.log
                .lock()
                .expect("lock poisoned")
                .push(format!("connect {}", chain.chain_id));
            Ok(MockClient {
                chain_id: chain.chain_id,
                log: self.log.clone(),
                fail_deploy: self.fail_deploy_on == Some(chain.chain_id),
            })
        }
    }

    impl Deployable for MockClient {
        async fn deploy(
            &self,
            artifact: &ContractArtifact,
            infra: &BridgeInfra,
        ) -> Result<Address, CourierError> {
            self.log.lock().expect("lock poisoned").push(format!(
                "deploy {} on {} relayer {}",
                artifact.name, self.chain_id, infra.relayer
            ));
            if self.fail_deploy {
                return Err(CourierError::Contract("constructor reverted".to_string()));
            }
            Ok(Address::with_last_byte(self.chain_id as u8))
        }
    }

    impl Registrable for MockClient {
        async fn set_registered_sender(
            &self,
            _receiver: Address,
            _source_chain: u16,
            _sender: B256,
        ) -> Result<Confirmation, CourierError> {
            unreachable!("orchestrator never registers")
        }
    }

    impl Sendable for MockClient {
        async fn quote_cross_chain_cost(&self, _: Address, _: u16) -> Result<U256, CourierError> {
            unreachable!("orchestrator never quotes")
        }

        async fn balance(&self) -> Result<U256, CourierError> {
            unreachable!("orchestrator never reads balances")
        }

        async fn send_message(
            &self,
            _: Address,
            _: u16,
            _: Address,
            _: &str,
            _: U256,
        ) -> Result<Confirmation, CourierError> {
            unreachable!("orchestrator never sends")
        }
    }

    fn descriptor(chain_id: u16, relayer: u8) -> ChainDescriptor {
        ChainDescriptor {
            description: format!("Chain {chain_id}"),
            chain_id,
            rpc: "http://localhost:8545".to_string(),
            token_bridge: Address::repeat_byte(0x10),
            wormhole_relayer: Address::repeat_byte(relayer),
            wormhole: Address::repeat_byte(0x30),
        }
    }

    fn artifact(name: &str) -> ContractArtifact {
        ContractArtifact {
            name: name.to_string(),
            abi: Default::default(),
            bytecode: Bytes::from_static(&[0x60, 0x80]),
        }
    }

    #[tokio::test]
    async fn test_deploy_pair_order_and_infra() {
        let log = Log::default();
        let connector = MockConnector {
            log: log.clone(),
            fail_deploy_on: None,
        };
        let source = descriptor(10002, 0xaa);
        let target = descriptor(14, 0xbb);

        let pair = DeploymentOrchestrator::new(&connector)
            .deploy_pair(&source, &target, &artifact("Sender"), &artifact("Receiver"))
            .await
            .expect("deployment should succeed");

        assert_eq!(pair.sender_address, Address::with_last_byte(10002u16 as u8));
        assert_eq!(pair.receiver_address, Address::with_last_byte(14));
        assert_eq!(pair.target_client.chain_id, 14);

        let log = log.lock().expect("lock poisoned");
        assert_eq!(
            log.as_slice(),
            &[
                "connect 10002".to_string(),
                "connect 14".to_string(),
                format!("deploy Sender on 10002 relayer {}", Address::repeat_byte(0xaa)),
                format!("deploy Receiver on 14 relayer {}", Address::repeat_byte(0xbb)),
            ]
        );
    }

    #[tokio::test]
    async fn test_sender_failure_skips_receiver() {
        let log = Log::default();
        let connector = MockConnector {
            log: log.clone(),
            fail_deploy_on: Some(10002),
        };

        let result = DeploymentOrchestrator::new(&connector)
            .deploy_pair(
                &descriptor(10002, 0xaa),
                &descriptor(14, 0xbb),
                &artifact("Sender"),
                &artifact("Receiver"),
            )
            .await;

        assert!(matches!(result, Err(CourierError::Contract(_))));
        let log = log.lock().expect("lock poisoned");
        assert!(!log.iter().any(|entry| entry.starts_with("deploy Receiver")));
    }

    #[tokio::test]
    async fn test_receiver_failure_aborts() {
        let connector = MockConnector {
            log: Log::default(),
            fail_deploy_on: Some(14),
        };

        let result = DeploymentOrchestrator::new(&connector)
            .deploy_pair(
                &descriptor(10002, 0xaa),
                &descriptor(14, 0xbb),
                &artifact("Sender"),
                &artifact("Receiver"),
            )
            .await;

        assert!(matches!(result, Err(CourierError::Contract(_))));
    }

    #[tokio::test]
    async fn test_deploy_single_connects_only_its_chain() {
        let log = Log::default();
        let connector = MockConnector {
            log: log.clone(),
            fail_deploy_on: None,
        };

        let (address, client) = DeploymentOrchestrator::new(&connector)
            .deploy_single(&descriptor(14, 0xbb), &artifact("Receiver"))
            .await
            .expect("deployment should succeed");

        assert_eq!(address, Address::with_last_byte(14));
        assert_eq!(client.chain_id, 14);
        let log = log.lock().expect("lock poisoned");
        assert_eq!(
            log.as_slice(),
            &[
                "connect 14".to_string(),
                format!("deploy Receiver on 14 relayer {}", Address::repeat_byte(0xbb)),
            ]
        );
    }
}
