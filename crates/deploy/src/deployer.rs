use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use alloy_core::primitives::{Address, U256};

use crate::{
    ChainConnector, ChainDescriptor, ChainsConfig, Confirmation, ContractArtifact,
    DeployerBuilder, DeploymentOrchestrator, DeploymentRegistry, Environment, ExplorerNetwork,
    MessageRoute, MessagingClient, RecordPatch, RegistrationService, SentMessage,
    artifact::{RECEIVER_FUNCTIONS, SENDER_FUNCTIONS},
};

/// The default name for the courier configuration file.
pub const COURIER_CONF_FILENAME: &str = "Courier.toml";

/// Prefix of the environment variables overriding the configuration file.
pub const COURIER_ENV_PREFIX: &str = "COURIER_";

/// One half of the contract pair, for deploying a single side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ContractSide {
    Sender,
    Receiver,
}

/// Outcome of a successful `deploy` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentSummary {
    pub source_chain_id: u16,
    pub target_chain_id: u16,
    pub sender_address: Address,
    pub receiver_address: Address,
    pub registration: Confirmation,
}

/// Deployment settings and the driver for the deploy and send workflows.
///
/// This struct can be serialized to/from TOML format. Every relative path is
/// interpreted from the working directory of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployer {
    /// Path to the chain descriptor file.
    pub chains_path: PathBuf,
    /// Path to the deployment registry.
    pub registry_path: PathBuf,
    /// Compiled artifact of the sender contract.
    pub sender_artifact: PathBuf,
    /// Compiled artifact of the receiver contract.
    pub receiver_artifact: PathBuf,
    /// Save the registry once both contracts are deployed, before registration.
    pub persist_before_registration: bool,
    /// Network used for the explorer link printed after a send.
    pub explorer_network: ExplorerNetwork,
}

impl Default for Deployer {
    fn default() -> Self {
        DeployerBuilder::new().build()
    }
}

impl Deployer {
    /// Save the configuration to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize deployer config to TOML")?;
        std::fs::write(path, content)
            .context(format!("Failed to write config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Load the configuration from a TOML file, layering `COURIER_*` environment overrides.
    ///
    /// `path` may point to the file itself or to a directory containing
    /// [`COURIER_CONF_FILENAME`]. Keys missing from the file keep their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "Configuration file or directory not found: {}",
                path.display()
            ));
        }

        let config_path = if path.is_dir() {
            path.join(COURIER_CONF_FILENAME)
        } else {
            path.to_path_buf()
        };

        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed(COURIER_ENV_PREFIX))
            .extract()
            .context(format!(
                "Failed to parse config file {} as TOML",
                config_path.display()
            ))?;
        tracing::info!(path = %config_path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load the descriptor file and resolve every endpoint against `env`.
    pub fn load_chains(&self, env: &Environment) -> Result<Vec<ChainDescriptor>> {
        let chains = ChainsConfig::load(&self.chains_path)?.resolve(env);
        tracing::debug!(count = chains.len(), path = %self.chains_path.display(), "Chains loaded");
        Ok(chains)
    }

    /// Load the deployment registry.
    pub fn load_registry(&self) -> Result<DeploymentRegistry> {
        Ok(DeploymentRegistry::load(&self.registry_path)?)
    }

    fn load_artifacts(&self) -> Result<(ContractArtifact, ContractArtifact)> {
        Ok((
            self.load_artifact(ContractSide::Sender)?,
            self.load_artifact(ContractSide::Receiver)?,
        ))
    }

    fn load_artifact(&self, side: ContractSide) -> Result<ContractArtifact> {
        let (path, functions) = match side {
            ContractSide::Sender => (&self.sender_artifact, SENDER_FUNCTIONS),
            ContractSide::Receiver => (&self.receiver_artifact, RECEIVER_FUNCTIONS),
        };

        let artifact = ContractArtifact::load(path)?;
        artifact
            .ensure_functions(functions)
            .with_context(|| format!("The {side} artifact does not match the expected interface"))?;
        Ok(artifact)
    }
}

impl Deployer {
    /// Deploy the contract pair, record it, and register the sender on the receiver.
    pub async fn deploy<C: ChainConnector>(
        &self,
        connector: &C,
        source: &ChainDescriptor,
        target: &ChainDescriptor,
    ) -> Result<DeploymentSummary> {
        tracing::info!(
            source = %source.description,
            target = %target.description,
            "Starting deployment process..."
        );

        let (sender_artifact, receiver_artifact) = self.load_artifacts()?;
        let mut registry = self.load_registry()?;

        let pair = DeploymentOrchestrator::new(connector)
            .deploy_pair(source, target, &sender_artifact, &receiver_artifact)
            .await?;

        registry.upsert(
            source.chain_id,
            RecordPatch::sender(&source.description, pair.sender_address),
        );
        registry.upsert(
            target.chain_id,
            RecordPatch::receiver(&target.description, pair.receiver_address),
        );

        if self.persist_before_registration {
            registry.save()?;
        }

        let registration = RegistrationService::register_sender(
            &pair.target_client,
            pair.receiver_address,
            source.chain_id,
            pair.sender_address,
        )
        .await?;

        registry.save()?;

        tracing::info!("✓ Deployment complete!");
        tracing::info!("");
        tracing::info!("{} sender:   {}", source.description, pair.sender_address);
        tracing::info!("{} receiver: {}", target.description, pair.receiver_address);
        tracing::info!("Registry:      {}", registry.path().display());

        Ok(DeploymentSummary {
            source_chain_id: source.chain_id,
            target_chain_id: target.chain_id,
            sender_address: pair.sender_address,
            receiver_address: pair.receiver_address,
            registration,
        })
    }

    /// Deploy only the sender on `source` and record it.
    ///
    /// Nothing is registered; a later receiver deployment picks the sender up
    /// from the registry.
    pub async fn deploy_sender<C: ChainConnector>(
        &self,
        connector: &C,
        source: &ChainDescriptor,
    ) -> Result<Address> {
        let artifact = self.load_artifact(ContractSide::Sender)?;
        let mut registry = self.load_registry()?;

        let (sender_address, _) = DeploymentOrchestrator::new(connector)
            .deploy_single(source, &artifact)
            .await?;

        registry.upsert(
            source.chain_id,
            RecordPatch::sender(&source.description, sender_address),
        );
        registry.save()?;

        tracing::info!("✓ Sender deployed!");
        tracing::info!("{} sender: {}", source.description, sender_address);
        tracing::info!("Registry:    {}", registry.path().display());

        Ok(sender_address)
    }

    /// Deploy only the receiver on `target` and register the sender recorded for `source`.
    ///
    /// The recorded sender is looked up before anything is deployed.
    pub async fn deploy_receiver<C: ChainConnector>(
        &self,
        connector: &C,
        source: &ChainDescriptor,
        target: &ChainDescriptor,
    ) -> Result<(Address, Confirmation)> {
        let artifact = self.load_artifact(ContractSide::Receiver)?;
        let mut registry = self.load_registry()?;
        let sender_address = MessageRoute::recorded_sender(&registry, source.chain_id)?;

        let (receiver_address, target_client) = DeploymentOrchestrator::new(connector)
            .deploy_single(target, &artifact)
            .await?;

        registry.upsert(
            target.chain_id,
            RecordPatch::receiver(&target.description, receiver_address),
        );
        if self.persist_before_registration {
            registry.save()?;
        }

        let registration = RegistrationService::register_sender(
            &target_client,
            receiver_address,
            source.chain_id,
            sender_address,
        )
        .await?;

        registry.save()?;

        tracing::info!("✓ Receiver deployed!");
        tracing::info!("{} receiver: {}", target.description, receiver_address);
        tracing::info!("Registry:      {}", registry.path().display());

        Ok((receiver_address, registration))
    }

    /// Send `payload` from the sender recorded on `source` to the receiver recorded on `target`.
    ///
    /// Without an explicit `value` the quoted delivery cost is attached.
    pub async fn send_message<C: ChainConnector>(
        &self,
        connector: &C,
        source: &ChainDescriptor,
        target: &ChainDescriptor,
        payload: &str,
        value: Option<U256>,
    ) -> Result<SentMessage> {
        let registry = self.load_registry()?;
        let route = MessageRoute::resolve(&registry, source.chain_id, target.chain_id)?;

        tracing::info!(
            source = %source.description,
            target = %target.description,
            sender = %route.sender,
            receiver = %route.receiver,
            "Sending cross-chain message..."
        );

        let client = connector.connect(source).await?;
        let sent = MessagingClient::new(&client, route.sender, self.explorer_network)
            .send(target.chain_id, route.receiver, payload, value)
            .await?;

        Ok(sent)
    }
}
