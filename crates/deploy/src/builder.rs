//! Builder module for creating a [`Deployer`] configuration.
//!
//! The defaults follow the layout of a foundry project: descriptors and the
//! registry under `deploy-config/`, compiled artifacts under `out/`.

use std::path::PathBuf;

use crate::{Deployer, ExplorerNetwork};

/// Default chain descriptor file.
pub const DEFAULT_CHAINS_PATH: &str = "deploy-config/chains.json";
/// Default deployment registry.
pub const DEFAULT_REGISTRY_PATH: &str = "deploy-config/contracts.json";
/// Default sender artifact emitted by `forge build`.
pub const DEFAULT_SENDER_ARTIFACT: &str =
    "out/CrossChainTokenSender.sol/CrossChainTokenSender.json";
/// Default receiver artifact emitted by `forge build`.
pub const DEFAULT_RECEIVER_ARTIFACT: &str =
    "out/CrossChainTokenReceiver.sol/CrossChainTokenReceiver.json";

/// Builder for creating a [`Deployer`] configuration.
///
/// When a project root is set, every relative path is resolved against it.
///
/// # Example
///
/// ```no_run
/// use courier_deploy::DeployerBuilder;
///
/// let deployer = DeployerBuilder::new()
///     .root("./messaging")
///     .registry_path("deploy-config/testnet.json")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct DeployerBuilder {
    root: Option<PathBuf>,
    chains_path: PathBuf,
    registry_path: PathBuf,
    sender_artifact: PathBuf,
    receiver_artifact: PathBuf,
    persist_before_registration: bool,
    explorer_network: ExplorerNetwork,
}

impl Default for DeployerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DeployerBuilder {
    pub fn new() -> Self {
        Self {
            root: None,
            chains_path: PathBuf::from(DEFAULT_CHAINS_PATH),
            registry_path: PathBuf::from(DEFAULT_REGISTRY_PATH),
            sender_artifact: PathBuf::from(DEFAULT_SENDER_ARTIFACT),
            receiver_artifact: PathBuf::from(DEFAULT_RECEIVER_ARTIFACT),
            persist_before_registration: true,
            explorer_network: ExplorerNetwork::default(),
        }
    }

    /// Set the project root relative paths are resolved against.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn chains_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chains_path = path.into();
        self
    }

    pub fn registry_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.registry_path = path.into();
        self
    }

    pub fn sender_artifact(mut self, path: impl Into<PathBuf>) -> Self {
        self.sender_artifact = path.into();
        self
    }

    pub fn receiver_artifact(mut self, path: impl Into<PathBuf>) -> Self {
        self.receiver_artifact = path.into();
        self
    }

    /// Whether the registry is saved before registration is attempted.
    ///
    /// Enabled by default so the deployed addresses survive a failed registration.
    pub fn persist_before_registration(mut self, persist: bool) -> Self {
        self.persist_before_registration = persist;
        self
    }

    pub fn explorer_network(mut self, network: ExplorerNetwork) -> Self {
        self.explorer_network = network;
        self
    }

    /// Build the [`Deployer`] configuration.
    pub fn build(self) -> Deployer {
        let resolve = |path: PathBuf| match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        };

        let deployer = Deployer {
            chains_path: resolve(self.chains_path.clone()),
            registry_path: resolve(self.registry_path.clone()),
            sender_artifact: resolve(self.sender_artifact.clone()),
            receiver_artifact: resolve(self.receiver_artifact.clone()),
            persist_before_registration: self.persist_before_registration,
            explorer_network: self.explorer_network,
        };

        tracing::debug!(?deployer, "Built deployer configuration");
        deployer
    }
}
