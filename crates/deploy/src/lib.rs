//! courier-deploy - Deployment library for cross-chain messaging contracts.
//!
//! This crate deploys a sender/receiver contract pair across two EVM networks,
//! registers the sender on the receiver, keeps a registry of what was deployed
//! where, and sends messages through the deployed pair.

mod error;
pub use error::CourierError;

mod env;
pub use env::{Credential, Environment, PRIVATE_KEY_VAR};

mod chains;
pub use chains::{
    BridgeInfra, ChainDescriptor, ChainsConfig, ENDPOINT_TEMPLATES, EndpointTemplate, resolve_all,
    resolve_endpoint,
};

mod selector;
pub use selector::{ChainRole, ChainSelector, UNRESOLVED_MARKERS};

pub mod artifact;
pub use artifact::ContractArtifact;

pub mod contracts;

mod client;
pub use client::{ChainConnector, Confirmation, Deployable, Registrable, Sendable};

pub mod rpc;

mod evm;
pub use evm::{EvmChainClient, EvmConnector};

mod orchestrator;
pub use orchestrator::{DeploymentOrchestrator, PairDeployment};

mod registration;
pub use registration::{RegistrationService, pad_address};

mod registry;
pub use registry::{DeploymentRecord, DeploymentRegistry, RecordPatch};

mod messaging;
pub use messaging::{ExplorerNetwork, MessageRoute, MessagingClient, SentMessage};

mod deployer;
pub use deployer::{
    COURIER_CONF_FILENAME, COURIER_ENV_PREFIX, ContractSide, Deployer, DeploymentSummary,
};

mod builder;
pub use builder::{
    DEFAULT_CHAINS_PATH, DEFAULT_RECEIVER_ARTIFACT, DEFAULT_REGISTRY_PATH,
    DEFAULT_SENDER_ARTIFACT, DeployerBuilder,
};
