use std::path::PathBuf;

use clap::{Parser, Subcommand};
use courier_deploy::{ContractSide, ExplorerNetwork};
use tracing::level_filters::LevelFilter;

/// The default payload sent by `courier send`.
pub const DEFAULT_MESSAGE: &str = "Hello from Sepolia to Celo!";

#[derive(Parser)]
#[command(name = "courier")]
#[command(
    author,
    version,
    about = "Deploy and wire cross-chain messaging contracts between two EVM networks"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "COURIER_VERBOSITY", default_value_t = LevelFilter::INFO, global = true)]
    pub verbosity: LevelFilter,

    /// Path to an existing Courier.toml configuration file (or its directory).
    ///
    /// When not provided, the default foundry project layout is used.
    #[arg(long, alias = "conf", env = "COURIER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Project root the default paths are resolved against.
    #[arg(long, env = "COURIER_ROOT", global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Deploy the sender on the source chain, the receiver on the target chain, and register the sender.
    Deploy {
        #[clap(flatten)]
        selection: ChainSelection,

        /// Save the effective configuration to this path before deploying.
        #[arg(long)]
        save_config: Option<PathBuf>,

        /// Do not save the registry until the sender is registered.
        #[arg(long, default_value_t = false)]
        no_early_persist: bool,

        /// Deploy a single contract: `sender` on the source chain, or `receiver`
        /// on the target chain registered with the sender recorded for the source.
        #[arg(long)]
        only: Option<ContractSide>,
    },

    /// Send a message through a previously deployed pair.
    Send {
        #[clap(flatten)]
        selection: ChainSelection,

        /// The payload to send.
        #[arg(short, long, default_value = DEFAULT_MESSAGE)]
        message: String,

        /// Value to attach in wei. Defaults to the quoted delivery cost.
        #[arg(long)]
        value_wei: Option<u128>,

        /// Network of the explorer link.
        #[arg(long, env = "COURIER_EXPLORER_NETWORK")]
        explorer: Option<ExplorerNetwork>,
    },

    /// List the configured chains with their resolved endpoints.
    Chains,

    /// Print the deployment registry.
    Status,
}

/// Source and target chain ordinals, as listed by `courier chains`.
///
/// Missing ordinals are prompted for on stdin.
#[derive(Debug, Clone, Parser)]
pub struct ChainSelection {
    /// 1-based ordinal of the source chain.
    #[arg(short, long)]
    pub source: Option<usize>,

    /// 1-based ordinal of the target chain.
    #[arg(short, long)]
    pub target: Option<usize>,
}
