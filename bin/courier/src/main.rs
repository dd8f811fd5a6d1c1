//! courier is a CLI tool to deploy and wire cross-chain messaging contracts in a few commands.

mod cli;

use std::{
    io::{BufRead, Write},
    process::ExitCode,
};

use alloy_core::primitives::U256;
use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::{Table, presets::UTF8_FULL};

use cli::{ChainSelection, Cli, Command};
use courier_deploy::{
    ChainDescriptor, ChainRole, ChainSelector, ContractSide, CourierError, Deployer,
    DeployerBuilder, Environment, EvmConnector, UNRESOLVED_MARKERS,
};

/// Exit status for failures that are not a [`CourierError`].
const GENERIC_FAILURE: u8 = 1;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; the process environment still applies.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Exit status for `err`, from the first [`CourierError`] in its chain.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<CourierError>())
        .map(CourierError::exit_code)
        .unwrap_or(GENERIC_FAILURE)
}

async fn run(cli: Cli) -> Result<()> {
    let env = Environment::capture();
    let deployer = load_deployer(&cli)?;

    match cli.command {
        Command::Deploy {
            selection,
            save_config,
            no_early_persist,
            only,
        } => {
            let deployer = Deployer {
                persist_before_registration: deployer.persist_before_registration
                    && !no_early_persist,
                ..deployer
            };

            if let Some(path) = save_config {
                deployer.save_to_file(&path)?;
            }

            let credential = env.credential()?;
            let chains = deployer.load_chains(&env)?;

            match only {
                None => {
                    let (source, target) = select_pair(&chains, &selection)?;
                    let connector = EvmConnector::new(credential)?;
                    deployer.deploy(&connector, source, target).await?;
                }
                Some(ContractSide::Sender) => {
                    let source = select_chain(&chains, selection.source, ChainRole::Source)?;
                    let connector = EvmConnector::new(credential)?;
                    deployer.deploy_sender(&connector, source).await?;
                }
                Some(ContractSide::Receiver) => {
                    // The source only contributes its recorded sender and chain id.
                    let source =
                        select_listed_chain(&chains, selection.source, ChainRole::Source)?;
                    let target = select_chain(&chains, selection.target, ChainRole::Target)?;
                    let connector = EvmConnector::new(credential)?;
                    deployer.deploy_receiver(&connector, source, target).await?;
                }
            }
        }

        Command::Send {
            selection,
            message,
            value_wei,
            explorer,
        } => {
            let deployer = Deployer {
                explorer_network: explorer.unwrap_or(deployer.explorer_network),
                ..deployer
            };

            let credential = env.credential()?;
            let chains = deployer.load_chains(&env)?;
            let (source, target) = select_route(&chains, &selection)?;

            let connector = EvmConnector::new(credential)?;
            let sent = deployer
                .send_message(
                    &connector,
                    source,
                    target,
                    &message,
                    value_wei.map(U256::from),
                )
                .await?;

            println!("{}", sent.explorer_url);
        }

        Command::Chains => {
            let chains = deployer.load_chains(&env)?;
            println!("{}", chains_table(&chains));
        }

        Command::Status => {
            let registry = deployer.load_registry()?;
            if registry.records().is_empty() {
                println!("No deployments recorded in {}", registry.path().display());
                return Ok(());
            }

            let mut table = Table::new();
            table.load_preset(UTF8_FULL).set_header([
                "Chain ID",
                "Network",
                "Sender",
                "Receiver",
                "Deployed at",
            ]);
            for (chain_id, record) in registry.records() {
                table.add_row([
                    chain_id.to_string(),
                    record.network_name.clone(),
                    record.sender.clone().unwrap_or_else(|| "-".to_string()),
                    record.receiver.clone().unwrap_or_else(|| "-".to_string()),
                    record.deployed_at.clone(),
                ]);
            }
            println!("{table}");
        }
    }

    Ok(())
}

fn load_deployer(cli: &Cli) -> Result<Deployer> {
    if let Some(config_path) = &cli.config {
        let deployer = Deployer::load_from_file(config_path)?;
        tracing::info!(
            config_path = %config_path.display(),
            registry = %deployer.registry_path.display(),
            "Loaded deployment settings from config file"
        );
        return Ok(deployer);
    }

    let mut builder = DeployerBuilder::new();
    if let Some(root) = &cli.root {
        builder = builder.root(root);
    }
    Ok(builder.build())
}

fn chains_table(chains: &[ChainDescriptor]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(["#", "Network", "Chain ID", "RPC", "Resolved"]);

    for (index, chain) in chains.iter().enumerate() {
        let resolved = !UNRESOLVED_MARKERS.iter().any(|m| chain.rpc.contains(m));
        table.add_row([
            (index + 1).to_string(),
            chain.description.clone(),
            chain.chain_id.to_string(),
            chain.rpc.clone(),
            if resolved { "yes" } else { "no" }.to_string(),
        ]);
    }

    table
}

/// Select source then target, prompting for ordinals that were not given as flags.
fn select_pair<'a>(
    chains: &'a [ChainDescriptor],
    selection: &ChainSelection,
) -> Result<(&'a ChainDescriptor, &'a ChainDescriptor)> {
    let source = select_chain(chains, selection.source, ChainRole::Source)?;
    let target = select_chain(chains, selection.target, ChainRole::Target)?;
    Ok((source, target))
}

/// Like [`select_pair`], but the target of a message is never connected to,
/// so its endpoint may stay unresolved.
fn select_route<'a>(
    chains: &'a [ChainDescriptor],
    selection: &ChainSelection,
) -> Result<(&'a ChainDescriptor, &'a ChainDescriptor)> {
    let source = select_chain(chains, selection.source, ChainRole::Source)?;
    let target = select_listed_chain(chains, selection.target, ChainRole::Target)?;
    Ok((source, target))
}

fn select_chain(
    chains: &[ChainDescriptor],
    ordinal: Option<usize>,
    role: ChainRole,
) -> Result<&ChainDescriptor> {
    let ordinal = match ordinal {
        Some(ordinal) => ordinal,
        None => prompt_ordinal(chains, role)?,
    };
    Ok(ChainSelector::select(chains, ordinal, role)?)
}

fn select_listed_chain(
    chains: &[ChainDescriptor],
    ordinal: Option<usize>,
    role: ChainRole,
) -> Result<&ChainDescriptor> {
    let ordinal = match ordinal {
        Some(ordinal) => ordinal,
        None => prompt_ordinal(chains, role)?,
    };
    Ok(ChainSelector::select_listed(chains, ordinal, role)?)
}

fn prompt_ordinal(chains: &[ChainDescriptor], role: ChainRole) -> Result<usize> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "Select the {role} chain:")?;
    for line in ChainSelector::menu(chains) {
        writeln!(stdout, "  {line}")?;
    }
    write!(stdout, "> ")?;
    stdout.flush()?;

    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read chain selection from stdin")?;

    Ok(ChainSelector::parse_ordinal(role, &input, chains.len())?)
}
