//! rs-soroban-replay - Replay and compare Stellar transactions
//!
//! This binary resolves a transaction hash into its recorded envelope, result
//! and meta, extracts the ledger entries the transaction touched, fetches
//! their current values, and replays the transaction through a simulation
//! engine. With a comparison network it replays on both networks concurrently
//! and prints a structural diff of the two outcomes.
//!
//! ## Usage
//!
//! ```text
//! rs-soroban-replay debug <HASH>                          # Replay on mainnet
//! rs-soroban-replay debug <HASH> --network testnet        # Replay on testnet
//! rs-soroban-replay debug <HASH> --compare-network testnet
//! ```
//!
//! The simulation engine binary is resolved from `--engine` or the
//! `SOROBAN_REPLAY_ENGINE` environment variable.

mod logging;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use soroban_replay_debug::{debug, SessionConfig};
use soroban_replay_rpc::Network;
use soroban_replay_sim::ProcessSimulator;

use logging::{LogConfig, LogFormat};

/// Environment variable naming the simulation engine binary.
const ENGINE_ENV: &str = "SOROBAN_REPLAY_ENGINE";

/// Replay and compare Stellar transactions
#[derive(Parser)]
#[command(name = "rs-soroban-replay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Log output format
    #[arg(long, default_value = "text", global = true)]
    log_format: CliLogFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Log output format for CLI
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum CliLogFormat {
    #[default]
    Text,
    Json,
}

impl From<CliLogFormat> for LogFormat {
    fn from(fmt: CliLogFormat) -> Self {
        match fmt {
            CliLogFormat::Text => LogFormat::Text,
            CliLogFormat::Json => LogFormat::Json,
        }
    }
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Replay a transaction and report the outcome
    Debug {
        /// Transaction hash (64 hex characters)
        #[arg(value_name = "HASH")]
        tx_hash: String,

        /// Network the transaction was recorded on
        #[arg(long, default_value = "mainnet")]
        network: CliNetwork,

        /// Second network to replay against and diff with
        #[arg(long)]
        compare_network: Option<CliNetwork>,

        /// Override the primary network's Horizon URL
        #[arg(long, value_name = "URL")]
        horizon_url: Option<String>,

        /// Simulation engine binary (overrides SOROBAN_REPLAY_ENGINE)
        #[arg(long, value_name = "PATH")]
        engine: Option<PathBuf>,
    },
}

/// Network selection for CLI
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum CliNetwork {
    Testnet,
    Mainnet,
    Futurenet,
}

impl From<CliNetwork> for Network {
    fn from(network: CliNetwork) -> Self {
        match network {
            CliNetwork::Testnet => Network::Testnet,
            CliNetwork::Mainnet => Network::Mainnet,
            CliNetwork::Futurenet => Network::Futurenet,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    match cli.command {
        Commands::Debug {
            tx_hash,
            network,
            compare_network,
            horizon_url,
            engine,
        } => {
            cmd_debug(
                tx_hash,
                network.into(),
                compare_network.map(Into::into),
                horizon_url,
                engine,
            )
            .await
        }
    }
}

/// Initialize the logging subsystem.
fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    let config = LogConfig::default().with_level(level);

    let config = match cli.log_format {
        CliLogFormat::Text => config,
        CliLogFormat::Json => LogConfig {
            format: LogFormat::Json,
            ansi_colors: false,
            ..config
        },
    };

    logging::init(&config)?;

    tracing::debug!("Logging initialized");
    Ok(())
}

/// Debug command handler.
async fn cmd_debug(
    tx_hash: String,
    network: Network,
    compare_network: Option<Network>,
    horizon_url: Option<String>,
    engine: Option<PathBuf>,
) -> anyhow::Result<()> {
    let tx_hash = normalize_tx_hash(&tx_hash)?;

    if compare_network == Some(network) {
        anyhow::bail!("Comparison network must differ from the primary network");
    }

    let engine = resolve_engine(engine)?;
    let simulator = ProcessSimulator::new(engine);

    let config = SessionConfig {
        network,
        compare_network,
        horizon_url,
    };

    let outcome = debug(&config, &simulator, &tx_hash).await?;
    output::print_outcome(&outcome);

    Ok(())
}

/// Validate and lowercase a transaction hash.
fn normalize_tx_hash(hash: &str) -> anyhow::Result<String> {
    let hash = hash.trim().to_lowercase();
    if hash.len() != 64 || !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
        anyhow::bail!("Invalid transaction hash (expected 64 hex characters): {hash}");
    }
    Ok(hash)
}

/// Resolve the simulation engine binary from the flag or the environment.
fn resolve_engine(engine: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(engine) = engine {
        return Ok(engine);
    }
    match std::env::var_os(ENGINE_ENV) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => anyhow::bail!("No simulation engine configured. Use --engine or set {ENGINE_ENV}."),
    }
}
