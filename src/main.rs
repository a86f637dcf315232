//! Command-line interface for posting-emulator
//!
//! # Usage Examples
//!
//! ## Run
//! ```bash
//! # Post sampled rows until interrupted
//! posting-emulator run \
//!   --creds-file db_creds.yaml \
//!   --api-url https://gateway.example.com/test/topics/ \
//!   --table-topic pinterest_data=0affd83dcba5.pin
//!
//! # Use a config file, override the table list, stop after 100 iterations
//! posting-emulator run --config emulator.yaml \
//!   --table-topic user_data=0affd83dcba5.user \
//!   --iterations 100
//! ```
//!
//! ## Credentials
//! ```bash
//! # Validate the credentials file and test the connection
//! posting-emulator check-credentials --creds-file db_creds.yaml --connect
//! ```
//!
//! ## Sample
//! ```bash
//! # Print the event that would be sent for row 42 of pinterest_data
//! posting-emulator sample --creds-file db_creds.yaml --table pinterest_data --offset 42
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use posting_emulator::{
    check_credentials, run_emulation, sample_once, ConfigFile, ConfigOverrides, CredentialArgs,
    EmulatorConfig, RunArgs,
};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "posting-emulator")]
#[command(about = "Emulates user activity by posting random MySQL rows to a Kafka REST proxy")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample rows and post them as events until interrupted
    Run(RunArgs),

    /// Load and validate a credentials file
    CheckCredentials {
        #[command(flatten)]
        credentials: CredentialArgs,

        /// Also open a connection and ping the database
        #[arg(long)]
        connect: bool,
    },

    /// Fetch a single row and print its event JSON to stdout
    Sample {
        #[command(flatten)]
        credentials: CredentialArgs,

        /// Table to read from
        #[arg(long)]
        table: String,

        /// Number of rows to skip
        #[arg(long, default_value = "0")]
        offset: u64,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let file = match &args.config {
                Some(path) => ConfigFile::from_file(path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?,
                None => ConfigFile::default(),
            };
            let config = EmulatorConfig::resolve(file, ConfigOverrides::from(args))?;

            let shutdown = setup_shutdown_handler();
            run_emulation(config, shutdown).await?;
        }
        Commands::CheckCredentials {
            credentials,
            connect,
        } => {
            let path = require_creds_file(credentials.creds_file)?;
            check_credentials(
                &path,
                credentials.credential_keys.unwrap_or_default(),
                connect,
            )
            .await?;
        }
        Commands::Sample {
            credentials,
            table,
            offset,
        } => {
            let path = require_creds_file(credentials.creds_file)?;
            let keys = credentials.credential_keys.unwrap_or_default();
            if let Some(body) = sample_once(&path, keys, &table, offset).await? {
                println!("{body}");
            }
        }
    }

    Ok(())
}

fn require_creds_file(path: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    path.context("--creds-file (or EMULATOR_CREDS_FILE) is required")
}

/// Cancel the returned token on Ctrl+C.
fn setup_shutdown_handler() -> CancellationToken {
    let shutdown = CancellationToken::new();
    let token = shutdown.clone();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received interrupt signal (Ctrl+C)");
                token.cancel();
            }
            Err(e) => tracing::error!("Failed to install Ctrl+C handler: {}", e),
        }
    });

    shutdown
}
