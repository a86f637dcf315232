//! CLI argument definitions shared by the emulator subcommands.

use crate::config::{parse_duration, ConfigOverrides, TableTopic};
use clap::Args;
use db_credentials::CredentialKeys;
use std::path::PathBuf;
use std::time::Duration;

/// Where to find database credentials.
#[derive(Args, Clone, Debug)]
pub struct CredentialArgs {
    /// Path to the YAML credentials file
    #[arg(long, env = "EMULATOR_CREDS_FILE")]
    pub creds_file: Option<PathBuf>,

    /// Key naming scheme used in the credentials file
    #[arg(long, value_enum, env = "EMULATOR_CREDENTIAL_KEYS")]
    pub credential_keys: Option<CredentialKeys>,
}

/// Arguments for `posting-emulator run`.
#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// YAML config file (api_url, credentials_file, tables_to_topics, ...)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Base URL of the REST proxy; the topic name is appended verbatim
    #[arg(long, env = "EMULATOR_API_URL")]
    pub api_url: Option<String>,

    /// Table to sample and its destination topic, as TABLE=TOPIC (repeatable)
    #[arg(long = "table-topic", value_name = "TABLE=TOPIC")]
    pub table_topics: Vec<TableTopic>,

    /// Minimum delay between iterations (e.g. 0s, 250ms)
    #[arg(long, value_parser = parse_duration)]
    pub min_delay: Option<Duration>,

    /// Maximum delay between iterations (e.g. 2s)
    #[arg(long, value_parser = parse_duration)]
    pub max_delay: Option<Duration>,

    /// Largest row offset to sample (inclusive)
    #[arg(long)]
    pub max_offset: Option<u64>,

    /// Stop after this many iterations instead of running until interrupted
    #[arg(long)]
    pub iterations: Option<u64>,

    /// Random seed for reproducible offsets and delays
    #[arg(long)]
    pub seed: Option<u64>,

    /// Dry-run mode: sample rows and log the events without posting them
    #[arg(long)]
    pub dry_run: bool,
}

// CLI type → library config conversion
impl From<RunArgs> for ConfigOverrides {
    fn from(args: RunArgs) -> Self {
        Self {
            api_url: args.api_url,
            credentials_file: args.credentials.creds_file,
            credential_keys: args.credentials.credential_keys,
            table_topics: args.table_topics,
            min_delay: args.min_delay,
            max_delay: args.max_delay,
            max_offset: args.max_offset,
            iterations: args.iterations,
            seed: args.seed,
            dry_run: args.dry_run,
        }
    }
}
