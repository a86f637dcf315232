//! Subcommand runners: setup, then hand off to the emulation loop.

use crate::config::{ConfigError, EmulatorConfig};
use crate::emulation::{EmulationSettings, EmulationStats, Emulator};
use anyhow::Context;
use db_credentials::{CredentialKeys, Credentials};
use mysql_sampler::{MySqlRowSampler, RowSource};
use rest_proxy_publisher::{DryRunSink, EventSink, RestProxyPublisher};
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Load credentials, connect, and run the emulation until `shutdown` fires.
///
/// Any error before the loop starts is returned; errors inside the loop
/// are logged and never returned.
pub async fn run_emulation(
    config: EmulatorConfig,
    shutdown: CancellationToken,
) -> anyhow::Result<EmulationStats> {
    let sampler = connect_sampler(&config.credentials_file, config.credential_keys).await?;

    if config.dry_run {
        tracing::info!("[DRY-RUN] Events will be logged, not posted");
        return drive(sampler, DryRunSink, config.emulation, shutdown).await;
    }

    let api_url = config.api_url.ok_or(ConfigError::MissingApiUrl)?;
    tracing::info!("Posting events to {}<topic>", api_url);
    drive(
        sampler,
        RestProxyPublisher::new(api_url),
        config.emulation,
        shutdown,
    )
    .await
}

/// Validate a credentials file and optionally check the connection.
pub async fn check_credentials(
    path: &Path,
    keys: CredentialKeys,
    connect: bool,
) -> anyhow::Result<Credentials> {
    let credentials = Credentials::load(path, keys)
        .with_context(|| format!("Failed to load credentials from {}", path.display()))?;
    tracing::info!("Credentials OK: {}", credentials);

    if connect {
        let pool = mysql_sampler::connect(&credentials);
        mysql_sampler::verify(&pool)
            .await
            .with_context(|| format!("Failed to connect to {credentials}"))?;
        pool.disconnect().await?;
        tracing::info!("Connection OK");
    }

    Ok(credentials)
}

/// Fetch one row and return its event body, or `None` if the offset is past the end.
pub async fn sample_once(
    path: &Path,
    keys: CredentialKeys,
    table: &str,
    offset: u64,
) -> anyhow::Result<Option<String>> {
    let sampler = connect_sampler(path, keys).await?;
    let row = sampler
        .fetch_row(table, offset)
        .await
        .with_context(|| format!("Failed to fetch row {offset} from {table}"));
    sampler.disconnect().await?;

    match row? {
        Some(row) => Ok(Some(row.to_event_body()?)),
        None => {
            tracing::info!("No data found in {} at row {}", table, offset);
            Ok(None)
        }
    }
}

async fn connect_sampler(path: &Path, keys: CredentialKeys) -> anyhow::Result<MySqlRowSampler> {
    let credentials = Credentials::load(path, keys)
        .with_context(|| format!("Failed to load credentials from {}", path.display()))?;

    tracing::info!("Connecting to {}", credentials);
    let pool = mysql_sampler::connect(&credentials);
    mysql_sampler::verify(&pool)
        .await
        .with_context(|| format!("Failed to connect to {credentials}"))?;

    Ok(MySqlRowSampler::new(pool))
}

async fn drive<P: EventSink>(
    sampler: MySqlRowSampler,
    sink: P,
    settings: EmulationSettings,
    shutdown: CancellationToken,
) -> anyhow::Result<EmulationStats> {
    let mut emulator = Emulator::new(sampler, sink, settings);
    let stats = emulator.run(shutdown).await;

    let (sampler, _) = emulator.into_parts();
    if let Err(e) = sampler.disconnect().await {
        tracing::warn!("Failed to close MySQL pool: {}", e);
    }
    Ok(stats)
}
