//! The posting emulation loop.
//!
//! Each iteration sleeps a random delay, draws one random row offset, and
//! for every configured table fetches the row at that offset and publishes
//! it to the table's topic. Per-table failures are logged and skipped; the
//! loop itself only ends on the shutdown token or the iteration limit.

use crate::config::TableTopic;
use mysql_sampler::RowSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rest_proxy_publisher::EventSink;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Default upper bound (inclusive) for the random row offset.
pub const DEFAULT_MAX_OFFSET: u64 = 11_000;

/// Default upper bound (inclusive) for the delay between iterations.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(2);

/// Loop parameters.
#[derive(Debug, Clone)]
pub struct EmulationSettings {
    /// Tables to sample, visited in this order every iteration.
    pub tables: Vec<TableTopic>,
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Offsets are drawn from `0..=max_offset`.
    pub max_offset: u64,
    /// Stop after this many iterations; `None` runs until cancelled.
    pub iterations: Option<u64>,
    /// Seed for reproducible delays and offsets.
    pub seed: Option<u64>,
}

impl Default for EmulationSettings {
    fn default() -> Self {
        Self {
            tables: Vec::new(),
            min_delay: Duration::ZERO,
            max_delay: DEFAULT_MAX_DELAY,
            max_offset: DEFAULT_MAX_OFFSET,
            iterations: None,
            seed: None,
        }
    }
}

/// Counters for one emulator run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmulationStats {
    pub iterations: u64,
    pub rows_published: u64,
    pub publish_failures: u64,
    pub empty_fetches: u64,
    pub fetch_errors: u64,
}

/// Drives sampling and publishing.
pub struct Emulator<S, P> {
    source: S,
    sink: P,
    settings: EmulationSettings,
    rng: StdRng,
    stats: EmulationStats,
}

impl<S: RowSource, P: EventSink> Emulator<S, P> {
    pub fn new(source: S, sink: P, settings: EmulationSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            source,
            sink,
            settings,
            rng,
            stats: EmulationStats::default(),
        }
    }

    pub fn stats(&self) -> EmulationStats {
        self.stats
    }

    pub fn into_parts(self) -> (S, P) {
        (self.source, self.sink)
    }

    /// Run until `shutdown` is cancelled or the iteration limit is reached.
    pub async fn run(&mut self, shutdown: CancellationToken) -> EmulationStats {
        info!(
            "Starting posting emulation over {} table(s), offsets 0..={}, delay {:?}..={:?}",
            self.settings.tables.len(),
            self.settings.max_offset,
            self.settings.min_delay,
            self.settings.max_delay
        );

        loop {
            if let Some(limit) = self.settings.iterations {
                if self.stats.iterations >= limit {
                    info!("Reached iteration limit of {}", limit);
                    break;
                }
            }

            let delay = self.next_delay();
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested, stopping emulation");
                    break;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            let offset = self.next_offset();
            self.run_iteration(offset).await;
        }

        info!(
            "Emulation finished: {} iteration(s), {} row(s) published, {} publish failure(s), {} empty fetch(es), {} fetch error(s)",
            self.stats.iterations,
            self.stats.rows_published,
            self.stats.publish_failures,
            self.stats.empty_fetches,
            self.stats.fetch_errors
        );
        self.stats
    }

    /// Fetch and publish one row per table at `offset`.
    ///
    /// Every fetched row gets exactly one publish attempt; nothing here
    /// returns an error.
    pub async fn run_iteration(&mut self, offset: u64) {
        for TableTopic { table, topic } in &self.settings.tables {
            match self.source.fetch_row(table, offset).await {
                Ok(Some(row)) => {
                    let outcome = self.sink.publish(topic, &row).await;
                    if outcome.is_success() {
                        self.stats.rows_published += 1;
                    } else {
                        self.stats.publish_failures += 1;
                    }
                }
                Ok(None) => {
                    info!("No data found in {} at row {}", table, offset);
                    self.stats.empty_fetches += 1;
                }
                Err(e) => {
                    error!("Failed to fetch row {} from {}: {}", offset, table, e);
                    self.stats.fetch_errors += 1;
                }
            }
        }
        self.stats.iterations += 1;
    }

    fn next_delay(&mut self) -> Duration {
        let min = duration_millis(self.settings.min_delay);
        let max = duration_millis(self.settings.max_delay).max(min);
        Duration::from_millis(self.rng.random_range(min..=max))
    }

    fn next_offset(&mut self) -> u64 {
        self.rng.random_range(0..=self.settings.max_offset)
    }
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
