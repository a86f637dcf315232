//! Posting Emulator Library
//!
//! Emulates a stream of user-activity events by sampling random rows from
//! MySQL tables and posting each one as JSON to a Kafka REST proxy.
//!
//! # Components
//!
//! - `db_credentials` - YAML credential loading (`RDS_*` or plain key names)
//! - `mysql_sampler` - connection pool and `LIMIT offset, 1` row sampling
//! - `rest_proxy_publisher` - `POST {api_url}{topic}` with the row as JSON
//! - [`emulation`] - the sampling loop, with a cancellation token and optional iteration limit
//! - [`config`] - YAML config file plus CLI overrides
//!
//! # CLI Usage
//!
//! ```bash
//! # Run against a REST proxy until Ctrl+C
//! posting-emulator run \
//!   --creds-file db_creds.yaml \
//!   --api-url https://gateway.example.com/test/topics/ \
//!   --table-topic pinterest_data=0affd83dcba5.pin \
//!   --table-topic geolocation_data=0affd83dcba5.geo \
//!   --table-topic user_data=0affd83dcba5.user
//!
//! # Same, from a config file, logging events instead of posting them
//! posting-emulator run --config emulator.yaml --dry-run --iterations 10
//! ```

pub mod args;
pub mod config;
pub mod emulation;
pub mod run;

pub use args::{CredentialArgs, RunArgs};
pub use config::{ConfigError, ConfigFile, ConfigOverrides, EmulatorConfig, TableTopic};
pub use emulation::{EmulationSettings, EmulationStats, Emulator};
pub use run::{check_credentials, run_emulation, sample_once};
