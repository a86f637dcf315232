//! Emulator configuration.
//!
//! Configuration comes from an optional YAML file and from CLI flags; flags
//! win. A complete file looks like:
//!
//! ```yaml
//! api_url: https://gateway.example.com/test/topics/
//! credentials_file: db_creds.yaml
//! credential_keys: rds
//! tables_to_topics:
//!   pinterest_data: 0affd83dcba5.pin
//!   geolocation_data: 0affd83dcba5.geo
//!   user_data: 0affd83dcba5.user
//! min_delay: 0s
//! max_delay: 2s
//! max_offset: 11000
//! ```

mod duration;

pub use duration::parse_duration;

use crate::emulation::EmulationSettings;
use db_credentials::CredentialKeys;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors in the emulator configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("No API URL configured (set api_url or --api-url)")]
    MissingApiUrl,

    #[error("No credentials file configured (set credentials_file or --creds-file)")]
    MissingCredentialsFile,

    #[error("No tables configured (set tables_to_topics or --table-topic)")]
    NoTables,

    #[error("Invalid table/topic pair '{0}': expected TABLE=TOPIC")]
    InvalidTableTopic(String),

    #[error("tables_to_topics must map table names to topic names: {0}")]
    InvalidMapping(String),

    #[error("min_delay ({min:?}) is greater than max_delay ({max:?})")]
    DelayRange { min: Duration, max: Duration },
}

/// Destination topic for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTopic {
    pub table: String,
    pub topic: String,
}

impl TableTopic {
    pub fn new(table: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            topic: topic.into(),
        }
    }
}

impl FromStr for TableTopic {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((table, topic)) if !table.trim().is_empty() && !topic.trim().is_empty() => {
                Ok(Self::new(table.trim(), topic.trim()))
            }
            _ => Err(ConfigError::InvalidTableTopic(s.to_string())),
        }
    }
}

/// Contents of the YAML config file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub api_url: Option<String>,
    pub credentials_file: Option<PathBuf>,
    pub credential_keys: Option<CredentialKeys>,
    /// Kept as a YAML mapping so declaration order survives.
    pub tables_to_topics: Option<serde_yaml::Mapping>,
    #[serde(default, deserialize_with = "deserialize_opt_duration")]
    pub min_delay: Option<Duration>,
    #[serde(default, deserialize_with = "deserialize_opt_duration")]
    pub max_delay: Option<Duration>,
    pub max_offset: Option<u64>,
    pub iterations: Option<u64>,
    pub seed: Option<u64>,
}

impl ConfigFile {
    /// Load config from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Table/topic pairs in declaration order, if the file has any.
    pub fn table_topics(&self) -> Result<Option<Vec<TableTopic>>, ConfigError> {
        let Some(mapping) = &self.tables_to_topics else {
            return Ok(None);
        };

        mapping
            .iter()
            .map(|(table, topic)| match (table.as_str(), topic.as_str()) {
                (Some(table), Some(topic)) if !table.is_empty() && !topic.is_empty() => {
                    Ok(TableTopic::new(table, topic))
                }
                _ => Err(ConfigError::InvalidMapping(format!("{table:?}: {topic:?}"))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

fn deserialize_opt_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Secs(u64),
        Text(String),
    }

    match Option::<Repr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Repr::Secs(secs)) => Ok(Some(Duration::from_secs(secs))),
        Some(Repr::Text(text)) => parse_duration(&text)
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("{e:#}"))),
    }
}

/// Values given on the command line; `Some` / non-empty values override the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub credentials_file: Option<PathBuf>,
    pub credential_keys: Option<CredentialKeys>,
    pub table_topics: Vec<TableTopic>,
    pub min_delay: Option<Duration>,
    pub max_delay: Option<Duration>,
    pub max_offset: Option<u64>,
    pub iterations: Option<u64>,
    pub seed: Option<u64>,
    pub dry_run: bool,
}

/// Fully resolved configuration for one emulator run.
#[derive(Debug, Clone)]
pub struct EmulatorConfig {
    /// `None` only in dry-run mode.
    pub api_url: Option<String>,
    pub credentials_file: PathBuf,
    pub credential_keys: CredentialKeys,
    pub dry_run: bool,
    pub emulation: EmulationSettings,
}

impl EmulatorConfig {
    /// Merge file values and CLI overrides, then validate.
    pub fn resolve(file: ConfigFile, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let defaults = EmulationSettings::default();

        // --table-topic replaces the file mapping as a whole.
        let tables = if overrides.table_topics.is_empty() {
            file.table_topics()?.unwrap_or_default()
        } else {
            overrides.table_topics
        };
        if tables.is_empty() {
            return Err(ConfigError::NoTables);
        }

        let api_url = overrides.api_url.or(file.api_url);
        if api_url.is_none() && !overrides.dry_run {
            return Err(ConfigError::MissingApiUrl);
        }

        let credentials_file = overrides
            .credentials_file
            .or(file.credentials_file)
            .ok_or(ConfigError::MissingCredentialsFile)?;

        let min_delay = overrides
            .min_delay
            .or(file.min_delay)
            .unwrap_or(defaults.min_delay);
        let max_delay = overrides
            .max_delay
            .or(file.max_delay)
            .unwrap_or(defaults.max_delay);
        if min_delay > max_delay {
            return Err(ConfigError::DelayRange {
                min: min_delay,
                max: max_delay,
            });
        }

        Ok(Self {
            api_url,
            credentials_file,
            credential_keys: overrides
                .credential_keys
                .or(file.credential_keys)
                .unwrap_or_default(),
            dry_run: overrides.dry_run,
            emulation: EmulationSettings {
                tables,
                min_delay,
                max_delay,
                max_offset: overrides
                    .max_offset
                    .or(file.max_offset)
                    .unwrap_or(defaults.max_offset),
                iterations: overrides.iterations.or(file.iterations),
                seed: overrides.seed.or(file.seed),
            },
        })
    }
}
