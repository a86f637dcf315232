//! Error types for credential loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading database credentials.
#[derive(Error, Debug)]
pub enum CredentialsError {
    /// The credentials file does not exist.
    #[error("Credentials file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The credentials file exists but could not be read.
    #[error("Failed to read credentials file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML.
    #[error("Error parsing the YAML file: {0}")]
    Malformed(#[from] serde_yaml::Error),

    /// The document parsed but is not a key/value mapping.
    #[error("Invalid YAML format: expected a mapping of credential keys")]
    NotAMapping,

    /// One or more required keys are absent (or null).
    #[error("Missing required database credentials: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// A key is present but holds a sequence or mapping instead of a scalar.
    #[error("Credential '{0}' must be a scalar value")]
    InvalidValue(String),

    /// The password is not a YAML string, so its exact text is unknown.
    #[error("Credential '{0}' must be a quoted string")]
    NotAString(String),

    /// The port is not an integer in 1..=65535.
    #[error("Invalid database port: {0}")]
    InvalidPort(String),
}
