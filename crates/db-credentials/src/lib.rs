//! Database credential loading.
//!
//! Credentials are read from a YAML mapping. Two key naming schemes are in
//! circulation for the same five values, so the scheme is chosen explicitly
//! with [`CredentialKeys`]:
//!
//! ```yaml
//! # CredentialKeys::Rds (default)
//! RDS_HOST: db.example.internal
//! RDS_USER: emulator
//! RDS_PASSWORD: secret
//! RDS_DATABASE: pinterest_data
//! RDS_PORT: 3306
//!
//! # CredentialKeys::Plain
//! HOST: db.example.internal
//! USER: emulator
//! PASSWORD: secret
//! DATABASE: pinterest_data
//! PORT: 3306
//! ```

pub mod error;
mod mask;

pub use error::CredentialsError;
pub use mask::mask_connection_password;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::fmt;
use std::path::Path;

/// Key naming scheme used by a credentials document.
#[derive(clap::ValueEnum, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKeys {
    /// `RDS_HOST`, `RDS_USER`, `RDS_PASSWORD`, `RDS_DATABASE`, `RDS_PORT`
    #[default]
    Rds,
    /// `HOST`, `USER`, `PASSWORD`, `DATABASE`, `PORT`
    Plain,
}

impl CredentialKeys {
    /// Required keys in the order host, user, password, database, port.
    pub fn required(self) -> [&'static str; 5] {
        match self {
            CredentialKeys::Rds => [
                "RDS_HOST",
                "RDS_USER",
                "RDS_PASSWORD",
                "RDS_DATABASE",
                "RDS_PORT",
            ],
            CredentialKeys::Plain => ["HOST", "USER", "PASSWORD", "DATABASE", "PORT"],
        }
    }
}

/// Validated connection parameters for the source database.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
}

impl Credentials {
    /// Load credentials from a YAML file.
    ///
    /// Every failure is logged before it is returned.
    pub fn load<P: AsRef<Path>>(path: P, keys: CredentialKeys) -> Result<Self, CredentialsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                logged(CredentialsError::NotFound(path.to_path_buf()))
            } else {
                logged(CredentialsError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        })?;
        Self::from_yaml(&content, keys)
    }

    /// Parse credentials from a YAML string.
    pub fn from_yaml(yaml: &str, keys: CredentialKeys) -> Result<Self, CredentialsError> {
        let document: Value =
            serde_yaml::from_str(yaml).map_err(|e| logged(CredentialsError::Malformed(e)))?;
        let Value::Mapping(mapping) = document else {
            return Err(logged(CredentialsError::NotAMapping));
        };
        Self::from_mapping(&mapping, keys).map_err(logged)
    }

    fn from_mapping(mapping: &Mapping, keys: CredentialKeys) -> Result<Self, CredentialsError> {
        let required = keys.required();

        // A key holding `null` counts as missing.
        let missing: Vec<String> = required
            .iter()
            .filter(|key| matches!(mapping.get(**key), None | Some(Value::Null)))
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(CredentialsError::MissingFields(missing));
        }

        let [host, user, password, database, port] = required;
        Ok(Self {
            host: scalar(mapping, host)?,
            user: scalar(mapping, user)?,
            password: string(mapping, password)?,
            database: scalar(mapping, database)?,
            port: parse_port(mapping, port)?,
        })
    }

    /// Connection URL with the password masked, safe to log.
    pub fn masked_url(&self) -> String {
        mask_connection_password(&format!(
            "mysql://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        ))
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked_url())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("port", &self.port)
            .finish()
    }
}

fn logged(err: CredentialsError) -> CredentialsError {
    tracing::error!("{err}");
    err
}

fn scalar(mapping: &Mapping, key: &str) -> Result<String, CredentialsError> {
    match mapping.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(Value::Null) | None => Err(CredentialsError::MissingFields(vec![key.to_string()])),
        Some(_) => Err(CredentialsError::InvalidValue(key.to_string())),
    }
}

/// Numbers and booleans are re-rendered by the YAML parser (`1.50` reads
/// back as `1.5`), so only string values are accepted here.
fn string(mapping: &Mapping, key: &str) -> Result<String, CredentialsError> {
    match mapping.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) | None => Err(CredentialsError::MissingFields(vec![key.to_string()])),
        Some(Value::Number(_)) | Some(Value::Bool(_)) => {
            Err(CredentialsError::NotAString(key.to_string()))
        }
        Some(_) => Err(CredentialsError::InvalidValue(key.to_string())),
    }
}

fn parse_port(mapping: &Mapping, key: &str) -> Result<u16, CredentialsError> {
    let raw = scalar(mapping, key)?;
    match raw.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(CredentialsError::InvalidPort(raw)),
    }
}
