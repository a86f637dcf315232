//! Error types for the MySQL row sampler.

use thiserror::Error;

/// Errors that can occur while connecting to MySQL or sampling a row.
#[derive(Error, Debug)]
pub enum SamplerError {
    /// MySQL connection or query error.
    #[error("MySQL error: {0}")]
    MySQL(#[from] mysql_async::Error),

    /// A column of the fetched row could not be decoded.
    #[error("Failed to decode row from '{table}': {source}")]
    Conversion {
        table: String,
        #[source]
        source: mysql_types::ConversionError,
    },

    /// Table name that cannot be used as an identifier.
    #[error("Invalid table name: '{0}'")]
    InvalidTable(String),
}
