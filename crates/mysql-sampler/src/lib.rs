//! MySQL access for posting-emulator.
//!
//! - `connect`: build a lazily-connecting pool from [`db_credentials::Credentials`]
//! - `sample`: the [`RowSource`] trait and its MySQL implementation

pub mod connect;
pub mod error;
pub mod sample;

pub use connect::{connect, verify};
pub use error::SamplerError;
pub use sample::{quote_identifier, select_row_sql, MySqlRowSampler, RowSource};
