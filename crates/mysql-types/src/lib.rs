//! MySQL row decoding and JSON event encoding.
//!
//! This crate owns the in-memory shape of a sampled database row and the
//! two conversions that touch it:
//!
//! - `reverse`: Convert MySQL values → `ColumnValue` (for reading sampled rows)
//! - `row`: `SampledRow` and its JSON event encoding (date/time values as ISO-8601 text)
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use mysql_types::{ColumnValue, SampledRow};
//!
//! let created_at = NaiveDate::from_ymd_opt(2024, 6, 15)
//!     .unwrap()
//!     .and_hms_opt(10, 30, 45)
//!     .unwrap();
//!
//! let mut row = SampledRow::new();
//! row.push("id", ColumnValue::Int(1));
//! row.push("created_at", ColumnValue::DateTime(created_at));
//!
//! let body = row.to_event_body().unwrap();
//! assert_eq!(body, r#"{"id":1,"created_at":"2024-06-15T10:30:45"}"#);
//! ```

pub mod reverse;
pub mod row;

pub use reverse::{row_to_sampled_row, ConversionError, MySQLValueWithSchema};
pub use row::{iso8601, ColumnValue, SampledRow};
