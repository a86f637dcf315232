//! Event publishing for posting-emulator.
//!
//! Each sampled row becomes one HTTP POST to a Kafka REST proxy:
//!
//! ```text
//! POST {base_url}{topic}
//! Content-Type: application/json
//!
//! {"ind":7528,"timestamp":"2020-08-28T03:52:47", ...}
//! ```
//!
//! Failures are logged and returned as a [`PublishOutcome`]; nothing is
//! retried.

mod publisher;
mod sink;

pub use publisher::RestProxyPublisher;
pub use sink::{DryRunSink, EventSink, PublishOutcome};
