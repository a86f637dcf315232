//! Event sink abstraction.

use mysql_types::SampledRow;

/// Result of a single publish attempt.
///
/// Publishing never fails from the caller's point of view: every failure is
/// logged by the sink and reported here so the caller can count it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The endpoint answered with a 2xx status.
    Delivered { status: u16 },
    /// The event was only logged (dry run).
    Logged,
    /// The endpoint answered with a non-2xx status.
    Rejected { status: u16, body: String },
    /// The request never completed (connect, DNS, timeout) or the row could not be encoded.
    Failed { reason: String },
}

impl PublishOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PublishOutcome::Delivered { .. } | PublishOutcome::Logged)
    }
}

/// Destination for sampled rows.
#[async_trait::async_trait]
pub trait EventSink: Send + Sync {
    /// Publish one row to `topic`. No retries.
    async fn publish(&self, topic: &str, row: &SampledRow) -> PublishOutcome;
}

/// Sink that logs the event it would have sent.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunSink;

#[async_trait::async_trait]
impl EventSink for DryRunSink {
    async fn publish(&self, topic: &str, row: &SampledRow) -> PublishOutcome {
        match row.to_event_body() {
            Ok(body) => {
                tracing::info!("[DRY-RUN] Would send data to {}: {}", topic, body);
                PublishOutcome::Logged
            }
            Err(e) => {
                tracing::error!("Failed to encode row for {}: {}", topic, e);
                PublishOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
