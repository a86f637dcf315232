//! HTTP publisher for a Kafka REST proxy.

use crate::sink::{EventSink, PublishOutcome};
use mysql_types::SampledRow;
use reqwest::header::CONTENT_TYPE;

/// Posts each row as a JSON object to `{base_url}{topic}`.
///
/// The base URL is used verbatim, so it normally ends with `/`
/// (e.g. `https://gateway.example.com/test/topics/`).
#[derive(Debug, Clone)]
pub struct RestProxyPublisher {
    client: reqwest::Client,
    base_url: String,
}

impl RestProxyPublisher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Use a preconfigured client (timeouts, proxies, TLS roots).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Destination URL for a topic.
    pub fn topic_url(&self, topic: &str) -> String {
        format!("{}{}", self.base_url, topic)
    }
}

#[async_trait::async_trait]
impl EventSink for RestProxyPublisher {
    async fn publish(&self, topic: &str, row: &SampledRow) -> PublishOutcome {
        let body = match row.to_event_body() {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to encode row for {}: {}", topic, e);
                return PublishOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let url = self.topic_url(topic);
        let response = match self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.clone())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Error sending data to {}: {}", topic, e);
                return PublishOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let status = response.status();
        if status.is_success() {
            tracing::info!("Successfully sent data to {}: {}", topic, body);
            return PublishOutcome::Delivered {
                status: status.as_u16(),
            };
        }

        let response_body = response.text().await.unwrap_or_default();
        tracing::error!(
            "HTTP Error: {} for url: {} ({})",
            status,
            url,
            response_body
        );
        PublishOutcome::Rejected {
            status: status.as_u16(),
            body: response_body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_url_is_plain_concatenation() {
        let publisher = RestProxyPublisher::new("https://gw.example.com/test/topics/");
        assert_eq!(
            publisher.topic_url("0affd83dcba5.pin"),
            "https://gw.example.com/test/topics/0affd83dcba5.pin"
        );
    }

    #[test]
    fn test_outcome_success_classification() {
        assert!(PublishOutcome::Delivered { status: 204 }.is_success());
        assert!(PublishOutcome::Logged.is_success());
        assert!(!PublishOutcome::Rejected {
            status: 500,
            body: String::new()
        }
        .is_success());
        assert!(!PublishOutcome::Failed {
            reason: "refused".to_string()
        }
        .is_success());
    }
}
