//! Queue client backed by `reqwest`, speaking the SQS JSON protocol.
//!
//! Requests are `POST`ed to the queue URL with an `X-Amz-Target` header naming
//! the action. Request signing is not performed: point `endpoint_override` at
//! a signing proxy or an SQS-compatible service that accepts unsigned calls.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::QueueConfig;
use crate::error::TransportError;
use crate::transport::{BatchEntry, BatchOutcome, MessageAttributeValue, QueueTransport, SendParams};

const CONTENT_TYPE: &str = "application/x-amz-json-1.0";
const TARGET_SEND_MESSAGE: &str = "AmazonSQS.SendMessage";
const TARGET_SEND_MESSAGE_BATCH: &str = "AmazonSQS.SendMessageBatch";

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendMessageBatchRequest<'a> {
    queue_url: &'a str,
    entries: &'a [BatchEntry],
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendMessageRequest<'a> {
    queue_url: &'a str,
    message_body: &'a str,
    #[serde(skip_serializing_if = "no_attributes")]
    message_attributes: &'a HashMap<String, MessageAttributeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delay_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_deduplication_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_group_id: Option<&'a str>,
}

fn no_attributes(attributes: &&HashMap<String, MessageAttributeValue>) -> bool {
    attributes.is_empty()
}

/// HTTP queue client.
#[derive(Clone)]
pub struct HttpQueueClient {
    http: reqwest::Client,
    name: String,
}

impl HttpQueueClient {
    pub fn new(config: &QueueConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Self {
            http,
            name: config.base_endpoint(),
        })
    }

    async fn post<B: Serialize>(
        &self,
        queue_url: &str,
        target: &str,
        body: &B,
    ) -> Result<reqwest::Response, TransportError> {
        let body = serde_json::to_vec(body)?;
        let resp = self
            .http
            .post(queue_url)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .header("X-Amz-Target", target)
            .body(body)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }
        Ok(resp)
    }
}

#[async_trait]
impl QueueTransport for HttpQueueClient {
    async fn send_batch(
        &self,
        queue_url: &str,
        entries: Vec<BatchEntry>,
    ) -> Result<BatchOutcome, TransportError> {
        if entries.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let request = SendMessageBatchRequest {
            queue_url,
            entries: &entries,
        };
        let resp = self.post(queue_url, TARGET_SEND_MESSAGE_BATCH, &request).await?;
        let text = resp
            .text()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;
        let outcome: BatchOutcome = serde_json::from_str(&text)?;

        tracing::debug!(
            queue_url,
            successful = outcome.successful.len(),
            failed = outcome.failed.len(),
            "batch send completed"
        );
        Ok(outcome)
    }

    async fn send_message(&self, queue_url: &str, params: &SendParams) -> Result<(), TransportError> {
        let request = SendMessageRequest {
            queue_url,
            message_body: &params.message,
            message_attributes: &params.message_attributes,
            delay_seconds: params.rounded_delay(),
            message_deduplication_id: params.message_deduplication_id.as_deref(),
            message_group_id: params.message_group_id.as_deref(),
        };
        self.post(queue_url, TARGET_SEND_MESSAGE, &request).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
