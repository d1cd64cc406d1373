//! The `QueueTransport` trait: the seam between the dispatcher and the queue.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// One entry of a batch send. `id` only has to be unique within its batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchEntry {
    pub id: String,
    pub message_body: String,
}

/// An entry the queue accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BatchSuccess {
    pub id: String,
    pub message_id: String,
}

/// An entry the queue rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BatchFailure {
    pub id: String,
    pub code: String,
    pub message: String,
    pub sender_fault: bool,
}

/// Per-entry result of a batch send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BatchOutcome {
    pub successful: Vec<BatchSuccess>,
    pub failed: Vec<BatchFailure>,
}

impl BatchOutcome {
    /// Outcome where every entry was accepted.
    pub fn all_ok(entries: &[BatchEntry]) -> Self {
        Self {
            successful: entries
                .iter()
                .map(|e| BatchSuccess {
                    id: e.id.clone(),
                    message_id: e.id.clone(),
                })
                .collect(),
            failed: vec![],
        }
    }

    /// Turn rejected entries into an error.
    pub fn into_result(self, total: usize) -> Result<usize, TransportError> {
        match self.failed.first() {
            None => Ok(self.successful.len()),
            Some(first) => Err(TransportError::PartialBatch {
                failed: self.failed.len(),
                total,
                code: first.code.clone(),
                message: first.message.clone(),
            }),
        }
    }
}

/// Typed message attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageAttributeValue {
    /// `"String"`, `"Number"` or `"Binary"`.
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
}

impl MessageAttributeValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            data_type: "String".into(),
            string_value: Some(value.into()),
        }
    }
}

/// Parameters for a single-message send.
#[derive(Debug, Clone, Default)]
pub struct SendParams {
    pub message: String,
    pub message_attributes: HashMap<String, MessageAttributeValue>,
    /// Caller-side identifier, used only for logging.
    pub id: Option<String>,
    /// Rounded to whole seconds before sending.
    pub delay_seconds: Option<f64>,
    pub message_deduplication_id: Option<String>,
    pub message_group_id: Option<String>,
}

impl SendParams {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Delay in whole seconds; zero and negative delays are dropped.
    pub fn rounded_delay(&self) -> Option<u32> {
        self.delay_seconds
            .map(f64::round)
            .filter(|d| *d >= 1.0)
            .map(|d| d as u32)
    }
}

/// The async trait every queue backend implements.
///
/// Object-safe; the dispatcher stores it as `Arc<dyn QueueTransport>`.
#[async_trait]
pub trait QueueTransport: Send + Sync + 'static {
    /// Submit `entries` to `queue_url` as one batch call.
    async fn send_batch(
        &self,
        queue_url: &str,
        entries: Vec<BatchEntry>,
    ) -> Result<BatchOutcome, TransportError>;

    /// Submit a single message.
    async fn send_message(&self, queue_url: &str, params: &SendParams) -> Result<(), TransportError>;

    /// Backend identifier, for logs.
    fn name(&self) -> &str;
}
