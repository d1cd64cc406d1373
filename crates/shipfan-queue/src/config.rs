//! Queue client and dispatcher configuration.

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// Largest number of entries the queue accepts in one batch call.
pub const MAX_BATCH_SIZE: usize = 10;

/// Default number of chunk submissions allowed in flight at once.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 500;

/// Where and how to reach the queue service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Region used to derive the default endpoint, e.g. `"us-east-1"`.
    #[serde(default = "default_region")]
    pub region: String,
    /// Base endpoint overriding `https://sqs.<region>.amazonaws.com/`
    /// (e.g. a local ElasticMQ at `"http://localhost:9324/"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_override: Option<String>,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_region() -> String { "us-east-1".into() }
fn default_request_timeout_ms() -> u64 { 30_000 }

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint_override: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl QueueConfig {
    /// Base endpoint URL before normalisation.
    pub fn base_endpoint(&self) -> String {
        match &self.endpoint_override {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://sqs.{}.amazonaws.com/", self.region),
        }
    }
}

/// Chunking and concurrency settings for [`Dispatcher`](crate::Dispatcher).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Messages per batch call (1..=10).
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Capacity of the gate created by [`DispatchGate::from_config`](crate::DispatchGate::from_config).
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

fn default_chunk_size() -> usize { MAX_BATCH_SIZE }
fn default_max_in_flight() -> usize { DEFAULT_MAX_IN_FLIGHT }

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            chunk_size: MAX_BATCH_SIZE,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

impl DispatcherConfig {
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.chunk_size == 0 || self.chunk_size > MAX_BATCH_SIZE {
            return Err(DispatchError::InvalidConfig(format!(
                "chunk_size must be between 1 and {MAX_BATCH_SIZE}, got {}",
                self.chunk_size
            )));
        }
        if self.max_in_flight == 0 {
            return Err(DispatchError::InvalidConfig(
                "max_in_flight must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
