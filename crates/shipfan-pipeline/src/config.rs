//! Pipeline configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shipfan_queue::{DispatcherConfig, QueueConfig};

use crate::error::PipelineError;

/// Where input documents are fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Buckets are directories under `root`.
    Fs { root: PathBuf },
    /// Path-style object store at `endpoint`.
    Http {
        endpoint: String,
        #[serde(default = "default_fetch_timeout_ms")]
        timeout_ms: u64,
    },
}

fn default_fetch_timeout_ms() -> u64 { 30_000 }

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Fs { root: PathBuf::from(".") }
    }
}

/// Everything needed to build a [`Pipeline`](crate::Pipeline).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    /// Destination queue identifier (`arn:aws:sqs:<region>:<account>:<name>`).
    #[serde(default)]
    pub queue_arn: String,
    #[serde(default)]
    pub source: SourceConfig,
}

impl PipelineConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.queue_arn.trim().is_empty() {
            return Err(PipelineError::Config("queue_arn is not set".into()));
        }
        self.dispatcher
            .validate()
            .map_err(|e| PipelineError::Config(e.to_string()))
    }
}
