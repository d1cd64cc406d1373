//! Settings file: the pipeline configuration plus logging.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shipfan_pipeline::{PipelineConfig, SourceConfig};

use crate::logging::LogConfig;

/// Everything the binary reads from `--config`.
///
/// ```json
/// {
///   "queue_arn": "arn:aws:sqs:us-east-1:773658737383:processfulfillment-items-queue",
///   "queue": { "region": "us-east-1" },
///   "dispatcher": { "max_in_flight": 200 },
///   "source": { "kind": "fs", "root": "/var/shipfan" },
///   "log": { "level": "info", "json": true }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(flatten)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Values given on the command line or through `SHIPFAN_*` variables.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub queue_arn: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub max_in_flight: Option<usize>,
    pub source_root: Option<String>,
    pub source_endpoint: Option<String>,
    pub log_level: Option<String>,
    pub json_logs: bool,
}

impl Settings {
    /// Read `path` if given, otherwise start from defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing settings from {}", path.display()))
    }

    pub fn apply(&mut self, overrides: Overrides) {
        let pipeline = &mut self.pipeline;
        if let Some(arn) = overrides.queue_arn {
            pipeline.queue_arn = arn;
        }
        if let Some(region) = overrides.region {
            pipeline.queue.region = region;
        }
        if let Some(endpoint) = overrides.endpoint {
            pipeline.queue.endpoint_override = Some(endpoint);
        }
        if let Some(max) = overrides.max_in_flight {
            pipeline.dispatcher.max_in_flight = max;
        }
        if let Some(endpoint) = overrides.source_endpoint {
            let timeout_ms = match pipeline.source {
                SourceConfig::Http { timeout_ms, .. } => timeout_ms,
                SourceConfig::Fs { .. } => pipeline.queue.request_timeout_ms,
            };
            pipeline.source = SourceConfig::Http {
                endpoint,
                timeout_ms,
            };
        } else if let Some(root) = overrides.source_root {
            pipeline.source = SourceConfig::Fs { root: root.into() };
        }
        if let Some(level) = overrides.log_level {
            self.log.level = level;
        }
        if overrides.json_logs {
            self.log.json = true;
        }
    }
}
