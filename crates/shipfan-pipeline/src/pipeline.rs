//! `Pipeline`: fetch, decode, fan out and dispatch one fulfillment document.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use shipfan_core::{build_messages, decode};
use shipfan_queue::{DispatchGate, Dispatcher, HttpQueueClient};
use tracing::{info, warn};

use crate::config::{PipelineConfig, SourceConfig};
use crate::error::PipelineError;
use crate::source::{FsObjectSource, HttpObjectSource, ObjectSource};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub source_file_name: String,
    pub store_identifier: u64,
    pub fulfillments: usize,
    pub packages: usize,
    pub messages: usize,
    pub chunks: usize,
}

pub struct Pipeline {
    source: Arc<dyn ObjectSource>,
    dispatcher: Dispatcher,
    queue_arn: String,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn ObjectSource>,
        dispatcher: Dispatcher,
        queue_arn: impl Into<String>,
    ) -> Self {
        Self {
            source,
            dispatcher,
            queue_arn: queue_arn.into(),
        }
    }

    /// Build the source, HTTP queue client and dispatcher described by `config`.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        Self::from_config_with_gate(config, DispatchGate::from_config(&config.dispatcher))
    }

    /// As [`from_config`](Self::from_config), sharing an existing gate.
    pub fn from_config_with_gate(
        config: &PipelineConfig,
        gate: DispatchGate,
    ) -> Result<Self, PipelineError> {
        config.validate()?;

        let source: Arc<dyn ObjectSource> = match &config.source {
            SourceConfig::Fs { root } => Arc::new(FsObjectSource::new(root.clone())),
            SourceConfig::Http {
                endpoint,
                timeout_ms,
            } => Arc::new(HttpObjectSource::new(
                endpoint.clone(),
                Duration::from_millis(*timeout_ms),
            )?),
        };

        let client = HttpQueueClient::new(&config.queue)
            .map_err(|e| PipelineError::Config(format!("queue client: {e}")))?;
        let dispatcher = Dispatcher::new(Arc::new(client), &config.queue, config.dispatcher, gate)?;

        Ok(Self::new(source, dispatcher, config.queue_arn.clone()))
    }

    pub fn queue_arn(&self) -> &str {
        &self.queue_arn
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run every stage for the object at `bucket/key`.
    ///
    /// Stops at the first failing stage; nothing is dispatched unless the
    /// document decoded into at least one fulfillment.
    #[tracing::instrument(skip(self), fields(source = self.source.name()))]
    pub async fn run(&self, bucket: &str, key: &str) -> Result<PipelineReport, PipelineError> {
        let result = self.run_stages(bucket, key).await;
        if let Err(err) = &result {
            warn!(stage = err.stage(), error = %err, "pipeline run failed");
        }
        result
    }

    async fn run_stages(&self, bucket: &str, key: &str) -> Result<PipelineReport, PipelineError> {
        let xml = self.source.fetch(bucket, key).await?;

        let batch = decode(&xml, key)?;
        let messages = build_messages(&batch, key)?;
        info!(
            store = batch.store_identifier,
            fulfillments = batch.fulfillments.len(),
            messages = messages.len(),
            "document decoded"
        );

        let dispatched = self.dispatcher.dispatch(messages, &self.queue_arn).await?;

        let report = PipelineReport {
            source_file_name: key.to_string(),
            store_identifier: batch.store_identifier,
            fulfillments: batch.fulfillments.len(),
            packages: batch.package_count(),
            messages: dispatched.messages,
            chunks: dispatched.chunks,
        };
        info!(
            messages = report.messages,
            chunks = report.chunks,
            queue = %self.queue_arn,
            "pipeline run complete"
        );
        Ok(report)
    }
}
