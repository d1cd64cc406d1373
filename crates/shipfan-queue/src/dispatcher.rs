//! Chunked, bounded-concurrency delivery of messages to a queue.
//!
//! ```text
//! dispatch(messages, queue)
//!   Pending ──resolve queue URL──▶ Chunking ──split into ≤10──▶ Submitting(n)
//!                                                                 │
//!                         every chunk finished ◀──────────────────┘
//!                      AllSucceeded | Failed(first error)
//! ```
//!
//! Each chunk waits for a permit from the shared [`DispatchGate`] before its
//! task is spawned, so the gate bounds in-flight submissions across every
//! dispatcher holding a clone of it. A failed chunk does not stop the others;
//! the first failure is returned once all chunks have finished.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::address::QueueEndpoint;
use crate::config::{DispatcherConfig, QueueConfig};
use crate::error::{DispatchError, TransportError};
use crate::transport::{BatchEntry, QueueTransport, SendParams};

/// Progress of a single `dispatch` call, as reported in trace events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPhase {
    Pending,
    Chunking,
    Submitting,
    AllSucceeded,
    Failed,
}

impl fmt::Display for DispatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Chunking => write!(f, "chunking"),
            Self::Submitting => write!(f, "submitting"),
            Self::AllSucceeded => write!(f, "all-succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Process-wide cap on concurrent chunk submissions.
///
/// Cloning shares the underlying semaphore.
#[derive(Debug, Clone)]
pub struct DispatchGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl DispatchGate {
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn from_config(config: &DispatcherConfig) -> Self {
        Self::new(config.max_in_flight)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits not currently held by a submission.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Stop handing out permits. Dispatches stop submitting, let their
    /// in-flight chunks finish, then fail with `GateClosed` unless a chunk
    /// had already failed.
    pub fn close(&self) {
        self.semaphore.close();
    }

    async fn acquire(&self) -> Result<OwnedSemaphorePermit, DispatchError> {
        Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| DispatchError::GateClosed)
    }
}

impl Default for DispatchGate {
    fn default() -> Self {
        Self::from_config(&DispatcherConfig::default())
    }
}

/// Summary of a successful dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub messages: usize,
    pub chunks: usize,
}

/// Split `messages` into consecutive chunks of at most `size`, keeping order.
pub fn chunk_messages(messages: Vec<String>, size: usize) -> Vec<Vec<String>> {
    let size = size.max(1);
    let mut chunks = Vec::with_capacity(messages.len().div_ceil(size));
    let mut iter = messages.into_iter().peekable();
    while iter.peek().is_some() {
        chunks.push(iter.by_ref().take(size).collect());
    }
    chunks
}

/// Submit one chunk as a single batch call, with a fresh id per entry.
async fn submit_chunk(
    transport: &dyn QueueTransport,
    queue_url: &str,
    chunk: Vec<String>,
) -> Result<usize, TransportError> {
    let total = chunk.len();
    let entries = chunk
        .into_iter()
        .map(|message_body| BatchEntry {
            id: Uuid::new_v4().to_string(),
            message_body,
        })
        .collect();
    transport.send_batch(queue_url, entries).await?.into_result(total)
}

/// Delivers message batches through a [`QueueTransport`].
pub struct Dispatcher {
    transport: Arc<dyn QueueTransport>,
    endpoint: QueueEndpoint,
    config: DispatcherConfig,
    gate: DispatchGate,
}

impl Dispatcher {
    /// Build a dispatcher. `gate` may be shared with other dispatchers.
    pub fn new(
        transport: Arc<dyn QueueTransport>,
        queue: &QueueConfig,
        config: DispatcherConfig,
        gate: DispatchGate,
    ) -> Result<Self, DispatchError> {
        config.validate()?;
        Ok(Self {
            transport,
            endpoint: QueueEndpoint::from_config(queue)?,
            config,
            gate,
        })
    }

    pub fn gate(&self) -> &DispatchGate {
        &self.gate
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Queue URL for `queue_identifier`.
    pub fn resolve(&self, queue_identifier: &str) -> Result<String, DispatchError> {
        self.endpoint.resolve(queue_identifier)
    }

    /// Deliver every message to the queue named by `queue_identifier`.
    ///
    /// Returns once every chunk has finished. If any chunk failed, the first
    /// failure observed is returned as [`DispatchError::Delivery`]; chunks that
    /// succeeded stay delivered. Nothing is retried.
    pub async fn dispatch(
        &self,
        messages: Vec<String>,
        queue_identifier: &str,
    ) -> Result<DispatchReport, DispatchError> {
        debug!(phase = %DispatchPhase::Pending, queue = queue_identifier, "resolving queue");
        let queue_url: Arc<str> = Arc::from(self.resolve(queue_identifier)?);

        let total = messages.len();
        let chunks = chunk_messages(messages, self.config.chunk_size);
        let chunk_count = chunks.len();
        debug!(
            phase = %DispatchPhase::Chunking,
            messages = total,
            chunks = chunk_count,
            chunk_size = self.config.chunk_size,
            "messages chunked"
        );

        let mut tasks: JoinSet<(usize, Result<usize, TransportError>)> = JoinSet::new();
        let mut first_error: Option<DispatchError> = None;

        for (index, chunk) in chunks.into_iter().enumerate() {
            // A closed gate stops new submissions; chunks already spawned still finish.
            let permit = match self.gate.acquire().await {
                Ok(permit) => permit,
                Err(err) => {
                    error!(chunk = index, "dispatch gate closed, no further chunks submitted");
                    first_error.get_or_insert(err);
                    break;
                }
            };
            let transport = Arc::clone(&self.transport);
            let url = Arc::clone(&queue_url);

            tasks.spawn(async move {
                let result = submit_chunk(transport.as_ref(), &url, chunk).await;
                drop(permit);
                (index, result)
            });

            while let Some(joined) = tasks.try_join_next() {
                record_completion(joined, &mut first_error);
            }
        }

        debug!(
            phase = %DispatchPhase::Submitting,
            in_flight = tasks.len(),
            available_permits = self.gate.available(),
            "all chunks submitted, waiting for completion"
        );
        while let Some(joined) = tasks.join_next().await {
            record_completion(joined, &mut first_error);
        }

        match first_error {
            Some(err) => {
                error!(
                    phase = %DispatchPhase::Failed,
                    queue = %queue_url,
                    messages = total,
                    chunks = chunk_count,
                    error = %err,
                    "dispatch failed"
                );
                Err(err)
            }
            None => {
                info!(
                    phase = %DispatchPhase::AllSucceeded,
                    queue = %queue_url,
                    messages = total,
                    chunks = chunk_count,
                    transport = self.transport.name(),
                    "dispatch complete"
                );
                Ok(DispatchReport {
                    messages: total,
                    chunks: chunk_count,
                })
            }
        }
    }

    /// Send a single message outside of the chunking path.
    pub async fn publish(
        &self,
        params: &SendParams,
        queue_identifier: &str,
    ) -> Result<(), DispatchError> {
        let queue_url = self.resolve(queue_identifier)?;
        let _permit = self.gate.acquire().await?;

        self.transport
            .send_message(&queue_url, params)
            .await
            .map_err(|source| {
                error!(
                    id = params.id.as_deref().unwrap_or(""),
                    queue = %queue_url,
                    error = %source,
                    "publish failed"
                );
                DispatchError::Delivery { chunk: 0, source }
            })
    }
}

fn record_completion(
    joined: Result<(usize, Result<usize, TransportError>), JoinError>,
    first_error: &mut Option<DispatchError>,
) {
    let err = match joined {
        Ok((index, Ok(accepted))) => {
            debug!(chunk = index, accepted, "chunk delivered");
            return;
        }
        Ok((index, Err(source))) => {
            error!(
                chunk = index,
                retryable = source.is_retryable(),
                error = %source,
                "chunk submission failed"
            );
            DispatchError::Delivery { chunk: index, source }
        }
        Err(join_err) => {
            error!(error = %join_err, "chunk submission task failed");
            DispatchError::TaskFailed(join_err.to_string())
        }
    };
    first_error.get_or_insert(err);
}
