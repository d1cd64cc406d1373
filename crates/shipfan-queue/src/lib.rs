//! shipfan-queue: chunked, bounded-concurrency delivery to an SQS-compatible queue.
//!
//! # Overview
//!
//! - [`QueueTransport`]: async trait every queue backend implements
//! - [`HttpQueueClient`]: `reqwest` implementation of the JSON protocol
//! - [`QueueAddress`] / [`QueueEndpoint`]: identifier parsing and URL resolution
//! - [`Dispatcher`]: splits messages into chunks of ≤10 and submits them under
//!   a shared [`DispatchGate`]
//! - [`DispatchError`] / [`TransportError`]: structured error types

pub mod address;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod transport;

pub use address::{QueueAddress, QueueEndpoint};
pub use config::{DispatcherConfig, QueueConfig, DEFAULT_MAX_IN_FLIGHT, MAX_BATCH_SIZE};
pub use dispatcher::{chunk_messages, DispatchGate, DispatchPhase, DispatchReport, Dispatcher};
pub use error::{DispatchError, TransportError};
pub use http::HttpQueueClient;
pub use transport::{
    BatchEntry, BatchFailure, BatchOutcome, BatchSuccess, MessageAttributeValue, QueueTransport,
    SendParams,
};
