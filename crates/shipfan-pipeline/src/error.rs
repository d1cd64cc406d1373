//! Error types for source retrieval and the end-to-end pipeline.

use shipfan_core::{DecodeError, MessageError};
use shipfan_queue::DispatchError;
use thiserror::Error;

/// Errors raised while fetching the input document.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("Object {bucket}/{key} has an empty body")]
    EmptyBody { bucket: String, key: String },

    #[error("Invalid object key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Invalid object store endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("HTTP {status} fetching {url}")]
    Status { status: u16, url: String },
}

impl SourceError {
    /// Returns `true` if the object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Top-level pipeline error, tagged with the failing stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Source retrieval failed: {0}")]
    Source(#[from] SourceError),

    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Message construction failed: {0}")]
    Message(#[from] MessageError),

    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Stage name, for logs and exit summaries.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Source(_) => "source",
            Self::Decode(_) => "decode",
            Self::Message(_) => "message",
            Self::Dispatch(_) => "dispatch",
            Self::Config(_) => "config",
        }
    }
}
