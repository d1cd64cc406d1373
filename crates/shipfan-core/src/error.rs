//! Error types for the decode and fan-out stages.

use thiserror::Error;

/// Errors that can occur while decoding a fulfillment document.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The text is not well-formed XML, or the expected root element is missing.
    #[error("Malformed document {source_name}: {reason}")]
    MalformedDocument { source_name: String, reason: String },

    /// A required integer field was absent or could not be parsed.
    #[error("Field extraction failed for '{field}': {value:?} is not an integer")]
    FieldExtraction { field: &'static str, value: String },

    /// The document decoded cleanly but contained no fulfillments.
    #[error("Document {source_name} contains no fulfillments")]
    EmptyBatch { source_name: String },
}

impl DecodeError {
    /// Returns `true` if the document itself is structurally unusable.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedDocument { .. })
    }
}

/// Errors that can occur while building dispatch messages.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("No fulfillments to dispatch for {source_name}")]
    EmptyBatch { source_name: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
