//! shipfan-pipeline: end-to-end orchestration.
//!
//! ```text
//! ObjectSource::fetch ─▶ decode ─▶ build_messages ─▶ Dispatcher::dispatch
//! ```
//!
//! The first failing stage ends the run with a [`PipelineError`] naming it.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod source;

pub use config::{PipelineConfig, SourceConfig};
pub use error::{PipelineError, SourceError};
pub use pipeline::{Pipeline, PipelineReport};
pub use source::{FsObjectSource, HttpObjectSource, ObjectSource};
