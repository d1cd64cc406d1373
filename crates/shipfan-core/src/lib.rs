//! shipfan-core: fulfillment model, XML decoding and per-package fan-out.
//!
//! # Overview
//!
//! - [`decoder::decode`]: `Data945` XML text → [`ParsedBatch`]
//! - [`message::build_messages`]: [`ParsedBatch`] → one JSON message per package
//! - [`DecodeError`] / [`MessageError`]: structured error types
//!
//! Nothing in this crate performs I/O.

pub mod decoder;
pub mod error;
pub mod message;
pub mod model;

pub use decoder::decode;
pub use error::{DecodeError, MessageError};
pub use message::{build_messages, fan_out, DispatchMessage};
pub use model::{FulfillmentHeader, FulfillmentRecord, LineItem, PackageRecord, ParsedBatch};
