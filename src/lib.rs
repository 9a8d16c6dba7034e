//! Korean input assistance engine.
//!
//! Wires an [`InputSession`](jamo_session::InputSession) to debounced,
//! cached translation and correction requests. The Hangul algebra and the
//! composer live in `jamo-core`; the editable field lives in `jamo-session`.

pub mod api;
mod async_worker;
pub mod error;
pub mod pipeline;
pub mod service;
pub mod trace_init;
pub mod transport;

#[cfg(test)]
mod testutil;

pub use api::{AssistMode, Assistant, AssistantConfig};
pub use error::{ServiceError, TransportError};
pub use pipeline::{Completion, PipelineConfig, PipelineState, RequestPipeline};
pub use service::{ClientIdentity, OperationKind};
pub use transport::{HttpTransport, Transport, TransportResponse};

pub use jamo_core;
pub use jamo_session;
