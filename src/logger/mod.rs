//! Buffering trace logger for the Galileo ingestion API.
//!
//! The logger builds one trace at a time, buffers concluded traces in
//! memory, and ships them in batches on flush:
//!
//! ```text
//! start_trace ──► [ active Trace ] ──conclude──► [ buffer ] ──flush──► sink
//!                      ▲                                        │
//!                 add_span /                              restore at front
//!                 add_llm_span                              on failure
//! ```
//!
//! In-memory calls never fail; only [`TraceLogger::flush`] can, and a
//! failed flush keeps every trace buffered so a retry resends the same
//! batch.
//!
//! # Example
//!
//! ```ignore
//! use galileo_observe::logger::{ConcludeConfig, LlmSpanConfig, TraceConfig, TraceLogger};
//! use galileo_observe::ObserveConfig;
//!
//! # async fn run() -> Result<(), galileo_observe::ObserveError> {
//! let logger = TraceLogger::connect(&ObserveConfig::from_env()).await?;
//! logger.start_trace(TraceConfig {
//!     input: "Tell me about Paris".into(),
//!     ..Default::default()
//! }).await;
//! logger.add_llm_span(LlmSpanConfig {
//!     input: "Tell me about Paris".into(),
//!     output: "Paris is the capital of France".into(),
//!     model: "gpt-4".into(),
//!     ..Default::default()
//! }).await;
//! logger.conclude(ConcludeConfig {
//!     output: "Paris is the capital of France".into(),
//!     ..Default::default()
//! }).await;
//! logger.flush().await?;
//! # Ok(())
//! # }
//! ```

pub mod models;
pub mod sink;
pub mod tracer;

pub use models::{
    ConcludeConfig, LlmSpanConfig, Metadata, MetadataValue, Span, SpanConfig, SpanKind,
    SpanStatus, Trace, TraceConfig,
};
pub use sink::{DryRunSink, HttpSink, TraceSink};
pub use tracer::TraceLogger;
