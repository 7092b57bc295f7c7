//! Rust client for the Galileo observability platform.
//!
//! Two entry points:
//!
//! - [`logger::TraceLogger`]: build traces of spans in memory and flush
//!   them to a project's log stream in batches.
//! - [`api::GalileoClient`]: direct access to the projects, log streams,
//!   runs, alerts, and observe endpoints.
//!
//! Configuration comes from [`ObserveConfig`], either built explicitly or
//! read from `GALILEO_*` environment variables via
//! [`ObserveConfig::from_env`]. Without an API key the logger runs in
//! dry-run mode and writes traces to the log output instead of the
//! network.

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod logger;

pub use api::GalileoClient;
pub use config::{AuthMethod, ObserveConfig, DEFAULT_BASE_URL, DEFAULT_LOG_STREAM};
pub use errors::{HttpErrorInfo, ObserveError, ObserveResult};
pub use logger::{
    ConcludeConfig, LlmSpanConfig, Metadata, MetadataValue, Span, SpanConfig, SpanKind,
    SpanStatus, Trace, TraceConfig, TraceLogger, TraceSink,
};
