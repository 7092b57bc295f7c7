//! Trace export seam.
//!
//! `TraceSink` abstracts where flushed traces go: the ingestion endpoint in
//! normal operation, the log output in dry-run mode, or an in-memory
//! recorder in tests.

use async_trait::async_trait;
use serde_json::json;

use super::models::Trace;
use crate::api::GalileoClient;
use crate::errors::ObserveError;

/// Destination for flushed trace batches.
///
/// A submission is all-or-nothing: on error the caller treats the whole
/// batch as not delivered.
#[async_trait]
pub trait TraceSink: Send + Sync {
    /// Submit a batch of concluded traces.
    async fn submit(&self, batch: &[Trace]) -> Result<(), ObserveError>;

    /// Whether this sink writes to a local destination instead of the
    /// network.
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Sink that posts batches to a project's log-stream events endpoint.
pub struct HttpSink {
    client: GalileoClient,
    project_id: String,
    log_stream_id: String,
    session_id: Option<String>,
}

impl HttpSink {
    /// Create a sink for the given resolved identifiers.
    pub fn new(
        client: GalileoClient,
        project_id: impl Into<String>,
        log_stream_id: impl Into<String>,
        session_id: Option<String>,
    ) -> Self {
        Self {
            client,
            project_id: project_id.into(),
            log_stream_id: log_stream_id.into(),
            session_id,
        }
    }

    /// The resolved project identifier.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// The resolved log stream identifier.
    pub fn log_stream_id(&self) -> &str {
        &self.log_stream_id
    }
}

#[async_trait]
impl TraceSink for HttpSink {
    async fn submit(&self, batch: &[Trace]) -> Result<(), ObserveError> {
        let path = format!(
            "/v2/projects/{}/log_streams/{}/events",
            self.project_id, self.log_stream_id
        );
        let mut body = json!({ "events": batch });
        if let Some(ref session_id) = self.session_id {
            body["session_id"] = json!(session_id);
        }
        self.client.http().post_json_no_content(&path, &body).await?;
        tracing::debug!(
            traces = batch.len(),
            project_id = %self.project_id,
            log_stream_id = %self.log_stream_id,
            "flushed trace batch"
        );
        Ok(())
    }
}

/// Sink that writes batches to the log output.
///
/// Used when no credential or identifiers are available, so logger calls
/// keep succeeding locally without touching the network.
#[derive(Debug, Default)]
pub struct DryRunSink;

#[async_trait]
impl TraceSink for DryRunSink {
    async fn submit(&self, batch: &[Trace]) -> Result<(), ObserveError> {
        for trace in batch {
            let payload = serde_json::to_string_pretty(trace)?;
            tracing::info!(trace_id = %trace.id, "dry run: trace data:\n{}", payload);
        }
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}
