//! Legacy observe ingestion path.
//!
//! Monitoring projects created before the v2 log-stream API accept
//! workflow payloads at `POST /observe/workflows`: one step per workflow
//! root, with nested steps for the individual operations. Completed
//! [`Trace`]s convert losslessly into this shape.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::GalileoClient;
use crate::errors::ObserveError;
use crate::logger::models::{Metadata, SpanKind, SpanStatus, Trace};

/// One step in a workflow payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    #[serde(rename = "type")]
    pub kind: SpanKind,
    pub name: String,
    pub input: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub output: Value,
    pub created_at_ns: i64,
    pub duration_ns: i64,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_truth: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<WorkflowStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Value>,
}

impl WorkflowStep {
    /// Convert a concluded trace into a workflow step with nested
    /// per-span steps, preserving span order.
    ///
    /// Span status maps onto `status_code` (200 for success, 500 for
    /// error); a failed span's error text lands in its step metadata. The
    /// root step reports 500 when any span failed.
    pub fn from_trace(trace: &Trace) -> Self {
        let steps: Vec<WorkflowStep> = trace
            .spans
            .iter()
            .map(|span| {
                let mut metadata = span.metadata.clone();
                if let Some(ref error) = span.error {
                    metadata.insert("error".to_string(), error.clone().into());
                }
                WorkflowStep {
                    kind: span.kind,
                    name: span.name.clone(),
                    input: span.input.clone(),
                    output: span.output.clone(),
                    created_at_ns: span.created_at_ns,
                    duration_ns: span.duration_ns,
                    metadata,
                    status_code: Some(status_code_for(span.status)),
                    ground_truth: None,
                    steps: Vec::new(),
                    parent: None,
                }
            })
            .collect();

        let status = if trace.spans.iter().any(|s| s.status == SpanStatus::Error) {
            SpanStatus::Error
        } else {
            SpanStatus::Success
        };
        WorkflowStep {
            kind: SpanKind::Workflow,
            name: trace.name.clone().unwrap_or_else(|| "workflow".to_string()),
            input: Value::String(trace.input.clone()),
            output: trace
                .output
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null),
            created_at_ns: trace.created_at_ns,
            duration_ns: trace.duration_ns.unwrap_or(0),
            metadata: trace.metadata.clone(),
            status_code: Some(status_code_for(status)),
            ground_truth: None,
            steps,
            parent: None,
        }
    }
}

fn status_code_for(status: SpanStatus) -> i64 {
    match status {
        SpanStatus::Success => 200,
        SpanStatus::Error => 500,
    }
}

/// Client for the legacy observe ingestion path.
pub struct ObserveIngestClient<'a> {
    client: &'a GalileoClient,
}

impl<'a> ObserveIngestClient<'a> {
    pub(crate) fn new(client: &'a GalileoClient) -> Self {
        Self { client }
    }

    /// Log workflows to a monitoring project.
    pub async fn log_workflows(
        &self,
        project_id: &str,
        workflows: &[WorkflowStep],
    ) -> Result<(), ObserveError> {
        let body = json!({
            "workflows": workflows,
            "project_id": project_id,
        });
        self.client
            .http
            .post_json_no_content("/observe/workflows", &body)
            .await?;
        Ok(())
    }
}
