//! Trace and span data models.
//!
//! A [`Trace`] is one logical end-to-end operation made up of ordered
//! [`Span`]s; span append order is semantically meaningful (the step
//! sequence within the trace) and is preserved on serialization.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Free-form metadata mapping attached to traces and spans.
///
/// `BTreeMap` keeps serialization deterministic.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A metadata value: string, number, boolean, or nested mapping.
///
/// Call sites mix value kinds freely (token counts as numbers, scores as
/// strings); a tagged union keeps round-trip fidelity without falling back
/// to untyped values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Boolean value
    Bool(bool),
    /// Integer or float value
    Number(serde_json::Number),
    /// String value
    String(String),
    /// Nested mapping
    Map(BTreeMap<String, MetadataValue>),
}

impl MetadataValue {
    /// Get the value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an i64, if it is a representable number.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetadataValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Get the value as an f64, if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Get the value as a bool, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetadataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::String(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::String(s)
    }
}

impl From<i64> for MetadataValue {
    fn from(n: i64) -> Self {
        MetadataValue::Number(n.into())
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        MetadataValue::Bool(b)
    }
}

impl From<f64> for MetadataValue {
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n)
            .map(MetadataValue::Number)
            .unwrap_or_else(|| MetadataValue::String(n.to_string()))
    }
}

/// Span kind discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    /// Generic tool call
    Tool,
    /// Retrieval step (vector store, search)
    Retriever,
    /// Model invocation
    Llm,
    /// Sub-workflow
    Workflow,
    /// Agent step
    Agent,
}

impl std::fmt::Display for SpanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpanKind::Tool => write!(f, "tool"),
            SpanKind::Retriever => write!(f, "retriever"),
            SpanKind::Llm => write!(f, "llm"),
            SpanKind::Workflow => write!(f, "workflow"),
            SpanKind::Agent => write!(f, "agent"),
        }
    }
}

impl Default for SpanKind {
    fn default() -> Self {
        SpanKind::Tool
    }
}

/// Span completion status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpanStatus {
    Success,
    Error,
}

impl Default for SpanStatus {
    fn default() -> Self {
        SpanStatus::Success
    }
}

/// Current time as Unix nanoseconds.
pub(crate) fn now_ns() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

pub(crate) fn ns_to_datetime(ns: i64) -> DateTime<Utc> {
    Utc.timestamp_nanos(ns)
}

/// Configuration for a new trace.
#[derive(Debug, Clone, Default)]
pub struct TraceConfig {
    /// Optional human-readable name.
    pub name: Option<String>,
    /// Input text for the overall operation.
    pub input: String,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Trace-level metadata.
    pub metadata: Metadata,
}

/// Configuration for a generic span.
#[derive(Debug, Clone, Default)]
pub struct SpanConfig {
    pub name: String,
    pub kind: SpanKind,
    pub input: Value,
    pub output: Value,
    pub duration_ns: i64,
    pub status: SpanStatus,
    /// Error description when `status` is [`SpanStatus::Error`].
    pub error: Option<String>,
    pub tags: Vec<String>,
    pub metadata: Metadata,
}

/// Configuration for an LLM span.
///
/// Model name and token counts are folded into the span metadata under the
/// `model`, `num_input_tokens`, `num_output_tokens`, and `total_tokens` keys.
#[derive(Debug, Clone, Default)]
pub struct LlmSpanConfig {
    pub input: String,
    pub output: String,
    pub model: String,
    pub num_input_tokens: i64,
    pub num_output_tokens: i64,
    pub total_tokens: i64,
    pub duration_ns: i64,
    pub tags: Vec<String>,
    pub metadata: Metadata,
}

/// Final details for a trace.
#[derive(Debug, Clone, Default)]
pub struct ConcludeConfig {
    pub output: String,
    pub duration_ns: i64,
    pub tags: Vec<String>,
}

/// A single operation within a trace.
///
/// Spans are immutable once appended to their trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    /// Unique span identifier.
    pub id: Uuid,
    /// Span kind.
    #[serde(rename = "type")]
    pub kind: SpanKind,
    /// Human-readable name.
    pub name: String,
    /// Step input.
    pub input: Value,
    /// Step output.
    pub output: Value,
    /// Start time as Unix nanoseconds.
    pub created_at_ns: i64,
    /// Duration in nanoseconds; end time is start + duration.
    pub duration_ns: i64,
    /// Completion status.
    pub status: SpanStatus,
    /// Error description for failed spans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Span-level metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Span {
    /// Create a span from a config, assigning a fresh identifier and
    /// start timestamp.
    pub fn new(config: SpanConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: config.kind,
            name: config.name,
            input: config.input,
            output: config.output,
            created_at_ns: now_ns(),
            duration_ns: config.duration_ns,
            status: config.status,
            error: config.error,
            tags: config.tags,
            metadata: config.metadata,
        }
    }

    /// Start time as a UTC datetime.
    pub fn started_at(&self) -> DateTime<Utc> {
        ns_to_datetime(self.created_at_ns)
    }

    /// End time as a UTC datetime (start + duration).
    pub fn ended_at(&self) -> DateTime<Utc> {
        ns_to_datetime(self.created_at_ns + self.duration_ns)
    }
}

/// One logical end-to-end operation made up of ordered spans.
///
/// Output, end timestamp, and duration stay unset until the trace is
/// concluded. A trace owns its spans exclusively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    /// Unique trace identifier.
    pub id: Uuid,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Input text.
    pub input: String,
    /// Output text, set at conclusion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Start time as Unix nanoseconds.
    pub created_at_ns: i64,
    /// Duration in nanoseconds, set at conclusion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ns: Option<i64>,
    /// Ordered spans; append order is the step sequence.
    pub spans: Vec<Span>,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Trace-level metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Trace {
    /// Create a trace from a config, assigning a fresh identifier and
    /// start timestamp.
    pub fn new(config: TraceConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: config.name,
            input: config.input,
            output: None,
            created_at_ns: now_ns(),
            duration_ns: None,
            spans: Vec::new(),
            tags: config.tags,
            metadata: config.metadata,
        }
    }

    /// Append a span; returns its identifier.
    pub(crate) fn push_span(&mut self, span: Span) -> Uuid {
        let id = span.id;
        self.spans.push(span);
        id
    }

    /// Set output and duration, merging in final tags.
    pub(crate) fn conclude(&mut self, config: ConcludeConfig) {
        self.output = Some(config.output);
        self.duration_ns = Some(config.duration_ns);
        self.tags.extend(config.tags);
    }

    /// Whether the trace has been concluded.
    pub fn is_concluded(&self) -> bool {
        self.duration_ns.is_some()
    }

    /// Start time as a UTC datetime.
    pub fn started_at(&self) -> DateTime<Utc> {
        ns_to_datetime(self.created_at_ns)
    }

    /// End time as a UTC datetime (start + duration), if concluded.
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.duration_ns
            .map(|d| ns_to_datetime(self.created_at_ns + d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_value_round_trip() {
        let mut meta = Metadata::new();
        meta.insert("model".into(), "gpt-4".into());
        meta.insert("total_tokens".into(), MetadataValue::from(18i64));
        meta.insert("temperature".into(), MetadataValue::from(0.2f64));
        meta.insert("cached".into(), MetadataValue::from(false));
        let mut nested = BTreeMap::new();
        nested.insert("source".to_string(), MetadataValue::from("travel_guide"));
        meta.insert("doc".into(), MetadataValue::Map(nested));

        let json = serde_json::to_string(&meta).unwrap();
        let parsed: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, meta);
        assert_eq!(parsed["total_tokens"].as_i64(), Some(18));
        assert_eq!(parsed["temperature"].as_f64(), Some(0.2));
        assert_eq!(parsed["cached"].as_bool(), Some(false));
        assert_eq!(parsed["model"].as_str(), Some("gpt-4"));
    }

    #[test]
    fn test_span_kind_wire_names() {
        assert_eq!(serde_json::to_string(&SpanKind::Llm).unwrap(), "\"llm\"");
        assert_eq!(
            serde_json::to_string(&SpanKind::Retriever).unwrap(),
            "\"retriever\""
        );
        assert_eq!(SpanKind::Agent.to_string(), "agent");
    }

    #[test]
    fn test_span_serialization_uses_type_key() {
        let span = Span::new(SpanConfig {
            name: "get_weather".into(),
            kind: SpanKind::Tool,
            input: json!({"location": "London"}),
            output: json!({"temperature": "15C"}),
            duration_ns: 500_000_000,
            ..Default::default()
        });
        let value = serde_json::to_value(&span).unwrap();
        assert_eq!(value["type"], "tool");
        assert_eq!(value["status"], "SUCCESS");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_trace_unset_until_concluded() {
        let mut trace = Trace::new(TraceConfig {
            input: "ping".into(),
            ..Default::default()
        });
        assert!(!trace.is_concluded());
        assert!(trace.output.is_none());
        assert!(trace.ended_at().is_none());

        trace.conclude(ConcludeConfig {
            output: "pong".into(),
            duration_ns: 1_000_000,
            tags: vec!["done".into()],
        });
        assert!(trace.is_concluded());
        assert_eq!(trace.output.as_deref(), Some("pong"));
        assert_eq!(
            trace.ended_at().unwrap(),
            trace.started_at() + chrono::Duration::nanoseconds(1_000_000)
        );
        assert_eq!(trace.tags, vec!["done".to_string()]);
    }

    #[test]
    fn test_span_end_derived_from_duration() {
        let span = Span::new(SpanConfig {
            name: "llm".into(),
            kind: SpanKind::Llm,
            duration_ns: 800_000_000,
            ..Default::default()
        });
        assert_eq!(
            span.ended_at() - span.started_at(),
            chrono::Duration::nanoseconds(800_000_000)
        );
    }
}
