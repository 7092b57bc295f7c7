//! Trace logger.
//!
//! `TraceLogger` owns at most one active trace and a buffer of concluded
//! traces awaiting flush. All shared state sits behind one async mutex;
//! network submission happens outside the lock so logging calls from other
//! tasks never wait on the sink.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use uuid::Uuid;

use super::models::{
    ConcludeConfig, LlmSpanConfig, MetadataValue, Span, SpanConfig, SpanKind, Trace, TraceConfig,
};
use super::sink::{DryRunSink, HttpSink, TraceSink};
use crate::api::GalileoClient;
use crate::config::ObserveConfig;
use crate::errors::{ObserveError, ObserveResult};

/// In-memory logger state: the trace being built plus concluded traces
/// waiting for the next flush.
#[derive(Default)]
struct LoggerState {
    active: Option<Trace>,
    buffer: Vec<Trace>,
}

/// Buffering trace logger.
///
/// Lifecycle calls ([`start_trace`](Self::start_trace),
/// [`add_span`](Self::add_span), [`conclude`](Self::conclude)) are purely
/// in-memory and cannot fail; misuse (adding a span with no active trace)
/// is a logged no-op that returns `None`. Only
/// [`flush`](Self::flush) touches the network, and a failed flush keeps
/// every trace buffered for retry.
pub struct TraceLogger {
    sink: Arc<dyn TraceSink>,
    state: Mutex<LoggerState>,
}

impl TraceLogger {
    /// Create a logger over an explicit sink.
    pub fn new(sink: Arc<dyn TraceSink>) -> Self {
        Self {
            sink,
            state: Mutex::new(LoggerState::default()),
        }
    }

    /// Create a logger wired to the ingestion API described by `config`.
    ///
    /// Resolves project and log stream identifiers up front, creating the
    /// resources by name when no identifier is configured. Without an API
    /// key (or with `config.dry_run` set) the logger degrades to dry-run
    /// mode and never touches the network; transport failures during
    /// resolution are returned, not masked.
    pub async fn connect(config: &ObserveConfig) -> ObserveResult<Self> {
        let has_key = config
            .api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false);
        if config.dry_run || !has_key {
            if !config.dry_run {
                tracing::warn!("no API key configured, trace logger running in dry-run mode");
            }
            return Ok(Self::new(Arc::new(DryRunSink)));
        }

        let client = GalileoClient::new(config)?;
        let project_id = match &config.project_id {
            Some(id) => id.clone(),
            None => client.projects().get_or_create(&config.project_name).await?.id,
        };
        let log_stream_id = match &config.log_stream_id {
            Some(id) => id.clone(),
            None => {
                client
                    .log_streams()
                    .get_or_create(&project_id, &config.log_stream_name)
                    .await?
                    .id
            }
        };
        tracing::debug!(
            project_id = %project_id,
            log_stream_id = %log_stream_id,
            "trace logger connected"
        );
        let sink = HttpSink::new(client, project_id, log_stream_id, config.session_id.clone());
        Ok(Self::new(Arc::new(sink)))
    }

    /// Whether this logger writes locally instead of to the network.
    pub fn is_dry_run(&self) -> bool {
        self.sink.is_dry_run()
    }

    /// Start a new trace and return its identifier.
    ///
    /// Starting while another trace is active discards the unconcluded
    /// one; last writer wins, and the discard is logged.
    pub async fn start_trace(&self, config: TraceConfig) -> Uuid {
        let trace = Trace::new(config);
        let id = trace.id;
        let mut state = self.state.lock().await;
        if let Some(previous) = state.active.replace(trace) {
            tracing::warn!(
                discarded_trace_id = %previous.id,
                spans = previous.spans.len(),
                "started a new trace while another was active, discarding the old one"
            );
        }
        id
    }

    /// Identifier of the active trace, if any.
    pub async fn active_trace_id(&self) -> Option<Uuid> {
        self.state.lock().await.active.as_ref().map(|t| t.id)
    }

    /// Number of concluded traces waiting for the next flush.
    pub async fn buffered(&self) -> usize {
        self.state.lock().await.buffer.len()
    }

    /// Append a span to the active trace; returns the span identifier.
    ///
    /// With no active trace this is a logged no-op returning `None`.
    pub async fn add_span(&self, config: SpanConfig) -> Option<Uuid> {
        let mut state = self.state.lock().await;
        match state.active.as_mut() {
            Some(trace) => Some(trace.push_span(Span::new(config))),
            None => {
                tracing::warn!(span = %config.name, "add_span called with no active trace");
                None
            }
        }
    }

    /// Append a model-invocation span to the active trace.
    ///
    /// Model name and token counts land in the span metadata; returns the
    /// span identifier, or `None` (logged) when no trace is active.
    pub async fn add_llm_span(&self, config: LlmSpanConfig) -> Option<Uuid> {
        let mut metadata = config.metadata;
        metadata.insert("model".to_string(), config.model.into());
        metadata.insert(
            "num_input_tokens".to_string(),
            MetadataValue::from(config.num_input_tokens),
        );
        metadata.insert(
            "num_output_tokens".to_string(),
            MetadataValue::from(config.num_output_tokens),
        );
        metadata.insert(
            "total_tokens".to_string(),
            MetadataValue::from(config.total_tokens),
        );
        self.add_span(SpanConfig {
            name: "llm".to_string(),
            kind: SpanKind::Llm,
            input: config.input.into(),
            output: config.output.into(),
            duration_ns: config.duration_ns,
            tags: config.tags,
            metadata,
            ..Default::default()
        })
        .await
    }

    /// Conclude the active trace and move it to the flush buffer.
    ///
    /// Returns the trace identifier, or `None` (logged) when no trace is
    /// active.
    pub async fn conclude(&self, config: ConcludeConfig) -> Option<Uuid> {
        let mut state = self.state.lock().await;
        match state.active.take() {
            Some(mut trace) => {
                trace.conclude(config);
                let id = trace.id;
                state.buffer.push(trace);
                Some(id)
            }
            None => {
                tracing::warn!("conclude called with no active trace");
                None
            }
        }
    }

    /// Flush buffered traces to the sink; returns how many were sent.
    ///
    /// The buffer is swapped out before submission so logging continues
    /// concurrently. On failure the whole batch is restored at the front
    /// of the buffer, ahead of traces concluded during the attempt, so a
    /// retry resends everything in original order.
    pub async fn flush(&self) -> ObserveResult<usize> {
        self.flush_inner(None).await
    }

    /// Like [`flush`](Self::flush), but gives up after `deadline`.
    ///
    /// A timed-out batch is restored exactly like a failed one.
    pub async fn flush_with_timeout(&self, deadline: Duration) -> ObserveResult<usize> {
        self.flush_inner(Some(deadline)).await
    }

    async fn flush_inner(&self, deadline: Option<Duration>) -> ObserveResult<usize> {
        let batch = {
            let mut state = self.state.lock().await;
            std::mem::take(&mut state.buffer)
        };
        if batch.is_empty() {
            return Ok(0);
        }

        let result = match deadline {
            Some(d) => match tokio::time::timeout(d, self.sink.submit(&batch)).await {
                Ok(r) => r,
                Err(_) => Err(ObserveError::timeout(format!(
                    "flush did not complete within {:?}",
                    d
                ))),
            },
            None => self.sink.submit(&batch).await,
        };

        match result {
            Ok(()) => Ok(batch.len()),
            Err(err) => {
                let mut state = self.state.lock().await;
                let mut restored = batch;
                restored.extend(state.buffer.drain(..));
                state.buffer = restored;
                tracing::warn!(
                    buffered = state.buffer.len(),
                    error = %err,
                    "flush failed, traces retained for retry"
                );
                Err(err)
            }
        }
    }

    /// Flush buffered traces and drop any unconcluded active trace.
    ///
    /// The discard of an unconcluded trace is logged; call
    /// [`conclude`](Self::conclude) first to keep it.
    pub async fn close(&self) -> ObserveResult<usize> {
        {
            let mut state = self.state.lock().await;
            if let Some(trace) = state.active.take() {
                tracing::warn!(
                    trace_id = %trace.id,
                    "closing with an unconcluded trace, discarding it"
                );
            }
        }
        self.flush().await
    }
}

impl std::fmt::Debug for TraceLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceLogger")
            .field("dry_run", &self.sink.is_dry_run())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Sink that records every submitted batch.
    #[derive(Default)]
    struct RecordingSink {
        batches: std::sync::Mutex<Vec<Vec<Trace>>>,
    }

    impl RecordingSink {
        fn batches(&self) -> Vec<Vec<Trace>> {
            self.batches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TraceSink for RecordingSink {
        async fn submit(&self, batch: &[Trace]) -> Result<(), ObserveError> {
            self.batches.lock().unwrap().push(batch.to_vec());
            Ok(())
        }
    }

    /// Sink that fails the first `failures` submissions.
    struct FailingSink {
        failures: AtomicUsize,
        accepted: std::sync::Mutex<Vec<Vec<Trace>>>,
    }

    impl FailingSink {
        fn new(failures: usize) -> Self {
            Self {
                failures: AtomicUsize::new(failures),
                accepted: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TraceSink for FailingSink {
        async fn submit(&self, batch: &[Trace]) -> Result<(), ObserveError> {
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(ObserveError::http_response(
                    500,
                    "https://api.example.com",
                    "server error",
                    None,
                ));
            }
            self.accepted.lock().unwrap().push(batch.to_vec());
            Ok(())
        }
    }

    /// Writer that captures formatted log output for assertions.
    #[derive(Clone, Default)]
    struct CaptureWriter(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CaptureWriter {
        type Writer = CaptureWriter;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Sink that never completes within a test deadline.
    struct SlowSink;

    #[async_trait]
    impl TraceSink for SlowSink {
        async fn submit(&self, _batch: &[Trace]) -> Result<(), ObserveError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    async fn conclude_one(logger: &TraceLogger, input: &str, output: &str) -> Uuid {
        let id = logger
            .start_trace(TraceConfig {
                input: input.to_string(),
                ..Default::default()
            })
            .await;
        logger
            .conclude(ConcludeConfig {
                output: output.to_string(),
                ..Default::default()
            })
            .await;
        id
    }

    #[tokio::test]
    async fn test_spans_keep_append_order() {
        let sink = Arc::new(RecordingSink::default());
        let logger = TraceLogger::new(sink.clone());

        logger
            .start_trace(TraceConfig {
                input: "Tell me about Paris".into(),
                ..Default::default()
            })
            .await;
        for name in ["parse", "retrieve", "generate"] {
            logger
                .add_span(SpanConfig {
                    name: name.to_string(),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        logger
            .conclude(ConcludeConfig {
                output: "Paris is the capital of France".into(),
                duration_ns: 1_000_000,
                ..Default::default()
            })
            .await
            .unwrap();
        logger.flush().await.unwrap();

        let batches = sink.batches();
        assert_eq!(batches.len(), 1);
        let names: Vec<_> = batches[0][0].spans.iter().map(|s| s.name.clone()).collect();
        assert_eq!(names, ["parse", "retrieve", "generate"]);
    }

    #[tokio::test]
    async fn test_llm_span_metadata() {
        let sink = Arc::new(RecordingSink::default());
        let logger = TraceLogger::new(sink.clone());

        logger
            .start_trace(TraceConfig {
                input: "ping".into(),
                ..Default::default()
            })
            .await;
        logger
            .add_llm_span(LlmSpanConfig {
                input: "ping".into(),
                output: "pong".into(),
                model: "m1".into(),
                num_input_tokens: 1,
                num_output_tokens: 1,
                total_tokens: 2,
                duration_ns: 1_000_000,
                ..Default::default()
            })
            .await
            .unwrap();
        logger
            .conclude(ConcludeConfig {
                output: "pong".into(),
                duration_ns: 1_000_000,
                ..Default::default()
            })
            .await
            .unwrap();
        logger.flush().await.unwrap();

        let batches = sink.batches();
        let span = &batches[0][0].spans[0];
        assert_eq!(span.kind, SpanKind::Llm);
        assert_eq!(span.input, json!("ping"));
        assert_eq!(span.output, json!("pong"));
        assert_eq!(span.metadata["model"].as_str(), Some("m1"));
        assert_eq!(span.metadata["num_input_tokens"].as_i64(), Some(1));
        assert_eq!(span.metadata["num_output_tokens"].as_i64(), Some(1));
        assert_eq!(span.metadata["total_tokens"].as_i64(), Some(2));
    }

    #[tokio::test]
    async fn test_calls_without_active_trace_are_noops() {
        let logger = TraceLogger::new(Arc::new(RecordingSink::default()));
        assert!(logger.add_span(SpanConfig::default()).await.is_none());
        assert!(logger.conclude(ConcludeConfig::default()).await.is_none());
        assert_eq!(logger.flush().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_misuse_warnings_are_observable() {
        use tracing::instrument::WithSubscriber;

        let writer = CaptureWriter::default();
        let output = writer.0.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer)
            .with_max_level(tracing::Level::WARN)
            .without_time()
            .finish();

        let logger = TraceLogger::new(Arc::new(RecordingSink::default()));
        async {
            assert!(logger.add_span(SpanConfig::default()).await.is_none());
            assert!(logger.conclude(ConcludeConfig::default()).await.is_none());
        }
        .with_subscriber(subscriber)
        .await;

        let captured = String::from_utf8(output.lock().unwrap().clone()).unwrap();
        assert!(captured.contains("add_span called with no active trace"));
        assert!(captured.contains("conclude called with no active trace"));
    }

    #[tokio::test]
    async fn test_restart_discards_unconcluded_trace() {
        let sink = Arc::new(RecordingSink::default());
        let logger = TraceLogger::new(sink.clone());

        let first = logger
            .start_trace(TraceConfig {
                input: "first".into(),
                ..Default::default()
            })
            .await;
        let second = logger
            .start_trace(TraceConfig {
                input: "second".into(),
                ..Default::default()
            })
            .await;
        assert_ne!(first, second);
        assert_eq!(logger.active_trace_id().await, Some(second));

        logger.conclude(ConcludeConfig::default()).await.unwrap();
        logger.flush().await.unwrap();
        let batches = sink.batches();
        assert_eq!(batches[0].len(), 1);
        assert_eq!(batches[0][0].id, second);
    }

    #[tokio::test]
    async fn test_failed_flush_restores_buffer_in_order() {
        let sink = Arc::new(FailingSink::new(1));
        let logger = TraceLogger::new(sink.clone());

        let a = conclude_one(&logger, "a", "a-out").await;
        let b = conclude_one(&logger, "b", "b-out").await;
        assert!(logger.flush().await.is_err());
        assert_eq!(logger.buffered().await, 2);

        // A trace concluded between attempts goes behind the restored batch.
        let c = conclude_one(&logger, "c", "c-out").await;
        let sent = logger.flush().await.unwrap();
        assert_eq!(sent, 3);
        assert_eq!(logger.buffered().await, 0);

        let accepted = sink.accepted.lock().unwrap().clone();
        let ids: Vec<_> = accepted[0].iter().map(|t| t.id).collect();
        assert_eq!(ids, [a, b, c]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_timeout_restores_buffer() {
        let logger = TraceLogger::new(Arc::new(SlowSink));
        conclude_one(&logger, "slow", "never").await;

        let result = logger.flush_with_timeout(Duration::from_millis(100)).await;
        assert!(matches!(result, Err(ObserveError::Timeout(_))));
        assert_eq!(logger.buffered().await, 1);
    }

    #[tokio::test]
    async fn test_flush_is_all_or_nothing() {
        let sink = Arc::new(FailingSink::new(2));
        let logger = TraceLogger::new(sink.clone());
        conclude_one(&logger, "x", "y").await;

        assert!(logger.flush().await.is_err());
        assert!(logger.flush().await.is_err());
        assert_eq!(logger.buffered().await, 1);
        assert_eq!(logger.flush().await.unwrap(), 1);
        assert_eq!(logger.flush().await.unwrap(), 0);
        assert_eq!(sink.accepted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_close_discards_active_and_flushes() {
        let sink = Arc::new(RecordingSink::default());
        let logger = TraceLogger::new(sink.clone());

        conclude_one(&logger, "done", "ok").await;
        logger
            .start_trace(TraceConfig {
                input: "abandoned".into(),
                ..Default::default()
            })
            .await;

        assert_eq!(logger.close().await.unwrap(), 1);
        assert!(logger.active_trace_id().await.is_none());
        assert_eq!(sink.batches().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_span_appends() {
        let sink = Arc::new(RecordingSink::default());
        let logger = Arc::new(TraceLogger::new(sink.clone()));

        logger
            .start_trace(TraceConfig {
                input: "fanout".into(),
                ..Default::default()
            })
            .await;
        let mut handles = Vec::new();
        for i in 0..32 {
            let logger = logger.clone();
            handles.push(tokio::spawn(async move {
                logger
                    .add_span(SpanConfig {
                        name: format!("task-{}", i),
                        ..Default::default()
                    })
                    .await
                    .unwrap()
            }));
        }
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        logger.conclude(ConcludeConfig::default()).await.unwrap();
        logger.flush().await.unwrap();

        let batches = sink.batches();
        assert_eq!(batches[0][0].spans.len(), 32);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 32);
    }

    #[tokio::test]
    async fn test_connect_without_key_is_dry_run() {
        let config = ObserveConfig::default();
        let logger = TraceLogger::connect(&config).await.unwrap();
        assert!(logger.is_dry_run());

        logger
            .start_trace(TraceConfig {
                input: "local only".into(),
                ..Default::default()
            })
            .await;
        logger.conclude(ConcludeConfig::default()).await.unwrap();
        assert_eq!(logger.flush().await.unwrap(), 1);
    }
}
