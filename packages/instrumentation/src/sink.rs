//! Logging and metrics sinks the observer reports to.

use queue_core::{ExecutionEvent, LogContext};

/// Failure inside a sink. Never propagated to the job.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("sink unavailable: {0}")]
    Unavailable(String),

    #[error("sink panicked: {0}")]
    Panicked(String),
}

/// Destination for execution records.
///
/// `event` is only called when the record will actually be written, so a
/// sink with info disabled never pays for serializing the job.
pub trait LogSink: Send + Sync {
    fn info(
        &self,
        context: Option<&LogContext>,
        event: &dyn Fn() -> ExecutionEvent,
    ) -> Result<(), SinkError>;
}

/// Destination for execution metrics.
pub trait MetricsSink: Send + Sync {
    /// Record a duration in milliseconds.
    fn measure(&self, name: &str, value_ms: i64) -> Result<(), SinkError>;

    /// Bump a counter by one.
    fn increment(&self, name: &str) -> Result<(), SinkError>;
}

/// Writes records through `tracing` at INFO.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn info(
        &self,
        context: Option<&LogContext>,
        event: &dyn Fn() -> ExecutionEvent,
    ) -> Result<(), SinkError> {
        if !tracing::enabled!(tracing::Level::INFO) {
            return Ok(());
        }

        let event = event();
        match context {
            Some(context) => tracing::info!(
                context = %context,
                event = event.kind(),
                worker = event.worker(),
                jid = event.jid(),
                "{}",
                event.description()
            ),
            None => tracing::info!(
                event = event.kind(),
                worker = event.worker(),
                jid = event.jid(),
                "{}",
                event.description()
            ),
        }
        Ok(())
    }
}

/// Forwards to the `metrics` facade: durations as histograms, counters as
/// counters. A no-op until the host installs a recorder.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsFacadeSink;

impl MetricsSink for MetricsFacadeSink {
    fn measure(&self, name: &str, value_ms: i64) -> Result<(), SinkError> {
        metrics::histogram!(name.to_owned()).record(value_ms as f64);
        Ok(())
    }

    fn increment(&self, name: &str) -> Result<(), SinkError> {
        metrics::counter!(name.to_owned()).increment(1);
        Ok(())
    }
}
