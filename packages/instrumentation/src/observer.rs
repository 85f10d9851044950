//! Execution observer: timing, logging and metrics around one job run.

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use queue_core::{ExecutionEvent, JobDescriptor, LogContext, QueueName, TelemetryInputError};

use crate::config::ObserverConfig;
use crate::handler::{HandlerResult, JobHandler};
use crate::identity::worker_token;
use crate::sink::{LogSink, MetricsFacadeSink, MetricsSink, SinkError, TracingLogSink};

/// Wraps job executions with start/finish records and latency metrics.
///
/// The observer never changes a job's outcome: values and errors are handed
/// back as produced, panics are resumed with their original payload. Sink
/// failures are logged and dropped.
///
/// It holds no per-execution state, so one instance can be shared by every
/// worker.
pub struct ExecutionObserver {
    config: ObserverConfig,
    logger: Arc<dyn LogSink>,
    metrics: Arc<dyn MetricsSink>,
}

impl ExecutionObserver {
    pub fn new(
        config: ObserverConfig,
        logger: Arc<dyn LogSink>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            config,
            logger,
            metrics,
        }
    }

    /// Default config reporting to `tracing` and the `metrics` facade.
    pub fn with_defaults() -> Self {
        Self::new(
            ObserverConfig::default(),
            Arc::new(TracingLogSink),
            Arc::new(MetricsFacadeSink),
        )
    }

    pub fn config(&self) -> &ObserverConfig {
        &self.config
    }

    /// Run `runner` for `descriptor` and report on it.
    pub fn observe<T, E, F>(
        &self,
        descriptor: &JobDescriptor,
        queue: &QueueName,
        runner: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.run(None, descriptor, queue, runner)
    }

    /// Like [`observe`](Self::observe), naming the handler for the log
    /// context.
    pub fn observe_as<T, E, F>(
        &self,
        handler_name: &str,
        descriptor: &JobDescriptor,
        queue: &QueueName,
        runner: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.run(Some(handler_name), descriptor, queue, runner)
    }

    /// Await `job` for `descriptor` and report on it.
    ///
    /// Dropping the returned future before it resolves counts as a failure.
    pub async fn observe_async<T, E, Fut>(
        &self,
        handler_name: Option<&str>,
        descriptor: &JobDescriptor,
        queue: &QueueName,
        job: Fut,
    ) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let execution = Execution::start(self, handler_name, descriptor, queue);
        match AssertUnwindSafe(job).catch_unwind().await {
            Ok(Ok(value)) => {
                execution.completed();
                Ok(value)
            }
            Ok(Err(err)) => {
                execution.failed();
                Err(err)
            }
            Err(payload) => {
                execution.failed();
                panic::resume_unwind(payload)
            }
        }
    }

    /// Run `handler` on `descriptor` under observation.
    ///
    /// The handler is only called once the start record is out, so work it
    /// does before handing back its future is timed and any panic there is
    /// reported like one from the future itself.
    pub async fn perform(
        &self,
        handler: &dyn JobHandler,
        descriptor: &JobDescriptor,
        queue: &QueueName,
    ) -> HandlerResult {
        self.observe_async(Some(handler.name()), descriptor, queue, async {
            handler.perform(descriptor).await
        })
        .await
    }

    fn run<T, E, F>(
        &self,
        handler_name: Option<&str>,
        descriptor: &JobDescriptor,
        queue: &QueueName,
        runner: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let execution = Execution::start(self, handler_name, descriptor, queue);
        match panic::catch_unwind(AssertUnwindSafe(runner)) {
            Ok(Ok(value)) => {
                execution.completed();
                Ok(value)
            }
            Ok(Err(err)) => {
                execution.failed();
                Err(err)
            }
            Err(payload) => {
                execution.failed();
                panic::resume_unwind(payload)
            }
        }
    }

    fn metric(&self, job_name: &str, suffix: &str) -> String {
        format!("{}.{}.{}", self.config.metric_prefix, job_name, suffix)
    }
}

/// State of one running job. Reports a failure if dropped unfinished.
struct Execution<'a> {
    observer: &'a ExecutionObserver,
    descriptor: &'a JobDescriptor,
    queue: &'a QueueName,
    context: Option<LogContext>,
    worker: String,
    started_at: DateTime<Utc>,
    finished: bool,
}

impl<'a> Execution<'a> {
    fn start(
        observer: &'a ExecutionObserver,
        handler_name: Option<&str>,
        descriptor: &'a JobDescriptor,
        queue: &'a QueueName,
    ) -> Self {
        let started_at = Utc::now();
        let execution = Self {
            observer,
            descriptor,
            queue,
            context: observer
                .config
                .context_scoping
                .then(|| LogContext::for_job(handler_name, descriptor)),
            worker: worker_token(),
            started_at,
            finished: false,
        };

        let limit = observer.config.array_display_limit;
        execution.log(&|| ExecutionEvent::Started {
            worker: execution.worker.clone(),
            job: descriptor
                .printable_json(limit)
                .unwrap_or_else(|err| format!("<unprintable job: {}>", err)),
        });
        execution
    }

    fn completed(mut self) {
        self.finished = true;

        let now = Utc::now();
        let elapsed_ms = elapsed_ms(self.started_at, now);
        self.measure("response", elapsed_ms);

        let (created_at_to_completion_ms, enqueued_at_to_completion_ms) =
            if self.observer.config.latency_metrics {
                (
                    self.latency("created_at", self.descriptor.created_at(), now),
                    self.latency("enqueued_at", self.descriptor.enqueued_at(), now),
                )
            } else {
                (None, None)
            };

        self.log(&|| ExecutionEvent::Processed {
            worker: self.worker.clone(),
            jid: self.descriptor.jid.clone(),
            elapsed_ms,
            created_at_to_completion_ms,
            enqueued_at_to_completion_ms,
        });
    }

    fn failed(mut self) {
        self.finished = true;
        self.report_failure();
    }

    fn report_failure(&self) {
        let elapsed_ms = elapsed_ms(self.started_at, Utc::now());

        let name = format!("{}.errored", self.observer.config.metric_prefix);
        let metrics = &self.observer.metrics;
        best_effort("metrics", || metrics.increment(&name));

        self.log(&|| ExecutionEvent::Errored {
            worker: self.worker.clone(),
            jid: self.descriptor.jid.clone(),
            elapsed_ms,
        });
    }

    /// Milliseconds from `field` to `now`, measured if the field is usable.
    fn latency(
        &self,
        field: &str,
        instant: Result<DateTime<Utc>, TelemetryInputError>,
        now: DateTime<Utc>,
    ) -> Option<i64> {
        match instant {
            Ok(at) => {
                let ms = elapsed_ms(at, now);
                self.measure(&format!("{}_to_completion", field), ms);
                Some(ms)
            }
            Err(err) => {
                tracing::warn!(
                    jid = %self.descriptor.jid,
                    queue = %self.queue,
                    error = %err,
                    "Skipping {}_to_completion metric",
                    field
                );
                None
            }
        }
    }

    fn measure(&self, suffix: &str, value_ms: i64) {
        let name = self.observer.metric(self.descriptor.job_name(), suffix);
        let metrics = &self.observer.metrics;
        best_effort("metrics", || metrics.measure(&name, value_ms));
    }

    fn log(&self, event: &dyn Fn() -> ExecutionEvent) {
        let logger = &self.observer.logger;
        let context = self.context.as_ref();
        best_effort("log", || logger.info(context, event));
    }
}

impl Drop for Execution<'_> {
    fn drop(&mut self) {
        if !self.finished {
            // the job future was dropped before it resolved
            self.report_failure();
        }
    }
}

/// Whole milliseconds between two wall-clock instants, rounded half away
/// from zero. Negative when `to` precedes `from`.
pub fn elapsed_ms(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let delta = to - from;
    match delta.num_microseconds() {
        Some(micros) => (micros as f64 / 1_000.0).round() as i64,
        None => delta.num_milliseconds(),
    }
}

/// Run a sink call, absorbing errors and panics.
fn best_effort(sink: &'static str, op: impl FnOnce() -> Result<(), SinkError>) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(op))
        .unwrap_or_else(|payload| Err(SinkError::Panicked(panic_message(payload.as_ref()))));

    if let Err(err) = outcome {
        tracing::warn!(sink, error = %err, "Telemetry sink failed");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
