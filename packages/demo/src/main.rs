//! Runs a handful of demo jobs through the execution observer.
//!
//! Observer settings come from the environment (`JOB_METRIC_PREFIX`,
//! `JOB_ARRAY_DISPLAY_LIMIT`, `JOB_LATENCY_METRICS`, `JOB_LOG_CONTEXT`).

use std::sync::Arc;
use std::time::Duration;

use instrumentation::{
    ExecutionObserver, FnHandler, HandlerError, HandlerResult, JobHandler, MetricsFacadeSink,
    ObserverConfig, TracingLogSink,
};
use queue_core::{JobDescriptor, QueueName};
use serde_json::json;

fn explode_now() -> HandlerResult {
    panic!("Intentional panic")
}

fn demo_handlers() -> Vec<(Box<dyn JobHandler>, JobDescriptor)> {
    // Demo: Echo handler
    let echo = FnHandler::for_class("Demo::EchoJob", |job: &JobDescriptor| {
        let args = job.args.clone();
        Box::pin(async move {
            tracing::debug!("Echo job: {:?}", args);
            Ok(())
        })
    });

    // Demo: Sleep handler, first argument is the duration in milliseconds
    let sleep = FnHandler::new("SleepWorker", |job: &JobDescriptor| {
        let millis = job.args.first().and_then(|v| v.as_u64()).unwrap_or(50);
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(millis)).await;
            Ok(())
        })
    });

    // Demo: Failing handler
    let fail = FnHandler::new("FailWorker", |_job: &JobDescriptor| {
        Box::pin(async move {
            let err: HandlerError = "Intentional failure".into();
            Err(err)
        })
    });

    // Demo: Panicking handler
    let explode = FnHandler::new("ExplodeWorker", |_job: &JobDescriptor| {
        Box::pin(async move { explode_now() })
    });

    let bulk: Vec<u32> = (0..250).collect();
    vec![
        (
            Box::new(echo) as Box<dyn JobHandler>,
            JobDescriptor::new("Demo::EchoJob", vec![json!("hello"), json!(bulk)]),
        ),
        (
            Box::new(sleep) as Box<dyn JobHandler>,
            JobDescriptor::new("ActiveJob::JobWrapper", vec![json!(120)])
                .with_wrapped("Demo::SleepJob")
                .with_bid("demo-batch"),
        ),
        (
            Box::new(fail) as Box<dyn JobHandler>,
            JobDescriptor::new("Demo::FailJob", vec![]),
        ),
        (
            Box::new(explode) as Box<dyn JobHandler>,
            JobDescriptor::new("Demo::ExplodeJob", vec![]),
        ),
    ]
}

#[tokio::main]
async fn main() -> Result<(), HandlerError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = ObserverConfig::from_env()?;
    let observer = Arc::new(ExecutionObserver::new(
        config,
        Arc::new(TracingLogSink),
        Arc::new(MetricsFacadeSink),
    ));
    let queue = QueueName::new("demo");

    let mut tasks = Vec::new();
    for (handler, job) in demo_handlers() {
        let observer = observer.clone();
        let queue = queue.clone();
        tasks.push(tokio::spawn(async move {
            let outcome = observer.perform(handler.as_ref(), &job, &queue).await;
            (job.jid, outcome.map_err(|e| e.to_string()))
        }));
    }

    for task in tasks {
        match task.await {
            Ok((jid, Ok(()))) => tracing::info!("Job {} succeeded", jid),
            Ok((jid, Err(e))) => tracing::warn!("Job {} failed: {}", jid, e),
            Err(e) if e.is_panic() => tracing::warn!("Job task panicked: {}", e),
            Err(e) => tracing::warn!("Job task aborted: {}", e),
        }
    }

    // Synchronous runners go through `observe`.
    let report = JobDescriptor::new("Demo::Reports::DailyReportJob", vec![json!("2026-10-16")]);
    let rows = observer.observe(&report, &queue, || Ok::<_, HandlerError>(42))?;
    tracing::info!("Daily report produced {} rows", rows);

    Ok(())
}
