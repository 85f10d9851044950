//! Execution instrumentation for queued jobs.
//!
//! This crate provides the middleware a worker wraps around every job it
//! runs: one "started" and one "processed"/"errored" record per execution,
//! plus duration metrics and an error counter.
//!
//! # Architecture
//!
//! - `ExecutionObserver` - Times a job and reports to the sinks
//! - `LogSink` / `MetricsSink` - Where records and metrics go
//! - `JobHandler` - Async job seam driven by `ExecutionObserver::perform`
//!
//! # Usage
//!
//! ```ignore
//! use instrumentation::ExecutionObserver;
//! use queue_core::{JobDescriptor, QueueName};
//!
//! let observer = ExecutionObserver::with_defaults();
//! let job = JobDescriptor::new("Mailers::WelcomeJob", vec![]);
//!
//! observer.observe(&job, &QueueName::default(), || send_welcome_mail())?;
//! ```

mod config;
mod handler;
mod identity;
mod observer;
mod sink;

pub use config::{ConfigError, ObserverConfig};
pub use handler::{FnHandler, HandlerError, HandlerFuture, HandlerResult, JobHandler};
pub use identity::{to_base36, worker_token};
pub use observer::{ExecutionObserver, elapsed_ms};
pub use sink::{LogSink, MetricsFacadeSink, MetricsSink, SinkError, TracingLogSink};
