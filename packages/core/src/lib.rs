//! Core domain types for job execution instrumentation.
//!
//! This crate contains the types shared by the observer and its callers:
//! - `JobDescriptor` for the job payload a worker receives
//! - `QueueName` for the source queue
//! - `LogContext` and `ExecutionEvent` for what gets logged

mod context;
mod events;
mod job;
mod printable;
mod queue;

pub use context::LogContext;
pub use events::ExecutionEvent;
pub use job::{JobDescriptor, TelemetryInputError, job_name, unix_seconds};
pub use printable::DEFAULT_ARRAY_DISPLAY_LIMIT;
pub use queue::QueueName;
