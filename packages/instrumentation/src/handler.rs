//! Job handler trait.

use queue_core::{JobDescriptor, job_name};
use std::future::Future;
use std::pin::Pin;

/// Error returned by a failing job.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for job handlers.
pub type HandlerResult = Result<(), HandlerError>;

/// Future type for async job handlers.
pub type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send>>;

/// Trait for job handlers.
///
/// Implement this trait to define how jobs of a specific type are
/// performed. The name shows up in the log context unless the descriptor
/// names a wrapped job.
pub trait JobHandler: Send + Sync + 'static {
    /// Name of the handler type.
    fn name(&self) -> &str;

    /// Perform the job.
    fn perform(&self, job: &JobDescriptor) -> HandlerFuture;
}

/// A simple function-based job handler.
pub struct FnHandler<F>
where
    F: Fn(&JobDescriptor) -> HandlerFuture + Send + Sync + 'static,
{
    name: String,
    handler: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&JobDescriptor) -> HandlerFuture + Send + Sync + 'static,
{
    /// Create a new function-based handler.
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }

    /// Handler for jobs of `class`, named after the class without its
    /// namespace.
    pub fn for_class(class: &str, handler: F) -> Self {
        Self::new(job_name(class), handler)
    }
}

impl<F> JobHandler for FnHandler<F>
where
    F: Fn(&JobDescriptor) -> HandlerFuture + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn perform(&self, job: &JobDescriptor) -> HandlerFuture {
        (self.handler)(job)
    }
}
