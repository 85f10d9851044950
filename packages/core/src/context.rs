//! Log context attached to every record of one execution.

use serde::{Deserialize, Serialize};

use crate::JobDescriptor;

/// Tag identifying a single job execution in log output.
///
/// Rendered as `<name> JID-<jid>`, with ` BID-<bid>` appended for jobs that
/// belong to a batch. `<name>` is the inner job type for adapter jobs, so
/// the log shows the real work rather than the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogContext(String);

impl LogContext {
    /// Build the context for `job` run by a handler called `handler_name`.
    ///
    /// Name precedence: `wrapped`, then the handler name, then `class`.
    pub fn for_job(handler_name: Option<&str>, job: &JobDescriptor) -> Self {
        let name = job
            .wrapped
            .as_deref()
            .or(handler_name)
            .unwrap_or(&job.class);

        let mut label = format!("{} JID-{}", name, job.jid);
        if let Some(bid) = &job.bid {
            label.push_str(" BID-");
            label.push_str(bid);
        }
        Self(label)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LogContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> JobDescriptor {
        JobDescriptor::new("JobWrapper", vec![]).with_jid("abc123")
    }

    #[test]
    fn wrapped_name_wins_over_handler() {
        let job = job().with_wrapped("Mailers::WelcomeJob");
        let context = LogContext::for_job(Some("JobWrapper"), &job);
        assert_eq!(context.as_str(), "Mailers::WelcomeJob JID-abc123");
    }

    #[test]
    fn handler_name_used_without_wrapped() {
        let context = LogContext::for_job(Some("HardWorker"), &job());
        assert_eq!(context.to_string(), "HardWorker JID-abc123");
    }

    #[test]
    fn class_is_the_last_resort() {
        let context = LogContext::for_job(None, &job());
        assert_eq!(context.as_str(), "JobWrapper JID-abc123");
    }

    #[test]
    fn bid_only_when_present() {
        let context = LogContext::for_job(Some("HardWorker"), &job().with_bid("batch-9"));
        assert_eq!(context.as_str(), "HardWorker JID-abc123 BID-batch-9");
        assert!(!LogContext::for_job(None, &job()).as_str().contains("BID-"));
    }
}
