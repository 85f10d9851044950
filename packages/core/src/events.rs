//! Records emitted for one job execution.

use serde::{Deserialize, Serialize};

/// A log record produced while observing a job.
///
/// Exactly one `Started` and exactly one of `Processed` / `Errored` is
/// produced per execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ExecutionEvent {
    /// The job is about to run.
    Started {
        worker: String,
        /// Sanitized descriptor as JSON.
        job: String,
    },
    /// The job returned normally.
    Processed {
        worker: String,
        jid: String,
        elapsed_ms: i64,
        /// `None` when the metric was skipped.
        #[serde(skip_serializing_if = "Option::is_none")]
        created_at_to_completion_ms: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        enqueued_at_to_completion_ms: Option<i64>,
    },
    /// The job failed, panicked or was dropped before completing.
    Errored {
        worker: String,
        jid: String,
        elapsed_ms: i64,
    },
}

impl ExecutionEvent {
    /// Short name of the record kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ExecutionEvent::Started { .. } => "started",
            ExecutionEvent::Processed { .. } => "processed",
            ExecutionEvent::Errored { .. } => "errored",
        }
    }

    pub fn worker(&self) -> &str {
        match self {
            ExecutionEvent::Started { worker, .. } => worker,
            ExecutionEvent::Processed { worker, .. } => worker,
            ExecutionEvent::Errored { worker, .. } => worker,
        }
    }

    /// Job id for terminal records.
    pub fn jid(&self) -> Option<&str> {
        match self {
            ExecutionEvent::Started { .. } => None,
            ExecutionEvent::Processed { jid, .. } => Some(jid),
            ExecutionEvent::Errored { jid, .. } => Some(jid),
        }
    }

    /// Whether this record ends the execution.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionEvent::Started { .. })
    }

    /// Operator-facing log line.
    pub fn description(&self) -> String {
        match self {
            ExecutionEvent::Started { worker, job } => format!("{} started: {}", worker, job),
            ExecutionEvent::Processed {
                worker,
                jid,
                elapsed_ms,
                created_at_to_completion_ms,
                enqueued_at_to_completion_ms,
            } => {
                let mut line = format!("{} processed: {} (job:{}ms", worker, jid, elapsed_ms);
                // both absent means the latency metrics are switched off
                if created_at_to_completion_ms.is_some() || enqueued_at_to_completion_ms.is_some() {
                    line.push_str(&format!(
                        ", created_at_to_completion:{}, enqueued_at_to_completion:{}",
                        millis(*created_at_to_completion_ms),
                        millis(*enqueued_at_to_completion_ms),
                    ));
                }
                line.push(')');
                line
            }
            ExecutionEvent::Errored {
                worker,
                jid,
                elapsed_ms,
            } => format!("{} errored: {} took {}ms", worker, jid, elapsed_ms),
        }
    }
}

fn millis(value: Option<i64>) -> String {
    match value {
        Some(ms) => format!("{}ms", ms),
        None => "n/a".to_string(),
    }
}

impl std::fmt::Display for ExecutionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description())
    }
}
