//! Job descriptor as handed to a worker by the dispatcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use ulid::Ulid;

/// Problems with the timing fields of a descriptor.
///
/// These never describe a job failure: the observer skips the affected
/// metric and carries on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TelemetryInputError {
    #[error("`{field}` is missing")]
    Missing { field: &'static str },

    #[error("`{field}` is not a number: {value}")]
    NotNumeric { field: &'static str, value: String },

    #[error("`{field}` is not a representable instant: {seconds}")]
    OutOfRange { field: &'static str, seconds: f64 },
}

/// A job payload as stored on the queue.
///
/// Only the fields the instrumentation reads are typed. Everything else the
/// client pushed (`queue`, `retry`, custom keys) is kept in `extra` so the
/// logged copy shows the payload as the dispatcher saw it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptor {
    /// Fully-qualified job type, e.g. `Billing::Invoices::GenerateJob`.
    pub class: String,
    /// Unique job id.
    pub jid: String,
    /// Positional arguments; an absent `args` key reads as empty.
    #[serde(default)]
    pub args: Vec<Value>,
    /// Unix seconds at creation. Kept raw so a malformed value is still
    /// representable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
    /// Unix seconds at the latest enqueue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enqueued_at: Option<Value>,
    /// Inner job type when `class` is a generic adapter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrapped: Option<String>,
    /// Batch id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobDescriptor {
    /// Build a descriptor the way a client does on push: fresh jid, created
    /// and enqueued now.
    pub fn new(class: impl Into<String>, args: Vec<Value>) -> Self {
        let now = unix_seconds(Utc::now());
        Self {
            class: class.into(),
            jid: Ulid::new().to_string().to_lowercase(),
            args,
            created_at: Some(now.clone()),
            enqueued_at: Some(now),
            wrapped: None,
            bid: None,
            extra: Map::new(),
        }
    }

    /// Parse a descriptor from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_jid(mut self, jid: impl Into<String>) -> Self {
        self.jid = jid.into();
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(unix_seconds(at));
        self
    }

    pub fn with_enqueued_at(mut self, at: DateTime<Utc>) -> Self {
        self.enqueued_at = Some(unix_seconds(at));
        self
    }

    /// Mark this descriptor as an adapter around `inner`.
    pub fn with_wrapped(mut self, inner: impl Into<String>) -> Self {
        self.wrapped = Some(inner.into());
        self
    }

    pub fn with_bid(mut self, bid: impl Into<String>) -> Self {
        self.bid = Some(bid.into());
        self
    }

    /// Attach an arbitrary extra key.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Simple class name with any namespace prefix stripped.
    pub fn job_name(&self) -> &str {
        job_name(&self.class)
    }

    /// `created_at` as an absolute instant.
    pub fn created_at(&self) -> Result<DateTime<Utc>, TelemetryInputError> {
        parse_timestamp("created_at", self.created_at.as_ref())
    }

    /// `enqueued_at` as an absolute instant.
    pub fn enqueued_at(&self) -> Result<DateTime<Utc>, TelemetryInputError> {
        parse_timestamp("enqueued_at", self.enqueued_at.as_ref())
    }
}

/// Last non-empty `:`-separated segment of `class`.
///
/// `Billing::Invoices::GenerateJob` becomes `GenerateJob`. Trailing
/// separators are ignored; a class made only of separators has an empty
/// name.
pub fn job_name(class: &str) -> &str {
    class
        .rsplit(':')
        .find(|segment| !segment.is_empty())
        .unwrap_or("")
}

/// Render an instant as fractional Unix seconds.
pub fn unix_seconds(at: DateTime<Utc>) -> Value {
    Value::from(at.timestamp_micros() as f64 / 1_000_000.0)
}

fn parse_timestamp(
    field: &'static str,
    value: Option<&Value>,
) -> Result<DateTime<Utc>, TelemetryInputError> {
    let value = value.ok_or(TelemetryInputError::Missing { field })?;
    let seconds = value
        .as_f64()
        .ok_or_else(|| TelemetryInputError::NotNumeric {
            field,
            value: value.to_string(),
        })?;

    let micros = (seconds * 1_000_000.0).round();
    if !micros.is_finite() {
        return Err(TelemetryInputError::OutOfRange { field, seconds });
    }
    DateTime::from_timestamp_micros(micros as i64)
        .ok_or(TelemetryInputError::OutOfRange { field, seconds })
}
