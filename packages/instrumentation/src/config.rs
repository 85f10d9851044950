//! Observer configuration.

use serde::{Deserialize, Serialize};

use queue_core::DEFAULT_ARRAY_DISPLAY_LIMIT;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid boolean for {var}={value} (expected true/false)")]
    InvalidBool { var: &'static str, value: String },

    #[error("invalid number for {var}={value}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("invalid metric prefix {0:?}: must be non-empty without whitespace")]
    InvalidPrefix(String),
}

/// What the observer measures and how it logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// First segment of every metric name (`job.HardJob.response`).
    pub metric_prefix: String,
    /// Arrays in `args` longer than this are summarised in the started line.
    pub array_display_limit: usize,
    /// Also measure `created_at_to_completion` and `enqueued_at_to_completion`.
    pub latency_metrics: bool,
    /// Attach a [`LogContext`](queue_core::LogContext) to every record.
    pub context_scoping: bool,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            metric_prefix: "job".to_string(),
            array_display_limit: DEFAULT_ARRAY_DISPLAY_LIMIT,
            latency_metrics: true,
            context_scoping: true,
        }
    }
}

impl ObserverConfig {
    /// Plain job logger: all duration metrics, no log context.
    pub fn job_logger() -> Self {
        Self {
            context_scoping: false,
            ..Default::default()
        }
    }

    /// Server middleware: all duration metrics, records tagged with the
    /// job's log context.
    pub fn server_middleware() -> Self {
        Self::default()
    }

    pub fn with_metric_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.metric_prefix = prefix.into();
        self
    }

    pub fn with_array_display_limit(mut self, limit: usize) -> Self {
        self.array_display_limit = limit;
        self
    }

    pub fn with_latency_metrics(mut self, enabled: bool) -> Self {
        self.latency_metrics = enabled;
        self
    }

    pub fn with_context_scoping(mut self, enabled: bool) -> Self {
        self.context_scoping = enabled;
        self
    }

    /// Build a config from environment variables.
    ///
    /// Every variable is optional and falls back to [`Default`]:
    /// - `JOB_METRIC_PREFIX` (default: `job`)
    /// - `JOB_ARRAY_DISPLAY_LIMIT` (default: `5`)
    /// - `JOB_LATENCY_METRICS` (`true`/`false`, default: true)
    /// - `JOB_LOG_CONTEXT` (`true`/`false`, default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let var = |name: &str| lookup(name).and_then(non_empty);

        if let Some(prefix) = var("JOB_METRIC_PREFIX") {
            if prefix.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidPrefix(prefix));
            }
            config.metric_prefix = prefix;
        }

        if let Some(raw) = var("JOB_ARRAY_DISPLAY_LIMIT") {
            config.array_display_limit =
                raw.parse().map_err(|_| ConfigError::InvalidNumber {
                    var: "JOB_ARRAY_DISPLAY_LIMIT",
                    value: raw.clone(),
                })?;
        }

        if let Some(raw) = var("JOB_LATENCY_METRICS") {
            config.latency_metrics = parse_bool("JOB_LATENCY_METRICS", &raw)?;
        }

        if let Some(raw) = var("JOB_LOG_CONTEXT") {
            config.context_scoping = parse_bool("JOB_LOG_CONTEXT", &raw)?;
        }

        tracing::debug!(?config, "Resolved observer config");
        Ok(config)
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}
