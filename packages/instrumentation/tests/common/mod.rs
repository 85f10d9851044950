#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use instrumentation::{ExecutionObserver, LogSink, MetricsSink, ObserverConfig, SinkError};
use queue_core::{ExecutionEvent, LogContext};

#[derive(Debug, Clone, PartialEq)]
pub enum Metric {
    Measure(String, i64),
    Increment(String),
}

#[derive(Default)]
pub struct RecordingLog {
    records: Mutex<Vec<(Option<LogContext>, ExecutionEvent)>>,
}

impl RecordingLog {
    pub fn records(&self) -> Vec<(Option<LogContext>, ExecutionEvent)> {
        self.records.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<ExecutionEvent> {
        self.records().into_iter().map(|(_, event)| event).collect()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(ExecutionEvent::kind).collect()
    }
}

impl LogSink for RecordingLog {
    fn info(
        &self,
        context: Option<&LogContext>,
        event: &dyn Fn() -> ExecutionEvent,
    ) -> Result<(), SinkError> {
        self.records
            .lock()
            .unwrap()
            .push((context.cloned(), event()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingMetrics {
    metrics: Mutex<Vec<Metric>>,
}

impl RecordingMetrics {
    pub fn all(&self) -> Vec<Metric> {
        self.metrics.lock().unwrap().clone()
    }

    pub fn measured(&self) -> Vec<(String, i64)> {
        self.all()
            .into_iter()
            .filter_map(|metric| match metric {
                Metric::Measure(name, value) => Some((name, value)),
                Metric::Increment(_) => None,
            })
            .collect()
    }

    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.measured()
            .into_iter()
            .find(|(measured, _)| measured == name)
            .map(|(_, value)| value)
    }

    pub fn increments(&self, name: &str) -> usize {
        self.all()
            .iter()
            .filter(|metric| matches!(metric, Metric::Increment(n) if n == name))
            .count()
    }
}

impl MetricsSink for RecordingMetrics {
    fn measure(&self, name: &str, value_ms: i64) -> Result<(), SinkError> {
        self.metrics
            .lock()
            .unwrap()
            .push(Metric::Measure(name.to_string(), value_ms));
        Ok(())
    }

    fn increment(&self, name: &str) -> Result<(), SinkError> {
        self.metrics
            .lock()
            .unwrap()
            .push(Metric::Increment(name.to_string()));
        Ok(())
    }
}

/// Sink that is always down.
pub struct BrokenSink;

impl LogSink for BrokenSink {
    fn info(
        &self,
        _context: Option<&LogContext>,
        _event: &dyn Fn() -> ExecutionEvent,
    ) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("log shipper offline".into()))
    }
}

impl MetricsSink for BrokenSink {
    fn measure(&self, _name: &str, _value_ms: i64) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("statsd unreachable".into()))
    }

    fn increment(&self, _name: &str) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("statsd unreachable".into()))
    }
}

/// Sink that panics on every call.
pub struct PanickingSink;

impl LogSink for PanickingSink {
    fn info(
        &self,
        _context: Option<&LogContext>,
        event: &dyn Fn() -> ExecutionEvent,
    ) -> Result<(), SinkError> {
        panic!("log sink exploded on {}", event().kind())
    }
}

impl MetricsSink for PanickingSink {
    fn measure(&self, name: &str, _value_ms: i64) -> Result<(), SinkError> {
        panic!("metrics sink exploded on {}", name)
    }

    fn increment(&self, name: &str) -> Result<(), SinkError> {
        panic!("metrics sink exploded on {}", name)
    }
}

pub struct Harness {
    pub observer: ExecutionObserver,
    pub log: Arc<RecordingLog>,
    pub metrics: Arc<RecordingMetrics>,
}

pub fn harness(config: ObserverConfig) -> Harness {
    let log = Arc::new(RecordingLog::default());
    let metrics = Arc::new(RecordingMetrics::default());
    let observer = ExecutionObserver::new(config, log.clone(), metrics.clone());
    Harness {
        observer,
        log,
        metrics,
    }
}
