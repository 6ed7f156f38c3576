//! In-process request and prediction metrics with Prometheus text rendering.
//!
//! Recording never fails and never blocks for long: each call takes one short
//! mutex section, and a poisoned lock is recovered rather than propagated.
//!
//! TODO: Export a `model_loaded` gauge so a degraded start shows up without a
//!       failed prediction.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Latency bucket upper bounds in seconds (Prometheus client defaults).
pub const LATENCY_BUCKETS: [f64; 14] = [
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Observability collaborator invoked by the HTTP layer and the composer.
pub trait MetricsSink: Send + Sync {
    fn record_request(&self, method: &str, path: &str, status: u16, elapsed: Duration);
    fn record_prediction(&self, outcome: &'static str);
}

/// Sink that drops everything.
#[derive(Default, Debug, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record_request(&self, _: &str, _: &str, _: u16, _: Duration) {}
    fn record_prediction(&self, _: &'static str) {}
}

#[derive(Clone, Debug, Default)]
struct Histogram {
    /// Cumulative counts per entry of `LATENCY_BUCKETS`.
    buckets: [u64; LATENCY_BUCKETS.len()],
    sum: f64,
    count: u64,
}

impl Histogram {
    fn observe(&mut self, seconds: f64) {
        for (bound, slot) in LATENCY_BUCKETS.iter().zip(self.buckets.iter_mut()) {
            if seconds <= *bound {
                *slot += 1;
            }
        }
        self.sum += seconds;
        self.count += 1;
    }
}

#[derive(Default, Debug)]
struct Registry {
    requests: BTreeMap<(String, String, u16), u64>,
    latency: BTreeMap<(String, String), Histogram>,
    predictions: BTreeMap<&'static str, u64>,
}

/// Counters and histograms shared by every request.
#[derive(Default, Debug)]
pub struct RequestMetrics {
    inner: Mutex<Registry>,
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn request_count(&self, method: &str, path: &str, status: u16) -> u64 {
        self.registry()
            .requests
            .get(&(method.to_string(), path.to_string(), status))
            .copied()
            .unwrap_or(0)
    }

    pub fn prediction_count(&self, outcome: &str) -> u64 {
        self.registry()
            .predictions
            .get(outcome)
            .copied()
            .unwrap_or(0)
    }

    /// Prometheus text exposition format, version 0.0.4.
    pub fn render(&self) -> String {
        let registry = self.registry();
        let mut out = String::new();

        out.push_str("# HELP http_requests_total Total HTTP requests handled.\n");
        out.push_str("# TYPE http_requests_total counter\n");
        for ((method, path, status), count) in &registry.requests {
            let _ = writeln!(
                out,
                "http_requests_total{{method=\"{method}\",path=\"{path}\",status=\"{status}\"}} {count}"
            );
        }

        out.push_str("# HELP http_request_duration_seconds HTTP request latency in seconds.\n");
        out.push_str("# TYPE http_request_duration_seconds histogram\n");
        for ((method, path), hist) in &registry.latency {
            let labels = format!("method=\"{method}\",path=\"{path}\"");
            for (bound, count) in LATENCY_BUCKETS.iter().zip(hist.buckets.iter()) {
                let _ = writeln!(
                    out,
                    "http_request_duration_seconds_bucket{{{labels},le=\"{bound}\"}} {count}"
                );
            }
            let _ = writeln!(
                out,
                "http_request_duration_seconds_bucket{{{labels},le=\"+Inf\"}} {}",
                hist.count
            );
            let _ = writeln!(out, "http_request_duration_seconds_sum{{{labels}}} {}", hist.sum);
            let _ = writeln!(
                out,
                "http_request_duration_seconds_count{{{labels}}} {}",
                hist.count
            );
        }

        out.push_str("# HELP predictions_total Prediction calls by outcome.\n");
        out.push_str("# TYPE predictions_total counter\n");
        for (outcome, count) in &registry.predictions {
            let _ = writeln!(out, "predictions_total{{outcome=\"{outcome}\"}} {count}");
        }

        out
    }
}

impl MetricsSink for RequestMetrics {
    fn record_request(&self, method: &str, path: &str, status: u16, elapsed: Duration) {
        let mut registry = self.registry();
        *registry
            .requests
            .entry((method.to_string(), path.to_string(), status))
            .or_insert(0) += 1;
        registry
            .latency
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .observe(elapsed.as_secs_f64());
    }

    fn record_prediction(&self, outcome: &'static str) {
        *self.registry().predictions.entry(outcome).or_insert(0) += 1;
    }
}
