//! Prometheus metrics for the bridge reconciler.
//!
//! All metrics follow the naming convention: `bridge_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Events processed, by event kind and outcome (applied/ignored/skipped)
    pub static ref EVENTS_PROCESSED: CounterVec = CounterVec::new(
        Opts::new("bridge_events_processed_total", "Bridge events processed by kind and outcome"),
        &["event", "outcome"]
    ).expect("metric creation failed");

    /// Events that halted processing, by event kind
    pub static ref EVENTS_FAILED: CounterVec = CounterVec::new(
        Opts::new("bridge_events_failed_total", "Bridge events that halted processing"),
        &["event"]
    ).expect("metric creation failed");

    /// Proposals created
    pub static ref PROPOSALS_CREATED: Counter = Counter::new(
        "bridge_proposals_created_total",
        "Total number of proposals created"
    ).expect("metric creation failed");

    /// Votes recorded
    pub static ref VOTES_RECORDED: Counter = Counter::new(
        "bridge_votes_recorded_total",
        "Total number of relayer votes recorded"
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Registering twice is not an error.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(EVENTS_PROCESSED.clone()),
        Box::new(EVENTS_FAILED.clone()),
        Box::new(PROPOSALS_CREATED.clone()),
        Box::new(VOTES_RECORDED.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Record the outcome of one event.
pub fn record_event(event: &str, outcome: &str) {
    EVENTS_PROCESSED.with_label_values(&[event, outcome]).inc();
}

/// Record an event that halted processing.
pub fn record_failure(event: &str) {
    EVENTS_FAILED.with_label_values(&[event]).inc();
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics_twice() {
        register_metrics().unwrap();
        register_metrics().unwrap();
    }

    #[test]
    fn test_record_event() {
        record_event("Deposit", "applied");
        assert!(
            EVENTS_PROCESSED
                .with_label_values(&["Deposit", "applied"])
                .get()
                >= 1.0
        );
    }

    #[test]
    fn test_encode_contains_registered_metric() {
        register_metrics().unwrap();
        VOTES_RECORDED.inc();
        let text = encode_metrics().unwrap();
        assert!(text.contains("bridge_votes_recorded_total"));
    }
}
