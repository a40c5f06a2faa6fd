use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

use crate::domain::order::OrderStatus;

// ============================================================================
// Metrics Module - Prometheus metrics for order status transitions
// ============================================================================
//
// Tracks:
// - Transitions applied by the order service
// - Transitions rejected locally by the guard
// - Remote failures, labelled by error kind
// - Latency of the status update call
//
// ============================================================================

#[derive(Clone)]
pub struct TransitionMetrics {
    pub transitions_applied: IntCounterVec,
    pub transitions_rejected: IntCounterVec,
    pub remote_failures: IntCounterVec,
    pub update_duration: HistogramVec,
}

impl TransitionMetrics {
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        let transitions_applied = IntCounterVec::new(
            Opts::new(
                "order_status_transitions_applied_total",
                "Order status transitions accepted by the order service",
            ),
            &["from", "to"],
        )?;
        registry.register(Box::new(transitions_applied.clone()))?;

        let transitions_rejected = IntCounterVec::new(
            Opts::new(
                "order_status_transitions_rejected_total",
                "Order status transitions rejected before reaching the order service",
            ),
            &["from", "to"],
        )?;
        registry.register(Box::new(transitions_rejected.clone()))?;

        let remote_failures = IntCounterVec::new(
            Opts::new(
                "order_status_update_failures_total",
                "Order status updates that failed at the order service",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(remote_failures.clone()))?;

        let update_duration = HistogramVec::new(
            HistogramOpts::new(
                "order_status_update_duration_seconds",
                "Latency of order status update calls",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["outcome"],
        )?;
        registry.register(Box::new(update_duration.clone()))?;

        Ok(Self {
            transitions_applied,
            transitions_rejected,
            remote_failures,
            update_duration,
        })
    }

    pub fn record_applied(&self, from: OrderStatus, to: OrderStatus, seconds: f64) {
        self.transitions_applied
            .with_label_values(&[from.as_str(), to.as_str()])
            .inc();
        self.update_duration
            .with_label_values(&["success"])
            .observe(seconds);
    }

    pub fn record_rejected(&self, from: OrderStatus, to: OrderStatus) {
        self.transitions_rejected
            .with_label_values(&[from.as_str(), to.as_str()])
            .inc();
    }

    pub fn record_remote_failure(&self, kind: &str, seconds: f64) {
        self.remote_failures.with_label_values(&[kind]).inc();
        self.update_duration
            .with_label_values(&["failure"])
            .observe(seconds);
    }
}

/// Render every metric in `registry` in the Prometheus text format.
pub fn encode_text(registry: &Registry) -> anyhow::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();

    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;

    Ok(String::from_utf8(buffer)?)
}
