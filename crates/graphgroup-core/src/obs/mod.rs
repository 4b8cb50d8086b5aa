//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Group-by execution records events through `sink`; it never touches the
//! counter state directly.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{
    AttributeCounters, AttributeSummary, EventOps, EventPerf, EventReport, EventState,
};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
