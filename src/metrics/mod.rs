//! Prometheus metrics for scan observability.

mod collector;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
