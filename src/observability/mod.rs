//! Observability for the lifecycle core
//!
//! Logging goes through `tracing`; every line carries an `event` field
//! naming a [`LifecycleEvent`]. Counters live in an injected
//! [`LifecycleMetrics`] so swallowed failures stay observable.

mod events;
mod metrics;

pub use events::LifecycleEvent;
pub use metrics::{LifecycleMetrics, MetricsSnapshot};
