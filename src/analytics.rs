//! Best-effort analytics emission.
//!
//! Sinks are fire-and-forget by signature: `track` cannot fail, so analytics
//! trouble can never fail the operation that emitted the event.

use serde_json::Value;

/// Relative importance of an analytics event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPriority {
  Low,
  Medium,
  High,
}

/// Destination for product analytics events.
pub trait AnalyticsSink: Send + Sync {
  fn track(&self, event: &str, attributes: Value, priority: EventPriority);
}

/// Sink that discards everything.
pub struct NoopAnalytics;

impl AnalyticsSink for NoopAnalytics {
  fn track(&self, _event: &str, _attributes: Value, _priority: EventPriority) {}
}

/// Sink that writes events to the `analytics` tracing target.
pub struct TracingAnalytics;

impl AnalyticsSink for TracingAnalytics {
  fn track(&self, event: &str, attributes: Value, priority: EventPriority) {
    tracing::debug!(
      target: "analytics",
      event = %event,
      priority = ?priority,
      attributes = %attributes,
      "track"
    );
  }
}
