use crate::ports::outbound::{TreeEvent, TreeEventSink};

/// TracingEventSink adapter for writing tree events to the log
///
/// Useful when the presentation layer polls the session instead of
/// subscribing to events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl TracingEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl TreeEventSink for TracingEventSink {
    fn publish(&self, event: TreeEvent) {
        match event {
            TreeEvent::JobLoaded {
                job_number,
                root_count,
            } => tracing::info!(job = %job_number, roots = root_count, "job loaded"),
            TreeEvent::NodeExpanded { key } => tracing::debug!(key = %key, "node expanded"),
            TreeEvent::NodeLoadFailed { key, reason } => {
                tracing::warn!(key = %key, reason = %reason, "node load failed")
            }
        }
    }
}
