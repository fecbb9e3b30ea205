use crate::hierarchy::domain::{JobNumber, WorkOrderKey};

/// Notification published to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum TreeEvent {
    JobLoaded { job_number: JobNumber, root_count: usize },
    NodeExpanded { key: WorkOrderKey },
    NodeLoadFailed { key: WorkOrderKey, reason: String },
}

/// TreeEventSink port for delivering tree events to the UI
///
/// This port abstracts how events travel back to the interactive thread
/// (a channel, a log, a test recorder). Implementations must not block.
pub trait TreeEventSink: Send + Sync {
    /// Publishes one event
    fn publish(&self, event: TreeEvent);

    /// Reports that a job's forest is ready to display
    fn job_loaded(&self, job_number: &JobNumber, root_count: usize) {
        self.publish(TreeEvent::JobLoaded {
            job_number: job_number.clone(),
            root_count,
        });
    }

    /// Reports that a node's children were attached
    fn node_expanded(&self, key: &WorkOrderKey) {
        self.publish(TreeEvent::NodeExpanded { key: key.clone() });
    }

    /// Reports that fetching a node's children failed
    ///
    /// # Arguments
    /// * `key` - The node that stays collapsed
    /// * `reason` - Short reason the UI can show next to a retry affordance
    fn node_load_failed(&self, key: &WorkOrderKey, reason: &str) {
        self.publish(TreeEvent::NodeLoadFailed {
            key: key.clone(),
            reason: reason.to_string(),
        });
    }
}

impl<S: TreeEventSink + ?Sized> TreeEventSink for std::sync::Arc<S> {
    fn publish(&self, event: TreeEvent) {
        (**self).publish(event)
    }
}
