use std::sync::Mutex;
use wo_hierarchy::prelude::*;

/// Mock TreeEventSink that records every published event
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<TreeEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TreeEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn expanded(&self) -> Vec<WorkOrderKey> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                TreeEvent::NodeExpanded { key } => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<(WorkOrderKey, String)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                TreeEvent::NodeLoadFailed { key, reason } => Some((key, reason)),
                _ => None,
            })
            .collect()
    }

    pub fn jobs_loaded(&self) -> Vec<(JobNumber, usize)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                TreeEvent::JobLoaded {
                    job_number,
                    root_count,
                } => Some((job_number, root_count)),
                _ => None,
            })
            .collect()
    }
}

impl TreeEventSink for RecordingEventSink {
    fn publish(&self, event: TreeEvent) {
        self.events.lock().unwrap().push(event);
    }
}
