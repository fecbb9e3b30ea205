use crate::hierarchy::domain::{Forest, JobNumber};

/// JobSummary - Response DTO of a job load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    pub job_number: JobNumber,
    pub generation: u64,
    pub root_count: usize,
    pub node_count: usize,
    /// Rows that could not be linked to a parent
    pub unresolved_count: usize,
    pub anomaly_count: usize,
    /// Restored from the session cache without any fetch
    pub from_cache: bool,
}

impl JobSummary {
    pub fn from_forest(forest: &Forest, from_cache: bool) -> Self {
        Self {
            job_number: forest.job_number().clone(),
            generation: forest.generation(),
            root_count: forest.root_count(),
            node_count: forest.len(),
            unresolved_count: forest.unresolved().len(),
            anomaly_count: forest.anomalies().len(),
            from_cache,
        }
    }
}
