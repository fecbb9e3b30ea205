use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use wo_hierarchy::prelude::*;

/// Mock QueryGateway for testing
///
/// Serves scripted rows, counts every call, and can hold child fetches
/// behind a gate, slow them down, or make them fail.
#[derive(Default)]
pub struct MockQueryGateway {
    jobs: HashMap<String, Vec<LegacyRow>>,
    children: HashMap<WorkOrderKey, Vec<LegacyRow>>,
    parts: HashMap<String, Part>,
    gate: Option<Arc<Semaphore>>,
    delay: Duration,
    failing_children: Mutex<HashMap<WorkOrderKey, HierarchyError>>,
    assembly_failures: Mutex<VecDeque<HierarchyError>>,
    assembly_calls: AtomicUsize,
    child_calls: Mutex<HashMap<WorkOrderKey, usize>>,
    part_calls: AtomicUsize,
}

impl MockQueryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_job(mut self, job_number: &str, rows: Vec<LegacyRow>) -> Self {
        self.jobs.insert(job_number.to_string(), rows);
        self
    }

    pub fn with_children(mut self, key: WorkOrderKey, rows: Vec<LegacyRow>) -> Self {
        self.children.insert(key, rows);
        self
    }

    pub fn with_all_children(mut self, children: HashMap<WorkOrderKey, Vec<LegacyRow>>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.insert(part.id.clone(), part);
        self
    }

    /// Child fetches wait for one permit of `gate` each
    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fail_children(&self, key: WorkOrderKey, error: HierarchyError) {
        self.failing_children.lock().unwrap().insert(key, error);
    }

    pub fn recover_children(&self, key: &WorkOrderKey) {
        self.failing_children.lock().unwrap().remove(key);
    }

    /// The next `fetch_assemblies` call fails with `error`
    pub fn fail_next_assemblies(&self, error: HierarchyError) {
        self.assembly_failures.lock().unwrap().push_back(error);
    }

    pub fn assembly_calls(&self) -> usize {
        self.assembly_calls.load(Ordering::SeqCst)
    }

    pub fn child_calls(&self) -> usize {
        self.child_calls.lock().unwrap().values().sum()
    }

    pub fn child_calls_for(&self, key: &WorkOrderKey) -> usize {
        self.child_calls
            .lock()
            .unwrap()
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    pub fn part_calls(&self) -> usize {
        self.part_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryGateway for MockQueryGateway {
    async fn fetch_assemblies(&self, job_number: &JobNumber) -> HierarchyResult<Vec<LegacyRow>> {
        self.assembly_calls.fetch_add(1, Ordering::SeqCst);
        let failure = self.assembly_failures.lock().unwrap().pop_front();
        if let Some(error) = failure {
            return Err(error);
        }
        Ok(self
            .jobs
            .get(job_number.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_children(&self, key: &WorkOrderKey) -> HierarchyResult<Vec<LegacyRow>> {
        *self
            .child_calls
            .lock()
            .unwrap()
            .entry(key.clone())
            .or_insert(0) += 1;

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let failure = self.failing_children.lock().unwrap().get(key).cloned();
        if let Some(error) = failure {
            return Err(error);
        }
        Ok(self.children.get(key).cloned().unwrap_or_default())
    }

    async fn fetch_part(&self, part_id: &str) -> HierarchyResult<Part> {
        self.part_calls.fetch_add(1, Ordering::SeqCst);
        self.parts.get(part_id).cloned().ok_or_else(|| {
            HierarchyError::query("fetch_part", format!("part {} not found", part_id))
        })
    }
}
