use crate::hierarchy::domain::{Forest, JobNumber};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone)]
struct CachedForest {
    forest: Forest,
    saved_at: DateTime<Utc>,
    sequence: u64,
}

/// TreeStateCache keeps resolved forests of visited jobs for the session.
///
/// Restoring a job reproduces the prior view, expansion state included,
/// without touching the gateway. Snapshots live in memory only; nothing is
/// ever written to disk.
///
/// The cache is thread-safe; the session saves and restores from the
/// interactive task while background fetches only touch the live tree.
pub struct TreeStateCache {
    entries: DashMap<JobNumber, CachedForest>,
    max_jobs: Option<usize>,
    sequence: AtomicU64,
}

impl TreeStateCache {
    pub fn new() -> Self {
        Self::with_capacity_limit(None)
    }

    /// Creates a cache that keeps at most `max_jobs` snapshots
    ///
    /// When full, saving a new job evicts the oldest snapshot.
    pub fn with_capacity_limit(max_jobs: Option<usize>) -> Self {
        Self {
            entries: DashMap::new(),
            max_jobs,
            sequence: AtomicU64::new(0),
        }
    }

    /// Stores a snapshot of `forest` under `job_number`, replacing any earlier one
    ///
    /// Nodes that are mid-fetch are stored as not loaded: their results carry
    /// a generation that will be stale by the time the snapshot is restored.
    pub fn save(&self, job_number: &JobNumber, forest: &Forest) {
        let mut snapshot = forest.clone();
        snapshot.settle_in_flight();

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.entries.insert(
            job_number.clone(),
            CachedForest {
                forest: snapshot,
                saved_at: Utc::now(),
                sequence,
            },
        );
        tracing::debug!(job = %job_number, nodes = forest.len(), "saved forest snapshot");

        self.enforce_limit(job_number);
    }

    /// Returns a copy of the snapshot saved for `job_number`
    pub fn restore(&self, job_number: &JobNumber) -> Option<Forest> {
        let restored = self.entries.get(job_number).map(|entry| entry.forest.clone());
        match &restored {
            Some(forest) => {
                tracing::debug!(job = %job_number, nodes = forest.len(), "tree state cache hit")
            }
            None => tracing::debug!(job = %job_number, "tree state cache miss"),
        }
        restored
    }

    /// When the snapshot of `job_number` was taken
    pub fn saved_at(&self, job_number: &JobNumber) -> Option<DateTime<Utc>> {
        self.entries.get(job_number).map(|entry| entry.saved_at)
    }

    /// Drops the snapshot of one job, returning whether one existed
    pub fn evict(&self, job_number: &JobNumber) -> bool {
        self.entries.remove(job_number).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, job_number: &JobNumber) -> bool {
        self.entries.contains_key(job_number)
    }

    fn enforce_limit(&self, keep: &JobNumber) {
        let Some(max_jobs) = self.max_jobs else {
            return;
        };
        while self.entries.len() > max_jobs.max(1) {
            let oldest = self
                .entries
                .iter()
                .filter(|entry| entry.key() != keep)
                .min_by_key(|entry| entry.value().sequence)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(job_number) => {
                    tracing::debug!(job = %job_number, "evicting oldest forest snapshot");
                    self.entries.remove(&job_number);
                }
                None => break,
            }
        }
    }
}

impl Default for TreeStateCache {
    fn default() -> Self {
        Self::new()
    }
}
