use crate::application::dto::{ExpandAllSummary, JobSummary};
use crate::application::read_models::{TreeNodeView, TreeViewBuilder};
use crate::application::state::TreeStateCache;
use crate::application::use_cases::lazy_expansion::{ExpansionCoordinator, ExpansionHandle};
use crate::application::use_cases::part_lookup::lookup_parts;
use crate::config::HierarchyConfig;
use crate::hierarchy::domain::{Anomaly, Forest, JobNumber, UnresolvedRow, WorkOrderKey};
use crate::hierarchy::services::TreeResolver;
use crate::ports::outbound::{QueryGateway, TreeEventSink};
use crate::shared::{HierarchyError, HierarchyResult};
use tokio::runtime::Handle;

/// HierarchySession - Core use case for browsing one job's hierarchy at a time
///
/// This use case orchestrates the job search workflow: the current tree is
/// parked in the session cache, the requested job is restored from the cache
/// or fetched and resolved, and subtrees are then loaded lazily through the
/// expansion coordinator.
///
/// # Type Parameters
/// * `G` - QueryGateway implementation
/// * `E` - TreeEventSink implementation
pub struct HierarchySession<G, E> {
    coordinator: ExpansionCoordinator<G, E>,
    cache: TreeStateCache,
    expand_all_max_depth: usize,
}

impl<G, E> HierarchySession<G, E>
where
    G: QueryGateway + 'static,
    E: TreeEventSink + 'static,
{
    /// Creates a new session with injected dependencies
    ///
    /// Fetches run on the Tokio runtime current at construction, if any.
    pub fn new(gateway: G, events: E, config: &HierarchyConfig) -> Self {
        Self::from_coordinator(
            ExpansionCoordinator::new(gateway, events, config.max_concurrent_fetches),
            config,
        )
    }

    /// Creates a session whose fetches run on `runtime`
    pub fn with_runtime(gateway: G, events: E, config: &HierarchyConfig, runtime: Handle) -> Self {
        Self::from_coordinator(
            ExpansionCoordinator::with_runtime(gateway, events, config.max_concurrent_fetches, runtime),
            config,
        )
    }

    fn from_coordinator(coordinator: ExpansionCoordinator<G, E>, config: &HierarchyConfig) -> Self {
        Self {
            coordinator,
            cache: TreeStateCache::with_capacity_limit(config.max_cached_jobs),
            expand_all_max_depth: config.expand_all_max_depth,
        }
    }

    /// Loads the hierarchy of a job and makes it the live tree
    ///
    /// A job visited earlier in the session is restored from the cache with
    /// its expansion state and no gateway call.
    ///
    /// # Errors
    /// * `Validation` for a malformed job number (the live tree is kept)
    /// * `Connection`, `Timeout`, `Query` when the job's rows cannot be
    ///   fetched; no tree is live afterwards and the load can be retried
    /// * `StaleResultDiscarded` when a newer load superseded this one
    pub async fn load_job(&self, job_number: &str) -> HierarchyResult<JobSummary> {
        let job_number = JobNumber::new(job_number)?;
        let generation = self.coordinator.begin_generation();

        if let Some(previous) = self.coordinator.replace_tree(None) {
            self.cache.save(previous.job_number(), &previous);
        }

        let (forest, from_cache) = match self.cache.restore(&job_number) {
            Some(mut forest) => {
                forest.set_generation(generation);
                (forest, true)
            }
            None => (self.fetch_forest(&job_number, generation).await?, false),
        };

        let summary = JobSummary::from_forest(&forest, from_cache);
        self.coordinator.install(forest)?;

        tracing::info!(
            job = %job_number,
            roots = summary.root_count,
            nodes = summary.node_count,
            unresolved = summary.unresolved_count,
            anomalies = summary.anomaly_count,
            from_cache,
            "job loaded"
        );
        self.coordinator
            .events()
            .job_loaded(&job_number, summary.root_count);

        Ok(summary)
    }

    /// Requests the children of a node of the live tree
    pub fn expand(&self, key: &WorkOrderKey) -> ExpansionHandle {
        self.coordinator.expand(key)
    }

    /// Expands every reachable assembly down to the configured depth
    pub async fn expand_all(&self) -> HierarchyResult<ExpandAllSummary> {
        self.coordinator.expand_all(self.expand_all_max_depth).await
    }

    /// Root views of the live tree, in display order
    pub fn roots(&self) -> HierarchyResult<Vec<TreeNodeView>> {
        self.coordinator
            .with_tree(TreeViewBuilder::build_roots)
            .ok_or(HierarchyError::NoActiveJob)
    }

    /// View of one node with its loaded subtree
    pub fn node(&self, key: &WorkOrderKey) -> HierarchyResult<TreeNodeView> {
        self.coordinator
            .with_tree(|forest| TreeViewBuilder::build_node(forest, key))
            .ok_or(HierarchyError::NoActiveJob)?
            .ok_or_else(|| HierarchyError::UnknownNode {
                key: key.to_string(),
            })
    }

    /// Rows of the live job that could not be linked to a parent
    pub fn unresolved(&self) -> HierarchyResult<Vec<UnresolvedRow>> {
        self.coordinator
            .with_tree(|forest| forest.unresolved().to_vec())
            .ok_or(HierarchyError::NoActiveJob)
    }

    pub fn anomalies(&self) -> HierarchyResult<Vec<Anomaly>> {
        self.coordinator
            .with_tree(|forest| forest.anomalies().to_vec())
            .ok_or(HierarchyError::NoActiveJob)
    }

    /// Nodes of the live tree whose part id or description contains `text`
    ///
    /// Only nodes already loaded are searched; nothing is fetched.
    pub fn search(&self, text: &str) -> HierarchyResult<Vec<WorkOrderKey>> {
        self.coordinator
            .with_tree(|forest| TreeViewBuilder::matching(forest, text))
            .ok_or(HierarchyError::NoActiveJob)
    }

    /// Unique part ids of the live tree, sorted
    pub fn part_ids(&self) -> HierarchyResult<Vec<String>> {
        self.coordinator
            .with_tree(Forest::part_ids)
            .ok_or(HierarchyError::NoActiveJob)
    }

    pub fn current_job(&self) -> Option<JobNumber> {
        self.coordinator
            .with_tree(|forest| forest.job_number().clone())
    }

    /// Forgets every visited job and the live tree
    ///
    /// Pending fetches complete against a superseded generation and are
    /// discarded.
    pub fn new_search(&self) {
        self.coordinator.begin_generation();
        self.coordinator.replace_tree(None);
        self.cache.clear();
        tracing::info!("session cleared for a new search");
    }

    pub fn cache(&self) -> &TreeStateCache {
        &self.cache
    }

    pub fn coordinator(&self) -> &ExpansionCoordinator<G, E> {
        &self.coordinator
    }

    async fn fetch_forest(&self, job_number: &JobNumber, generation: u64) -> HierarchyResult<Forest> {
        let gateway = self.coordinator.gateway();
        let rows = gateway.fetch_assemblies(job_number).await.map_err(|e| {
            tracing::warn!(job = %job_number, error = %e, "job load failed");
            e
        })?;
        tracing::debug!(job = %job_number, rows = rows.len(), "fetched job rows");

        let mut resolution = TreeResolver::resolve(job_number, rows);
        let parts = lookup_parts(gateway, &resolution.missing_part_ids()).await;
        resolution.parts.extend(parts);

        Ok(Forest::from_resolution(
            job_number.clone(),
            generation,
            resolution,
        ))
    }
}
