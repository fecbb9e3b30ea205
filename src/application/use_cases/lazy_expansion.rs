use crate::application::dto::{ExpandAllSummary, ExpandedNode};
use crate::application::use_cases::part_lookup::lookup_parts;
use crate::hierarchy::domain::{ChildState, Forest, Resolution, WorkOrderKey};
use crate::hierarchy::services::TreeResolver;
use crate::ports::outbound::{QueryGateway, TreeEventSink};
use crate::shared::{HierarchyError, HierarchyResult};
use dashmap::DashMap;
use futures::future::{self, BoxFuture, FutureExt, Shared};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::Semaphore;

pub type ExpansionOutcome = HierarchyResult<ExpandedNode>;

/// Pending result of an expansion
///
/// Cloneable; every clone resolves to the same outcome. Dropping a handle
/// never cancels the underlying fetch.
pub type ExpansionHandle = Shared<BoxFuture<'static, ExpansionOutcome>>;

struct PendingFetch {
    generation: u64,
    handle: ExpansionHandle,
}

struct CoordinatorState<G, E> {
    gateway: G,
    events: E,
    tree: Mutex<Option<Forest>>,
    in_flight: DashMap<WorkOrderKey, PendingFetch>,
    generation: AtomicU64,
    fetch_pool: Semaphore,
    runtime: Option<Handle>,
}

/// ExpansionCoordinator - lazy, de-duplicated loading of subtrees
///
/// Owns the live forest of the current job. Each node moves through
/// `NotLoaded -> Loading -> {Loaded, Failed}` and `Failed -> Loading` on
/// retry. At most one fetch per node key is in flight; later callers attach
/// to the pending handle.
///
/// Fetches run as Tokio tasks, at most `max_concurrent_fetches` at a time,
/// on the runtime captured at construction (or the caller's runtime when none
/// was captured), so `expand` may be called from a thread outside it. Every fetch is tagged with the generation of the tree it was started
/// for; a result whose generation is no longer live, or whose node is no
/// longer loading, is discarded without touching any tree.
///
/// The tree lock is never held across an await.
pub struct ExpansionCoordinator<G, E> {
    state: Arc<CoordinatorState<G, E>>,
}

impl<G, E> Clone for ExpansionCoordinator<G, E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<G, E> ExpansionCoordinator<G, E>
where
    G: QueryGateway + 'static,
    E: TreeEventSink + 'static,
{
    /// Creates a coordinator bound to the current Tokio runtime, if any
    pub fn new(gateway: G, events: E, max_concurrent_fetches: usize) -> Self {
        Self::build(gateway, events, max_concurrent_fetches, Handle::try_current().ok())
    }

    /// Creates a coordinator whose fetches run on `runtime`
    pub fn with_runtime(gateway: G, events: E, max_concurrent_fetches: usize, runtime: Handle) -> Self {
        Self::build(gateway, events, max_concurrent_fetches, Some(runtime))
    }

    fn build(gateway: G, events: E, max_concurrent_fetches: usize, runtime: Option<Handle>) -> Self {
        Self {
            state: Arc::new(CoordinatorState {
                gateway,
                events,
                tree: Mutex::new(None),
                in_flight: DashMap::new(),
                generation: AtomicU64::new(0),
                fetch_pool: Semaphore::new(max_concurrent_fetches.max(1)),
                runtime,
            }),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.state.gateway
    }

    pub fn events(&self) -> &E {
        &self.state.events
    }

    pub fn current_generation(&self) -> u64 {
        self.state.generation.load(Ordering::SeqCst)
    }

    /// Starts a new generation; results of every older one become stale
    pub fn begin_generation(&self) -> u64 {
        self.state.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Installs `forest` as the live tree if its generation is still current
    ///
    /// # Errors
    /// `StaleResultDiscarded` when a newer generation was started meanwhile
    pub fn install(&self, forest: Forest) -> HierarchyResult<()> {
        let mut tree = self.state.lock_tree();
        let current = self.current_generation();
        if forest.generation() != current {
            tracing::debug!(
                job = %forest.job_number(),
                generation = forest.generation(),
                current,
                "discarding superseded job load"
            );
            return Err(HierarchyError::StaleResultDiscarded {
                key: forest.job_number().to_string(),
                generation: forest.generation(),
            });
        }
        *tree = Some(forest);
        self.state.forget_other_generations(current);
        Ok(())
    }

    /// Swaps the live tree unconditionally, returning the previous one
    pub fn replace_tree(&self, forest: Option<Forest>) -> Option<Forest> {
        let mut tree = self.state.lock_tree();
        let previous = std::mem::replace(&mut *tree, forest);
        match tree.as_ref() {
            Some(live) => self.state.forget_other_generations(live.generation()),
            None => self.state.in_flight.clear(),
        }
        previous
    }

    /// Runs `read` against the live tree
    pub fn with_tree<R>(&self, read: impl FnOnce(&Forest) -> R) -> Option<R> {
        let tree = self.state.lock_tree();
        tree.as_ref().map(read)
    }

    pub fn in_flight_count(&self) -> usize {
        self.state.in_flight.len()
    }

    /// Requests the children of `key`
    ///
    /// Completes immediately for loaded nodes and leaves. For an unloaded or
    /// failed assembly a fetch is started; for a node already loading the
    /// caller attaches to the pending fetch.
    ///
    /// Completes with `NoRuntime`, leaving the node untouched, when the
    /// coordinator has no runtime and the caller is outside one.
    pub fn expand(&self, key: &WorkOrderKey) -> ExpansionHandle {
        let runtime = self.state.runtime();
        let mut tree = self.state.lock_tree();
        let Some(forest) = tree.as_mut() else {
            return ready(Err(HierarchyError::NoActiveJob));
        };
        let generation = forest.generation();
        let Some(entry) = forest.entry(key) else {
            return ready(Err(HierarchyError::UnknownNode {
                key: key.to_string(),
            }));
        };

        match entry.children() {
            ChildState::NoChildren => {
                return ready(Ok(ExpandedNode {
                    key: key.clone(),
                    children: Vec::new(),
                    generation,
                    fetched: false,
                }));
            }
            ChildState::Loaded(children) => {
                return ready(Ok(ExpandedNode {
                    key: key.clone(),
                    children: children.clone(),
                    generation,
                    fetched: false,
                }));
            }
            ChildState::Loading => {
                if let Some(handle) = self.state.pending_handle(key, generation) {
                    tracing::trace!(key = %key, "attaching to in-flight fetch");
                    return handle;
                }
                tracing::warn!(key = %key, "node is loading without a pending fetch; fetching again");
            }
            ChildState::NotLoaded | ChildState::Failed(_) => {}
        }

        let Some(runtime) = runtime else {
            tracing::warn!(key = %key, "no Tokio runtime to run the fetch on");
            return ready(Err(HierarchyError::NoRuntime));
        };
        let fetch_key = entry.node().fetch_key().clone();

        // The task cannot apply before the Loading mark: apply waits for the tree lock.
        let handle = self.spawn_fetch(&runtime, key.clone(), fetch_key, generation);
        if let Err(e) = forest.set_child_state(key, ChildState::Loading) {
            return ready(Err(e));
        }
        self.state.in_flight.insert(
            key.clone(),
            PendingFetch {
                generation,
                handle: handle.clone(),
            },
        );
        handle
    }

    /// Expands every reachable unloaded assembly down to `max_depth`
    ///
    /// Works level by level; siblings of a level are fetched concurrently.
    /// Each node is attempted once per call, so a node that fails stays in
    /// the error state instead of being retried in a loop. Stops early when
    /// the job is replaced.
    pub async fn expand_all(&self, max_depth: usize) -> HierarchyResult<ExpandAllSummary> {
        let generation = self
            .with_tree(Forest::generation)
            .ok_or(HierarchyError::NoActiveJob)?;
        let mut attempted: HashSet<WorkOrderKey> = HashSet::new();
        let mut summary = ExpandAllSummary::default();

        loop {
            let pending = self
                .with_tree(|forest| {
                    (forest.generation() == generation).then(|| forest.unloaded_within(max_depth))
                })
                .flatten();
            let Some(pending) = pending else {
                tracing::debug!(generation, "job replaced during expand-all; stopping");
                return Ok(summary);
            };

            let level: Vec<WorkOrderKey> = pending
                .into_iter()
                .filter(|key| attempted.insert(key.clone()))
                .collect();
            if level.is_empty() {
                break;
            }

            summary.levels += 1;
            let outcomes = future::join_all(level.iter().map(|key| self.expand(key))).await;
            for outcome in outcomes {
                match outcome {
                    Ok(expanded) if expanded.fetched => summary.expanded += 1,
                    Ok(_) => {}
                    Err(HierarchyError::StaleResultDiscarded { .. }) => return Ok(summary),
                    Err(_) => summary.failed += 1,
                }
            }
        }

        tracing::info!(
            expanded = summary.expanded,
            failed = summary.failed,
            levels = summary.levels,
            "expand-all finished"
        );
        Ok(summary)
    }

    fn spawn_fetch(
        &self,
        runtime: &Handle,
        key: WorkOrderKey,
        fetch_key: WorkOrderKey,
        generation: u64,
    ) -> ExpansionHandle {
        let state = Arc::clone(&self.state);
        let task_key = key.clone();
        let task = runtime.spawn(async move {
            let fetched = state.fetch_children(&fetch_key).await;
            state.apply(&task_key, generation, fetched)
        });

        let state = Arc::clone(&self.state);
        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(e) => state.apply(
                    &key,
                    generation,
                    Err(HierarchyError::query("fetch_children", e.to_string())),
                ),
            }
        }
        .boxed()
        .shared()
    }
}

impl<G, E> CoordinatorState<G, E>
where
    G: QueryGateway,
    E: TreeEventSink,
{
    fn runtime(&self) -> Option<Handle> {
        self.runtime.clone().or_else(|| Handle::try_current().ok())
    }

    fn lock_tree(&self) -> MutexGuard<'_, Option<Forest>> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pending_handle(&self, key: &WorkOrderKey, generation: u64) -> Option<ExpansionHandle> {
        self.in_flight
            .get(key)
            .filter(|pending| pending.generation == generation)
            .map(|pending| pending.handle.clone())
    }

    fn forget_other_generations(&self, generation: u64) {
        self.in_flight
            .retain(|_, pending| pending.generation == generation);
    }

    /// Part ids of a slice that the live tree knows nothing about
    fn unknown_parts(&self, part_ids: Vec<String>) -> Vec<String> {
        let tree = self.lock_tree();
        match tree.as_ref() {
            Some(forest) => part_ids
                .into_iter()
                .filter(|id| forest.part(id).is_none())
                .collect(),
            None => part_ids,
        }
    }

    async fn fetch_children(&self, fetch_key: &WorkOrderKey) -> HierarchyResult<Resolution> {
        let _permit = self
            .fetch_pool
            .acquire()
            .await
            .map_err(|_| HierarchyError::query("fetch_children", "fetch pool closed"))?;

        let rows = self.gateway.fetch_children(fetch_key).await?;
        let row_count = rows.len();
        let mut resolution = TreeResolver::resolve_children(fetch_key, rows);

        let missing = self.unknown_parts(resolution.missing_part_ids());
        let parts = lookup_parts(&self.gateway, &missing).await;
        resolution.parts.extend(parts);

        tracing::debug!(
            key = %fetch_key,
            rows = row_count,
            children = resolution.top.len(),
            "fetched child slice"
        );
        Ok(resolution)
    }

    /// Applies a finished fetch to the live tree, then notifies the sink
    fn apply(
        &self,
        key: &WorkOrderKey,
        generation: u64,
        fetched: HierarchyResult<Resolution>,
    ) -> ExpansionOutcome {
        let outcome = {
            let mut tree = self.lock_tree();
            self.in_flight
                .remove_if(key, |_, pending| pending.generation == generation);

            let live = match tree.as_mut() {
                Some(forest)
                    if forest.generation() == generation
                        && forest.child_state(key) == Some(&ChildState::Loading) =>
                {
                    forest
                }
                _ => {
                    tracing::debug!(key = %key, generation, "discarding stale fetch result");
                    return Err(HierarchyError::StaleResultDiscarded {
                        key: key.to_string(),
                        generation,
                    });
                }
            };

            match fetched {
                Ok(resolution) => {
                    let children = live.attach_children(key, resolution)?;
                    Ok(ExpandedNode {
                        key: key.clone(),
                        children,
                        generation,
                        fetched: true,
                    })
                }
                Err(e) => {
                    live.set_child_state(key, ChildState::Failed(e.reason()))?;
                    tracing::warn!(key = %key, error = %e.reason(), "child fetch failed; node left collapsed");
                    Err(e)
                }
            }
        };

        match &outcome {
            Ok(_) => self.events.node_expanded(key),
            Err(e) => self.events.node_load_failed(key, &e.reason()),
        }
        outcome
    }
}

fn ready(outcome: ExpansionOutcome) -> ExpansionHandle {
    future::ready(outcome).boxed().shared()
}
