use super::{
    Anomaly, ChildState, JobNumber, NodeType, Part, Resolution, ResolvedNode, UnresolvedRow,
    WorkOrderKey, WorkOrderNode,
};
use crate::hierarchy::policies::NodeClassification;
use crate::shared::{HierarchyError, HierarchyResult};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// One arena slot: the immutable node plus its child list
#[derive(Debug, Clone, PartialEq)]
pub struct ForestEntry {
    node: WorkOrderNode,
    children: ChildState,
}

impl ForestEntry {
    pub fn node(&self) -> &WorkOrderNode {
        &self.node
    }

    pub fn children(&self) -> &ChildState {
        &self.children
    }
}

/// Forest aggregate holding the resolved hierarchy of one job
///
/// All nodes live in a flat map keyed by composite key; edges are key lists,
/// so there are no reference cycles. A key is admitted at most once, which
/// also keeps a malformed dataset from forming a cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    job_number: JobNumber,
    generation: u64,
    entries: HashMap<WorkOrderKey, ForestEntry>,
    roots: Vec<WorkOrderKey>,
    parts: HashMap<String, Part>,
    unresolved: Vec<UnresolvedRow>,
    anomalies: Vec<Anomaly>,
}

impl Forest {
    pub fn new(job_number: JobNumber, generation: u64) -> Self {
        Self {
            job_number,
            generation,
            entries: HashMap::new(),
            roots: Vec::new(),
            parts: HashMap::new(),
            unresolved: Vec::new(),
            anomalies: Vec::new(),
        }
    }

    /// Builds a forest from a root-level resolver pass
    pub fn from_resolution(job_number: JobNumber, generation: u64, resolution: Resolution) -> Self {
        let mut forest = Self::new(job_number, generation);
        let accepted = forest.absorb(resolution.nodes);
        forest.roots = resolution
            .top
            .into_iter()
            .filter(|key| accepted.contains(key))
            .collect();
        forest.merge_parts(resolution.parts);
        forest.unresolved.extend(resolution.unresolved);
        forest.anomalies.extend(resolution.anomalies);
        forest
    }

    pub fn job_number(&self) -> &JobNumber {
        &self.job_number
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    pub fn roots(&self) -> &[WorkOrderKey] {
        &self.roots
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &WorkOrderKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn entry(&self, key: &WorkOrderKey) -> Option<&ForestEntry> {
        self.entries.get(key)
    }

    pub fn node(&self, key: &WorkOrderKey) -> Option<&WorkOrderNode> {
        self.entries.get(key).map(|e| &e.node)
    }

    pub fn child_state(&self, key: &WorkOrderKey) -> Option<&ChildState> {
        self.entries.get(key).map(|e| &e.children)
    }

    pub fn part(&self, part_id: &str) -> Option<&Part> {
        self.parts.get(part_id)
    }

    /// Unique part ids of the nodes in the tree, sorted
    pub fn part_ids(&self) -> Vec<String> {
        let ids: BTreeSet<&str> = self
            .entries
            .values()
            .filter_map(|entry| entry.node.part_id())
            .collect();
        ids.into_iter().map(str::to_string).collect()
    }

    /// Keys reachable through loaded edges, depth first in display order
    pub fn display_order(&self) -> Vec<&WorkOrderKey> {
        let mut stack: Vec<&WorkOrderKey> = self.roots.iter().rev().collect();
        let mut seen: HashSet<&WorkOrderKey> = HashSet::new();
        let mut ordered = Vec::with_capacity(self.entries.len());

        while let Some(key) = stack.pop() {
            if !seen.insert(key) {
                continue;
            }
            let Some(entry) = self.entries.get(key) else {
                continue;
            };
            ordered.push(key);
            stack.extend(entry.children.loaded_children().iter().rev());
        }
        ordered
    }

    pub fn unresolved(&self) -> &[UnresolvedRow] {
        &self.unresolved
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    /// Replaces part reference data; the latest lookup wins
    pub fn merge_parts(&mut self, parts: impl IntoIterator<Item = Part>) {
        for part in parts {
            self.parts.insert(part.id.clone(), part);
        }
    }

    /// Derives the display category from current part flags and structure
    pub fn node_type(&self, key: &WorkOrderKey) -> Option<NodeType> {
        let entry = self.entries.get(key)?;
        let has_children = entry.children.has_children();
        let (fabricated, purchased) = entry
            .node
            .part_id()
            .and_then(|id| self.parts.get(id))
            .map(|part| (part.fabricated, part.purchased))
            .unwrap_or((false, false));
        Some(NodeClassification::classify(fabricated, purchased, has_children))
    }

    pub fn set_child_state(&mut self, key: &WorkOrderKey, state: ChildState) -> HierarchyResult<()> {
        let entry = self
            .entries
            .get_mut(key)
            .ok_or_else(|| HierarchyError::UnknownNode {
                key: key.to_string(),
            })?;
        entry.children = state;
        Ok(())
    }

    /// Attaches a fetched child slice under `parent` and marks it loaded
    ///
    /// # Returns
    /// The keys that were attached, in display order
    pub fn attach_children(
        &mut self,
        parent: &WorkOrderKey,
        resolution: Resolution,
    ) -> HierarchyResult<Vec<WorkOrderKey>> {
        if !self.entries.contains_key(parent) {
            return Err(HierarchyError::UnknownNode {
                key: parent.to_string(),
            });
        }

        let accepted = self.absorb(resolution.nodes);
        let children: Vec<WorkOrderKey> = resolution
            .top
            .into_iter()
            .filter(|key| accepted.contains(key))
            .collect();

        self.set_child_state(parent, ChildState::Loaded(children.clone()))?;
        self.merge_parts(resolution.parts);
        self.unresolved.extend(resolution.unresolved);
        self.anomalies.extend(resolution.anomalies);
        Ok(children)
    }

    /// Turns every in-flight node back into an unloaded one
    ///
    /// Used when snapshotting: the pending fetches belong to a generation that
    /// is about to be superseded and their results will be discarded.
    pub fn settle_in_flight(&mut self) {
        for entry in self.entries.values_mut() {
            if entry.children == ChildState::Loading {
                entry.children = ChildState::NotLoaded;
            }
        }
    }

    /// Keys of unloaded assemblies reachable through loaded edges, shallowest first
    ///
    /// Roots are depth 0; only nodes above `max_depth` are returned.
    pub fn unloaded_within(&self, max_depth: usize) -> Vec<WorkOrderKey> {
        let mut queue: VecDeque<(&WorkOrderKey, usize)> =
            self.roots.iter().map(|key| (key, 0)).collect();
        let mut seen: HashSet<&WorkOrderKey> = HashSet::new();
        let mut pending = Vec::new();

        while let Some((key, depth)) = queue.pop_front() {
            if depth >= max_depth || !seen.insert(key) {
                continue;
            }
            let Some(entry) = self.entries.get(key) else {
                continue;
            };
            if entry.children.needs_fetch() {
                pending.push(key.clone());
            }
            for child in entry.children.loaded_children() {
                queue.push_back((child, depth + 1));
            }
        }

        pending
    }

    /// Inserts nodes, keeping the first occurrence of every key
    fn absorb(&mut self, nodes: Vec<ResolvedNode>) -> HashSet<WorkOrderKey> {
        let mut accepted = HashSet::new();
        for resolved in nodes {
            let key = resolved.node.key().clone();
            if self.entries.contains_key(&key) {
                tracing::warn!(job = %self.job_number, key = %key, "duplicate work order key; keeping first occurrence");
                self.anomalies.push(Anomaly::DuplicateKey(key));
                continue;
            }
            accepted.insert(key.clone());
            self.entries.insert(
                key,
                ForestEntry {
                    node: resolved.node,
                    children: resolved.children,
                },
            );
        }
        accepted
    }
}
