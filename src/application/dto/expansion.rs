use crate::hierarchy::domain::WorkOrderKey;

/// Outcome of one successful expansion
///
/// `children` is the complete batch attached under `key`, in display order.
/// An empty batch means the node was fetched and has no children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedNode {
    pub key: WorkOrderKey,
    pub children: Vec<WorkOrderKey>,
    /// Generation of the tree the batch was attached to
    pub generation: u64,
    /// Whether a gateway fetch was needed
    pub fetched: bool,
}

/// Totals reported by an expand-all pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandAllSummary {
    /// Nodes that were fetched and attached
    pub expanded: usize,
    /// Nodes left in the error state
    pub failed: usize,
    /// Number of breadth-first levels visited
    pub levels: usize,
}
