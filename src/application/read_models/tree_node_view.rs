//! Tree node view model consumed by the UI

use crate::hierarchy::domain::{ChildState, NodeType, WorkOrderKey};
use serde::Serialize;

/// Expansion state shown next to a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpansionState {
    /// No children exist
    Leaf,
    /// Children exist but have not been fetched
    Unloaded,
    Loading,
    Loaded,
    /// The last fetch failed; the node stays collapsed and can be retried
    Error { reason: String },
}

impl From<&ChildState> for ExpansionState {
    fn from(state: &ChildState) -> Self {
        match state {
            ChildState::NoChildren => ExpansionState::Leaf,
            ChildState::NotLoaded => ExpansionState::Unloaded,
            ChildState::Loading => ExpansionState::Loading,
            ChildState::Loaded(_) => ExpansionState::Loaded,
            ChildState::Failed(reason) => ExpansionState::Error {
                reason: reason.clone(),
            },
        }
    }
}

/// View representation of one tree node with its loaded children
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNodeView {
    pub key: WorkOrderKey,
    pub label: String,
    pub description: Option<String>,
    pub part_id: Option<String>,
    pub drawing_id: Option<String>,
    pub desired_qty: f64,
    pub qty_per: f64,
    pub node_type: NodeType,
    pub expansion_state: ExpansionState,
    /// Loaded children only; empty for every other state
    pub children: Vec<TreeNodeView>,
}

impl TreeNodeView {
    /// Number of nodes in this view, itself included
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNodeView::node_count).sum::<usize>()
    }
}
