//! Builder for constructing TreeNodeView from the forest arena

use super::tree_node_view::{ExpansionState, TreeNodeView};
use crate::hierarchy::domain::{Forest, WorkOrderKey, WorkOrderNode};

/// Builder that walks loaded edges of a forest and produces view models
///
/// Node types are derived here on every build, so a part whose flags changed
/// since the last fetch is shown with its current category.
pub struct TreeViewBuilder;

impl TreeViewBuilder {
    /// Builds views for every root, in display order
    pub fn build_roots(forest: &Forest) -> Vec<TreeNodeView> {
        forest
            .roots()
            .iter()
            .filter_map(|key| Self::build_node(forest, key))
            .collect()
    }

    /// Builds the view of one node and its loaded subtree
    ///
    /// # Returns
    /// None when the key is not part of the forest
    pub fn build_node(forest: &Forest, key: &WorkOrderKey) -> Option<TreeNodeView> {
        let entry = forest.entry(key)?;
        let node = entry.node();
        let node_type = forest.node_type(key)?;
        let description = Self::description(forest, node).map(str::to_string);

        Some(TreeNodeView {
            key: key.clone(),
            label: node.label(),
            description,
            part_id: node.part_id().map(str::to_string),
            drawing_id: node.drawing_id().map(str::to_string),
            desired_qty: node.quantities().desired_qty,
            qty_per: node.quantities().qty_per,
            node_type,
            expansion_state: ExpansionState::from(entry.children()),
            children: Self::build_children(forest, key),
        })
    }

    /// Keys of displayed nodes whose part id or description contains `text`
    ///
    /// Matching ignores case; keys come back in display order. A blank
    /// `text` matches every displayed node.
    pub fn matching(forest: &Forest, text: &str) -> Vec<WorkOrderKey> {
        let needle = text.trim().to_lowercase();
        forest
            .display_order()
            .into_iter()
            .filter(|key| needle.is_empty() || Self::matches(forest, key, &needle))
            .cloned()
            .collect()
    }

    fn matches(forest: &Forest, key: &WorkOrderKey, needle: &str) -> bool {
        let Some(node) = forest.node(key) else {
            return false;
        };
        [node.part_id(), Self::description(forest, node)]
            .into_iter()
            .flatten()
            .any(|text| text.to_lowercase().contains(needle))
    }

    /// Row description, falling back to the part master's
    fn description<'a>(forest: &'a Forest, node: &'a WorkOrderNode) -> Option<&'a str> {
        node.description().or_else(|| {
            node.part_id()
                .and_then(|id| forest.part(id))
                .and_then(|part| part.description.as_deref())
        })
    }

    /// Builds views for the loaded children of a node
    pub fn build_children(forest: &Forest, key: &WorkOrderKey) -> Vec<TreeNodeView> {
        forest
            .child_state(key)
            .map(|state| {
                state
                    .loaded_children()
                    .iter()
                    .filter_map(|child| Self::build_node(forest, child))
                    .collect()
            })
            .unwrap_or_default()
    }
}
