//! Read models for the presentation layer
//!
//! Query-optimized, serialisable views built from the forest arena.

pub mod tree_node_view;
pub mod tree_view_builder;

pub use tree_node_view::{ExpansionState, TreeNodeView};
pub use tree_view_builder::TreeViewBuilder;
