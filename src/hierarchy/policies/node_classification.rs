use crate::hierarchy::domain::NodeType;

/// Row colour used by the legacy tree view for each category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayColor {
    Blue,
    Red,
    Black,
}

/// NodeClassification policy for deriving a node's manufacturing role
///
/// Ordered rule, first match wins:
/// 1. fabricated, not purchased, has children → ASSEMBLY
/// 2. fabricated, not purchased, no children → MANUFACTURED
/// 3. purchased → PURCHASED
/// 4. otherwise → UNKNOWN
///
/// A purchased part is shown as bought-in even when it is also flagged
/// fabricated. Presentation only: has no effect on ordering or structure.
pub struct NodeClassification;

impl NodeClassification {
    pub fn classify(fabricated: bool, purchased: bool, has_children: bool) -> NodeType {
        match (fabricated, purchased, has_children) {
            (true, false, true) => NodeType::Assembly,
            (true, false, false) => NodeType::Manufactured,
            (_, true, _) => NodeType::Purchased,
            _ => NodeType::Unknown,
        }
    }

    pub fn display_color(node_type: NodeType) -> DisplayColor {
        match node_type {
            NodeType::Assembly => DisplayColor::Blue,
            NodeType::Purchased => DisplayColor::Red,
            NodeType::Manufactured | NodeType::Unknown => DisplayColor::Black,
        }
    }
}
