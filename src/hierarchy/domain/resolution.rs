use super::{ChildState, LegacyRow, Part, WorkOrderKey, WorkOrderNode};

/// A data anomaly found while resolving rows. Logged, kept, never fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum Anomaly {
    /// A second row with an already-seen key; the first occurrence was kept
    DuplicateKey(WorkOrderKey),
    /// A lot whose rows carry no part id, so no root could be anchored
    LotWithoutAnchor { base_id: String, lot_id: String },
}

impl std::fmt::Display for Anomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Anomaly::DuplicateKey(key) => write!(f, "duplicate key {}", key),
            Anomaly::LotWithoutAnchor { base_id, lot_id } => {
                write!(f, "lot {}/{} has no part-bearing row", base_id, lot_id)
            }
        }
    }
}

/// A row that could not be linked to any known parent
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedRow {
    pub row: LegacyRow,
    pub reason: String,
}

/// A node produced by the resolver together with its initial child state
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNode {
    pub node: WorkOrderNode,
    pub children: ChildState,
}

/// Output of one resolver pass, ready to be installed into or attached to a forest
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Top-level keys of this pass, in display order (roots, or the children of one node)
    pub top: Vec<WorkOrderKey>,
    pub nodes: Vec<ResolvedNode>,
    pub parts: Vec<Part>,
    pub unresolved: Vec<UnresolvedRow>,
    pub anomalies: Vec<Anomaly>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.top.is_empty()
    }

    /// Part ids referenced by nodes that did not come with joined part data
    pub fn missing_part_ids(&self) -> Vec<String> {
        let mut missing: Vec<String> = self
            .nodes
            .iter()
            .filter_map(|n| n.node.part_id())
            .filter(|id| !self.parts.iter().any(|p| p.id == *id))
            .map(str::to_string)
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }
}
