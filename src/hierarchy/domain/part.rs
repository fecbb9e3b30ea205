use super::{SubId, WorkOrderKey};
use serde::{Deserialize, Serialize};

/// Part master reference data
///
/// Looked up by id, never owned by a tree node. Flags may change between
/// fetches during a long session, so nodes never copy them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: String,
    pub description: Option<String>,
    pub fabricated: bool,
    pub purchased: bool,
}

impl Part {
    pub fn new(id: impl Into<String>, description: Option<String>, fabricated: bool, purchased: bool) -> Self {
        Self {
            id: id.into(),
            description,
            fabricated,
            purchased,
        }
    }
}

/// A BOM link: how much of a part a parent work order consumes
///
/// When `subordinate_sub_id` is populated the requirement is fulfilled by a
/// child work order in the same lot, which makes the child an assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    pub parent_key: WorkOrderKey,
    pub part_id: Option<String>,
    pub qty_per: f64,
    pub fixed_qty: f64,
    pub scrap_percent: f64,
    pub subordinate_sub_id: Option<SubId>,
}

impl Requirement {
    pub fn new(parent_key: WorkOrderKey, part_id: Option<String>, qty_per: f64) -> Self {
        Self {
            parent_key,
            part_id,
            qty_per,
            fixed_qty: 0.0,
            scrap_percent: 0.0,
            subordinate_sub_id: None,
        }
    }

    pub fn with_subordinate(mut self, sub_id: impl AsRef<str>) -> Self {
        let sub_id = SubId::new(sub_id);
        self.subordinate_sub_id = if sub_id.is_empty() { None } else { Some(sub_id) };
        self
    }
}
