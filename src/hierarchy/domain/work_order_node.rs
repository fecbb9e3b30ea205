use super::{Part, Requirement, SubId, WorkOrderKey};

/// One flat row as returned by the query gateway
///
/// Rows come from WORK_ORDER (optionally joined to PART) and, for child
/// slices, from REQUIREMENT joined to the subordinate work order. The
/// requirement link is present only when the row was reached through a BOM line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LegacyRow {
    pub base_id: String,
    pub lot_id: String,
    pub sub_id: String,
    pub part_id: Option<String>,
    pub description: Option<String>,
    pub drawing_id: Option<String>,
    pub status: Option<String>,
    pub desired_qty: Option<f64>,
    /// PART.FABRICATED / PART.PURCHASED when the query joined them
    pub part_flags: Option<(bool, bool)>,
    pub requirement: Option<Requirement>,
}

impl LegacyRow {
    pub fn new(base_id: impl Into<String>, lot_id: impl Into<String>, sub_id: impl Into<String>) -> Self {
        Self {
            base_id: base_id.into(),
            lot_id: lot_id.into(),
            sub_id: sub_id.into(),
            ..Self::default()
        }
    }

    pub fn with_part(mut self, part_id: impl Into<String>) -> Self {
        self.part_id = Some(part_id.into());
        self
    }

    pub fn with_part_flags(mut self, fabricated: bool, purchased: bool) -> Self {
        self.part_flags = Some((fabricated, purchased));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_desired_qty(mut self, qty: f64) -> Self {
        self.desired_qty = Some(qty);
        self
    }

    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirement = Some(requirement);
        self
    }

    pub fn key(&self) -> WorkOrderKey {
        WorkOrderKey::new(&self.base_id, &self.lot_id, &self.sub_id)
    }

    /// Trimmed part id, treating blank values as absent
    pub fn part_id(&self) -> Option<&str> {
        self.part_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn is_part_bearing(&self) -> bool {
        self.part_id().is_some()
    }

    pub fn subordinate_sub_id(&self) -> Option<&SubId> {
        self.requirement
            .as_ref()
            .and_then(|r| r.subordinate_sub_id.as_ref())
    }

    /// Part reference data carried on the row, if the query joined it
    pub fn joined_part(&self) -> Option<Part> {
        let part_id = self.part_id()?;
        let (fabricated, purchased) = self.part_flags?;
        Some(Part::new(part_id, self.description.clone(), fabricated, purchased))
    }
}

/// Quantities shown next to a node
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Quantities {
    pub desired_qty: f64,
    pub qty_per: f64,
    pub fixed_qty: f64,
    pub scrap_percent: f64,
}

/// One resolved tree entry
///
/// Immutable after construction; children live in the forest arena.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkOrderNode {
    key: WorkOrderKey,
    part_id: Option<String>,
    description: Option<String>,
    drawing_id: Option<String>,
    quantities: Quantities,
    status: Option<String>,
    subordinate_key: Option<WorkOrderKey>,
}

impl WorkOrderNode {
    pub fn from_row(row: &LegacyRow) -> Self {
        let key = row.key();
        let requirement = row.requirement.as_ref();
        let quantities = Quantities {
            desired_qty: row.desired_qty.unwrap_or_default(),
            qty_per: requirement.map(|r| r.qty_per).unwrap_or_default(),
            fixed_qty: requirement.map(|r| r.fixed_qty).unwrap_or_default(),
            scrap_percent: requirement.map(|r| r.scrap_percent).unwrap_or_default(),
        };
        let subordinate_key = row.subordinate_sub_id().map(|sub_id| key.with_sub_id(sub_id));

        Self {
            key,
            part_id: row.part_id().map(str::to_string),
            description: row.description.clone(),
            drawing_id: row.drawing_id.clone(),
            quantities,
            status: row.status.clone(),
            subordinate_key,
        }
    }

    pub fn key(&self) -> &WorkOrderKey {
        &self.key
    }

    pub fn part_id(&self) -> Option<&str> {
        self.part_id.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn drawing_id(&self) -> Option<&str> {
        self.drawing_id.as_deref()
    }

    pub fn quantities(&self) -> &Quantities {
        &self.quantities
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Whether this node points at a sub-assembly to be expanded lazily
    pub fn is_assembly_pointer(&self) -> bool {
        self.subordinate_key.is_some()
    }

    /// Key passed to `fetch_children` when this node is expanded
    pub fn fetch_key(&self) -> &WorkOrderKey {
        self.subordinate_key.as_ref().unwrap_or(&self.key)
    }

    /// `[C]` for closed orders, otherwise the first letter of the status
    pub fn status_prefix(&self) -> String {
        match self.status.as_deref().map(str::trim) {
            Some(status) if status.eq_ignore_ascii_case("closed") => "[C]".to_string(),
            Some(status) if !status.is_empty() => {
                let first = status.chars().next().map(|c| c.to_ascii_uppercase()).unwrap_or('?');
                format!("[{}]", first)
            }
            _ => "[?]".to_string(),
        }
    }

    pub fn label(&self) -> String {
        let key_label = self.fetch_key().label();
        match self.part_id() {
            Some(part_id) => format!("{} {} - {}", self.status_prefix(), key_label, part_id),
            None => format!("{} {}", self.status_prefix(), key_label),
        }
    }
}
