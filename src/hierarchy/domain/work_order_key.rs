use super::SubId;
use crate::shared::{HierarchyError, HierarchyResult};
use serde::Serialize;

/// Maximum length of a job number (width of the legacy BASE_ID column)
const MAX_JOB_NUMBER_LENGTH: usize = 30;

/// NewType wrapper for a customer order / job number with validation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobNumber(String);

impl JobNumber {
    pub fn new(raw: &str) -> HierarchyResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(HierarchyError::validation("Job number cannot be empty"));
        }

        if trimmed.chars().count() > MAX_JOB_NUMBER_LENGTH {
            return Err(HierarchyError::validation(format!(
                "Job number cannot exceed {} characters",
                MAX_JOB_NUMBER_LENGTH
            )));
        }

        if trimmed.chars().any(char::is_control) {
            return Err(HierarchyError::validation(
                "Job number contains control characters",
            ));
        }

        Ok(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Composite identity (BASE_ID, LOT_ID, SUB_ID) of one legacy WORK_ORDER row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderKey {
    base_id: String,
    lot_id: String,
    sub_id: SubId,
}

impl WorkOrderKey {
    pub fn new(base_id: impl AsRef<str>, lot_id: impl AsRef<str>, sub_id: impl AsRef<str>) -> Self {
        Self {
            base_id: base_id.as_ref().trim().to_string(),
            lot_id: lot_id.as_ref().trim().to_string(),
            sub_id: SubId::new(sub_id),
        }
    }

    pub fn base_id(&self) -> &str {
        &self.base_id
    }

    pub fn lot_id(&self) -> &str {
        &self.lot_id
    }

    pub fn sub_id(&self) -> &SubId {
        &self.sub_id
    }

    /// Key of a sibling row in the same lot
    pub fn with_sub_id(&self, sub_id: &SubId) -> Self {
        Self {
            base_id: self.base_id.clone(),
            lot_id: self.lot_id.clone(),
            sub_id: sub_id.clone(),
        }
    }

    /// Label as the legacy screens print it: `BASE/LOT` or `BASE-SUB/LOT`
    pub fn label(&self) -> String {
        if self.sub_id.is_empty() || self.sub_id.as_str() == "0" {
            format!("{}/{}", self.base_id, self.lot_id)
        } else {
            format!("{}-{}/{}", self.base_id, self.sub_id, self.lot_id)
        }
    }
}

impl std::fmt::Display for WorkOrderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
