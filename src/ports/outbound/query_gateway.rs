use crate::hierarchy::domain::{JobNumber, LegacyRow, Part, WorkOrderKey};
use crate::shared::HierarchyResult;
use async_trait::async_trait;

/// QueryGateway port for read-only access to the legacy data source
///
/// This port abstracts the network call, SQL text and driver used to fetch
/// rows. The core only consumes the flat rows it returns.
///
/// # Async Support
/// All methods are async so fetches never block the interactive thread.
/// Implementations must be `Send + Sync`; the core calls them from spawned
/// background tasks.
///
/// # Errors
/// Every call fails with one of `HierarchyError::Connection`,
/// `HierarchyError::Timeout` or `HierarchyError::Query` (unexpected row shape).
#[async_trait]
pub trait QueryGateway: Send + Sync {
    /// Fetches all WORK_ORDER rows of a job
    ///
    /// Rows may include lot header rows with no part id, and may carry the
    /// BOM requirement that links a sub work order to its parent.
    async fn fetch_assemblies(&self, job_number: &JobNumber) -> HierarchyResult<Vec<LegacyRow>>;

    /// Fetches the requirement / child rows of one node
    ///
    /// Each returned row must have a key that is unique within the job; for
    /// plain requirement lines the gateway derives one from the parent SUB_ID
    /// and the piece number.
    async fn fetch_children(&self, key: &WorkOrderKey) -> HierarchyResult<Vec<LegacyRow>>;

    /// Looks up part master data
    async fn fetch_part(&self, part_id: &str) -> HierarchyResult<Part>;
}

#[async_trait]
impl<G: QueryGateway + ?Sized> QueryGateway for std::sync::Arc<G> {
    async fn fetch_assemblies(&self, job_number: &JobNumber) -> HierarchyResult<Vec<LegacyRow>> {
        (**self).fetch_assemblies(job_number).await
    }

    async fn fetch_children(&self, key: &WorkOrderKey) -> HierarchyResult<Vec<LegacyRow>> {
        (**self).fetch_children(key).await
    }

    async fn fetch_part(&self, part_id: &str) -> HierarchyResult<Part> {
        (**self).fetch_part(part_id).await
    }
}
