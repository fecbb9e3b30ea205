/// Data Transfer Objects for application layer
///
/// DTOs are used to transfer data between the application layer
/// and adapters, keeping the domain layer isolated.
mod expansion;
mod job_summary;

pub use expansion::{ExpandAllSummary, ExpandedNode};
pub use job_summary::JobSummary;
