/// Type alias for Result with anyhow::Error as the error type.
/// Used by configuration loading and other ambient plumbing.
pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Result of any operation that touches the hierarchy or the query gateway.
pub type HierarchyResult<T> = std::result::Result<T, super::HierarchyError>;
