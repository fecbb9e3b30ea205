use thiserror::Error;

/// Errors raised while loading or expanding a work-order hierarchy.
///
/// Uses thiserror to derive Display and Error. The enum is `Clone` because
/// a single in-flight fetch hands its outcome to every caller attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    /// Malformed job number or node key supplied by the caller
    #[error("Invalid input: {message}\n\n💡 Hint: Check the job number and try the search again")]
    Validation { message: String },

    #[error("Connection to the legacy data source failed: {details}\n\n💡 Hint: Check the network connection and retry")]
    Connection { details: String },

    #[error("Query timed out after {seconds}s: {operation}\n\n💡 Hint: The data source may be busy, retry in a moment")]
    Timeout { operation: String, seconds: u64 },

    /// The data source answered with rows of an unexpected shape
    #[error("Unexpected result from {operation}: {details}")]
    Query { operation: String, details: String },

    /// A fetch completed after its job or node was superseded. Never shown to the user.
    #[error("Result for {key} discarded: generation {generation} is no longer current")]
    StaleResultDiscarded { key: String, generation: u64 },

    #[error("No job is loaded\n\n💡 Hint: Search for a job number first")]
    NoActiveJob,

    #[error("Node {key} is not part of the loaded job")]
    UnknownNode { key: String },

    /// An expansion was requested with no Tokio runtime to run its fetch on
    #[error("No async runtime is available to fetch children\n\n💡 Hint: Create the session inside a Tokio runtime or pass it a runtime handle")]
    NoRuntime,
}

impl HierarchyError {
    pub fn validation(message: impl Into<String>) -> Self {
        HierarchyError::Validation {
            message: message.into(),
        }
    }

    pub fn query(operation: impl Into<String>, details: impl Into<String>) -> Self {
        HierarchyError::Query {
            operation: operation.into(),
            details: details.into(),
        }
    }

    /// Whether offering the user a retry makes sense
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            HierarchyError::Connection { .. } | HierarchyError::Timeout { .. }
        )
    }

    /// Whether the error should ever reach the presentation layer
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, HierarchyError::StaleResultDiscarded { .. })
    }

    /// Short reason suitable for a node-level retry affordance
    pub fn reason(&self) -> String {
        match self {
            HierarchyError::Validation { message } => message.clone(),
            HierarchyError::Connection { details } => format!("connection error: {}", details),
            HierarchyError::Timeout { seconds, .. } => format!("timed out after {}s", seconds),
            HierarchyError::Query { details, .. } => format!("query error: {}", details),
            HierarchyError::StaleResultDiscarded { .. } => "superseded".to_string(),
            HierarchyError::NoActiveJob => "no job loaded".to_string(),
            HierarchyError::UnknownNode { key } => format!("unknown node {}", key),
            HierarchyError::NoRuntime => "no async runtime".to_string(),
        }
    }
}
