pub mod error;
pub mod result;

pub use error::HierarchyError;
pub use result::{HierarchyResult, Result};
