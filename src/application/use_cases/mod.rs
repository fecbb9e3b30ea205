/// Use cases module containing application business logic orchestration
mod hierarchy_session;
mod lazy_expansion;
mod part_lookup;

pub use hierarchy_session::HierarchySession;
pub use lazy_expansion::{ExpansionCoordinator, ExpansionHandle, ExpansionOutcome};
