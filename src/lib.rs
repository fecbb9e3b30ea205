//! wo-hierarchy - Work-order / BOM hierarchy resolver for legacy manufacturing data
//!
//! This library turns flat, composite-key-indexed WORK_ORDER rows into a
//! navigable assembly tree, classifies each node's manufacturing role, and
//! loads large subtrees lazily without blocking the interactive thread,
//! following hexagonal architecture and Domain-Driven Design principles.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`hierarchy`): Pure resolution and classification logic
//! - **Application Layer** (`application`): Session, lazy expansion and cache
//! - **Ports** (`ports`): Interface definitions for the data source and UI events
//! - **Adapters** (`adapters`): Gateway decorator and event sinks
//! - **Shared** (`shared`): Common error and result types
//!
//! # Example
//!
//! ```no_run
//! use wo_hierarchy::prelude::*;
//!
//! # async fn run<G: QueryGateway + 'static>(driver: G) -> HierarchyResult<()> {
//! let config = HierarchyConfig::default();
//! let (session, mut events) = SessionFactory::with_channel(driver, &config);
//!
//! let summary = session.load_job("8113").await?;
//! println!("{} assemblies", summary.root_count);
//!
//! for root in session.roots()? {
//!     for child in &root.children {
//!         if child.expansion_state == ExpansionState::Unloaded {
//!             let _ = session.expand(&child.key).await;
//!         }
//!     }
//! }
//! while let Ok(event) = events.try_recv() {
//!     println!("{:?}", event);
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod config;
pub mod hierarchy;
pub mod logging;
pub mod ports;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::events::{ChannelEventSink, TracingEventSink};
    pub use crate::adapters::outbound::gateway::SerializedGateway;
    pub use crate::application::dto::{ExpandAllSummary, ExpandedNode, JobSummary};
    pub use crate::application::factories::SessionFactory;
    pub use crate::application::read_models::{ExpansionState, TreeNodeView, TreeViewBuilder};
    pub use crate::application::state::TreeStateCache;
    pub use crate::application::use_cases::{
        ExpansionCoordinator, ExpansionHandle, ExpansionOutcome, HierarchySession,
    };
    pub use crate::config::HierarchyConfig;
    pub use crate::hierarchy::domain::{
        Anomaly, ChildState, Forest, JobNumber, LegacyRow, NodeType, Part, Requirement, SubId,
        UnresolvedRow, WorkOrderKey, WorkOrderNode,
    };
    pub use crate::hierarchy::policies::{DisplayColor, NodeClassification};
    pub use crate::hierarchy::services::TreeResolver;
    pub use crate::ports::outbound::{QueryGateway, TreeEvent, TreeEventSink};
    pub use crate::shared::{HierarchyError, HierarchyResult};
}
