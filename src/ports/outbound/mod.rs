/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the hierarchy core uses
/// to reach the legacy data source and the presentation layer.
pub mod query_gateway;
pub mod tree_event_sink;

pub use query_gateway::QueryGateway;
pub use tree_event_sink::{TreeEvent, TreeEventSink};
