/// Ports module defining interfaces for hexagonal architecture
///
/// Only outbound (driven) ports exist: the core is an in-process library
/// and its inbound surface is the `HierarchySession` use case itself.
pub mod outbound;
