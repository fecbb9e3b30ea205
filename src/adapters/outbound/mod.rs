/// Outbound adapters - Infrastructure implementations of outbound ports
pub mod events;
pub mod gateway;
