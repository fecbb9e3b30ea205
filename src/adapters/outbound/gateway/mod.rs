/// Gateway adapters wrapping the legacy data source driver
mod serialized_gateway;

pub use serialized_gateway::SerializedGateway;
