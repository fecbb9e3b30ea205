/// Mock implementations for testing
mod mock_query_gateway;
mod recording_event_sink;

#[allow(unused_imports)]
pub use mock_query_gateway::MockQueryGateway;
#[allow(unused_imports)]
pub use recording_event_sink::RecordingEventSink;
