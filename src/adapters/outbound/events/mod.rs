/// Event sink adapters delivering tree events to the presentation layer
mod channel_event_sink;
mod tracing_event_sink;

pub use channel_event_sink::ChannelEventSink;
pub use tracing_event_sink::TracingEventSink;
