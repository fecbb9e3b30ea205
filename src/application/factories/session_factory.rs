use crate::adapters::outbound::events::ChannelEventSink;
use crate::adapters::outbound::gateway::SerializedGateway;
use crate::application::use_cases::HierarchySession;
use crate::config::HierarchyConfig;
use crate::ports::outbound::{QueryGateway, TreeEvent, TreeEventSink};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedReceiver;

/// Factory for creating hierarchy sessions
///
/// This factory encapsulates how a driver-level gateway is wrapped before the
/// core sees it, following the Factory Pattern. It belongs in the application
/// layer as it orchestrates the selection of infrastructure adapters.
pub struct SessionFactory;

impl SessionFactory {
    /// Creates a session whose gateway calls are serialised, bounded and retried
    ///
    /// # Arguments
    /// * `gateway` - Driver-level gateway to the legacy data source
    /// * `events` - Sink receiving tree events
    /// * `config` - Timeouts, retries, pool size and cache bound
    pub fn create<G, E>(
        gateway: G,
        events: E,
        config: &HierarchyConfig,
    ) -> HierarchySession<SerializedGateway<G>, E>
    where
        G: QueryGateway + 'static,
        E: TreeEventSink + 'static,
    {
        HierarchySession::new(SerializedGateway::from_config(gateway, config), events, config)
    }

    /// Creates a session like [`SessionFactory::create`] whose fetches run on `runtime`
    ///
    /// For front ends whose interactive thread lives outside the runtime.
    pub fn create_on<G, E>(
        runtime: Handle,
        gateway: G,
        events: E,
        config: &HierarchyConfig,
    ) -> HierarchySession<SerializedGateway<G>, E>
    where
        G: QueryGateway + 'static,
        E: TreeEventSink + 'static,
    {
        HierarchySession::with_runtime(
            SerializedGateway::from_config(gateway, config),
            events,
            config,
            runtime,
        )
    }

    /// Creates a session that delivers its events over a channel
    ///
    /// # Returns
    /// The session and the receiver the UI task drains
    pub fn with_channel<G>(
        gateway: G,
        config: &HierarchyConfig,
    ) -> (
        HierarchySession<SerializedGateway<G>, ChannelEventSink>,
        UnboundedReceiver<TreeEvent>,
    )
    where
        G: QueryGateway + 'static,
    {
        let (events, receiver) = ChannelEventSink::channel();
        (Self::create(gateway, events, config), receiver)
    }
}
