use crate::ports::outbound::{TreeEvent, TreeEventSink};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// ChannelEventSink adapter for handing tree events back to the UI task
///
/// Background fetches publish from worker threads; the UI drains the
/// receiver on its own task. Sending never blocks. Events published after
/// the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    sender: UnboundedSender<TreeEvent>,
}

impl ChannelEventSink {
    /// Creates a sink together with the receiving end of its channel
    pub fn channel() -> (Self, UnboundedReceiver<TreeEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl TreeEventSink for ChannelEventSink {
    fn publish(&self, event: TreeEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!("tree event receiver dropped; event discarded");
        }
    }
}
