use std::fmt;
use std::sync::Arc;

use async_channel::{Receiver, Sender, unbounded};
use log::warn;

use crate::{LocationDelegate, LocationEvent};

/// Delegate that queues events into a channel.
///
/// The receiving half is drained on whichever thread the consumer chooses,
/// which makes it the natural hop from platform callback threads to a UI
/// thread.
pub struct ChannelDelegate {
    sender: Sender<LocationEvent>,
}

impl fmt::Debug for ChannelDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelDelegate")
            .field("queued", &self.sender.len())
            .finish()
    }
}

impl LocationDelegate for ChannelDelegate {
    fn on_event(&self, event: LocationEvent) {
        if let Err(err) = self.sender.try_send(event) {
            warn!("dropping location event: {err}");
        }
    }
}

/// Create a channel-backed delegate and the receiver for its events.
#[must_use]
pub fn channel() -> (Arc<ChannelDelegate>, Receiver<LocationEvent>) {
    let (sender, receiver) = unbounded();
    (Arc::new(ChannelDelegate { sender }), receiver)
}
