//! In-process fan-out of subscription events.
//!
//! Publishing never blocks or fails the caller. Slow subscribers lose the
//! oldest events once the channel buffer fills.

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::application::ports::subscription_events::{
    SubscriptionEvent, SubscriptionEventPublisher,
};

const CHANNEL_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct BroadcastEventBus {
    sender: broadcast::Sender<SubscriptionEvent>,
}

impl BroadcastEventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SubscriptionEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionEventPublisher for BroadcastEventBus {
    fn publish(&self, event: SubscriptionEvent) {
        // Err only means nobody is listening.
        if self.sender.send(event).is_err() {
            debug!("Subscription event dropped, no subscribers");
        }
    }
}

/// Writes every event to the log. Runs until the bus is dropped.
pub async fn run_event_logger(mut receiver: broadcast::Receiver<SubscriptionEvent>) {
    loop {
        match receiver.recv().await {
            Ok(event) => {
                let payload = serde_json::to_string(&event).unwrap_or_default();
                info!(user_id = %event.user_id(), event = %payload, "Subscription event");
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Event logger lagged behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
