use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Domain events emitted by the services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    UserRegistered(Uuid),

    ProductCreated(Uuid),
    ProductUpdated(Uuid),

    CartItemAdded { user_id: Uuid, product_id: Uuid },
    CartItemRemoved { user_id: Uuid, product_id: Uuid },
    CartCleared(Uuid),

    WishlistItemAdded { user_id: Uuid, product_id: Uuid },
    WishlistItemRemoved { user_id: Uuid, product_id: Uuid },

    ReviewSubmitted { user_id: Uuid, product_id: Uuid },

    OrderPlaced { order_id: Uuid, user_id: Uuid },
}

/// Handle for publishing events onto the in-process channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, surfacing channel failure to the caller.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event and logs instead of failing when the channel is
    /// closed. Services use this on paths where event delivery must not
    /// fail the operation itself.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event.clone()).await {
            warn!("Dropping event {:?}: {}", event, e);
        }
    }
}

/// Consumes events from the channel until it closes.
///
/// The storefront has no external subscribers; events are logged for
/// operational visibility and the loop is the single place to attach
/// future consumers.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::OrderPlaced { order_id, user_id } => {
                info!(%order_id, %user_id, "Order placed");
            }
            Event::UserRegistered(user_id) => {
                info!(%user_id, "User registered");
            }
            other => debug!("Event: {:?}", other),
        }
    }
    info!("Event processor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_event() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        sender
            .send(Event::UserRegistered(Uuid::new_v4()))
            .await
            .expect("send should succeed");

        match rx.recv().await {
            Some(Event::UserRegistered(_)) => {}
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        // Must not panic or error out.
        sender
            .send_or_log(Event::CartCleared(Uuid::new_v4()))
            .await;
    }
}
