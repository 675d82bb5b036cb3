use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info};
use uuid::Uuid;

/// Domain events emitted by the services.
///
/// Events are fire-and-forget: a full or closed channel never fails the
/// operation that produced the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Catalog events
    ProductCreated(Uuid),
    ProductUpdated(Uuid),
    ProductDeleted(Uuid),
    VariantAdded {
        product_id: Uuid,
        variant_id: Uuid,
    },
    VariantDeleted(Uuid),
    StockAdjusted {
        variant_id: Uuid,
        old_quantity: i32,
        new_quantity: i32,
    },

    // Checkout events
    CheckoutStarted {
        checkout_id: Uuid,
        line_count: usize,
    },
    CheckoutCompleted {
        checkout_id: Uuid,
        sale_id: Uuid,
        total_amount: Decimal,
    },
    CheckoutFailed {
        checkout_id: Uuid,
        reason: String,
    },

    // Auth events
    UserRegistered(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, returning an error when the channel is closed.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event and logs (instead of propagating) a delivery failure.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            error!("Event delivery failed: {}", e);
        }
    }
}

/// Background worker draining the event channel.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::CheckoutCompleted {
                sale_id,
                total_amount,
                ..
            } => {
                info!(%sale_id, %total_amount, "checkout completed");
            }
            Event::CheckoutFailed {
                checkout_id,
                reason,
            } => {
                info!(%checkout_id, reason, "checkout failed");
            }
            Event::StockAdjusted {
                variant_id,
                old_quantity,
                new_quantity,
            } => {
                info!(%variant_id, old_quantity, new_quantity, "stock adjusted");
            }
            other => {
                info!(event = ?other, "event processed");
            }
        }
    }
    info!("Event channel closed; processor shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        // Must not panic or error out.
        sender.send_or_log(Event::ProductCreated(Uuid::new_v4())).await;
    }

    #[tokio::test]
    async fn events_round_trip_through_channel() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        let id = Uuid::new_v4();
        sender.send(Event::ProductDeleted(id)).await.unwrap();

        match rx.recv().await {
            Some(Event::ProductDeleted(got)) => assert_eq!(got, id),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
