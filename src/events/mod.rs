use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted after successful mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CustomerCreated(Uuid),
    CustomerUpdated(Uuid),
    ProductCreated(Uuid),
    QuoteCreated(Uuid),
    QuoteUpdated(Uuid),
    QuoteConverted {
        quote_id: Uuid,
        order_id: Uuid,
    },
    OrderCreated(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    PaymentRecorded {
        order_id: Uuid,
        payment_id: Uuid,
        amount: Decimal,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Consumes events from the channel until all senders are dropped.
/// Events are best-effort notifications; the consumer only logs them.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(order_id = %order_id, old_status = %old_status, new_status = %new_status, "event: order status changed");
            }
            Event::PaymentRecorded {
                order_id,
                payment_id,
                amount,
            } => {
                info!(order_id = %order_id, payment_id = %payment_id, amount = %amount, "event: payment recorded");
            }
            Event::QuoteConverted { quote_id, order_id } => {
                info!(quote_id = %quote_id, order_id = %order_id, "event: quote converted to order");
            }
            other => {
                info!(event = ?other, "event");
            }
        }
    }
    warn!("Event channel closed; event processor exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_event_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        let order_id = Uuid::new_v4();
        sender.send(Event::OrderCreated(order_id)).await.unwrap();

        match rx.recv().await {
            Some(Event::OrderCreated(id)) => assert_eq!(id, order_id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_fails_once_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let sender = EventSender::new(tx);
        let result = sender.send(Event::CustomerCreated(Uuid::new_v4())).await;
        assert!(result.is_err());
    }
}
