use async_trait::async_trait;
use chrono::{DateTime, Utc};
use corsa_domain::BookingStatus;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// Emitted after every persisted status change, including creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingStatusChanged {
    pub booking_id: Uuid,
    pub booking_number: String,
    pub status: BookingStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Delivery is fire-and-forget from the engine's perspective; a publisher
/// that fails must not fail the operation that produced the event.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: BookingStatusChanged);
}

/// Default publisher: writes the event to the log stream. Hosts wire their
/// notification fan-out in here.
pub struct LogPublisher;

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn publish(&self, event: BookingStatusChanged) {
        match serde_json::to_string(&event) {
            Ok(payload) => {
                info!(booking = %event.booking_number, "booking status changed: {}", payload)
            }
            Err(e) => warn!("failed to encode booking event: {}", e),
        }
    }
}
