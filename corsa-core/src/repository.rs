use async_trait::async_trait;
use chrono::{DateTime, Utc};
use corsa_domain::{Booking, Vehicle};
use uuid::Uuid;

/// A stored record together with the version it was read at. Writers hand
/// the version back on save so the store can reject lost updates.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub version: u64,
    pub record: T,
}

/// Outcome of the atomic availability-check-and-claim on a vehicle
#[derive(Debug, Clone)]
pub enum VehicleClaim {
    Claimed(Versioned<Vehicle>),
    Unavailable,
    NotFound,
}

/// Booking persistence. Implementations must serialize concurrent writers
/// on the same booking; the engine itself assumes single-writer semantics
/// per invocation.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn load_booking(
        &self,
        id: Uuid,
    ) -> Result<Option<Versioned<Booking>>, Box<dyn std::error::Error + Send + Sync>>;

    /// Insert when `expected_version` is None, otherwise a compare-and-set
    /// update that fails on a version mismatch. Returns the new version.
    async fn save_booking(
        &self,
        booking: &Booking,
        expected_version: Option<u64>,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;
}

/// Vehicle persistence, including the atomic claim used at booking
/// creation. The availability predicate and the `booked` flip happen as one
/// conditional update, never as a read followed by a write.
#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn load_vehicle(
        &self,
        id: Uuid,
    ) -> Result<Option<Versioned<Vehicle>>, Box<dyn std::error::Error + Send + Sync>>;

    async fn save_vehicle(
        &self,
        vehicle: &Vehicle,
        expected_version: Option<u64>,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;

    /// Run the availability predicate for a pickup at `pickup_at` and set
    /// `booked = true` in a single conditional update.
    async fn try_claim_vehicle(
        &self,
        id: Uuid,
        pickup_at: DateTime<Utc>,
    ) -> Result<VehicleClaim, Box<dyn std::error::Error + Send + Sync>>;

    /// Clear `booked` once the trip completes or the booking leaves the
    /// active set. Releasing an unclaimed vehicle is a no-op.
    async fn release_vehicle(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
