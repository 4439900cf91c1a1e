use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use corsa_core::{BookingRepository, VehicleClaim, VehicleRepository, Versioned};
use corsa_domain::{Booking, Vehicle};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(Uuid),
    #[error("record already exists: {0}")]
    AlreadyExists(Uuid),
    #[error("version conflict on {id}: expected {expected}, found {found}")]
    VersionConflict {
        id: Uuid,
        expected: u64,
        found: u64,
    },
}

/// In-memory persistence collaborator used by tests and embedders that
/// bring no database. Honors the same contract a real store must: saves
/// are compare-and-set on a per-record version, and the vehicle claim runs
/// the availability predicate and the `booked` flip under one write lock.
#[derive(Default)]
pub struct MemoryStore {
    bookings: RwLock<HashMap<Uuid, Versioned<Booking>>>,
    vehicles: RwLock<HashMap<Uuid, Versioned<Vehicle>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a vehicle directly, bypassing versioning preconditions
    pub async fn seed_vehicle(&self, vehicle: Vehicle) {
        self.vehicles.write().await.insert(
            vehicle.id,
            Versioned {
                version: 1,
                record: vehicle,
            },
        );
    }
}

fn upsert<T: Clone>(
    map: &mut HashMap<Uuid, Versioned<T>>,
    id: Uuid,
    record: &T,
    expected_version: Option<u64>,
) -> Result<u64, StoreError> {
    match (map.get_mut(&id), expected_version) {
        (None, None) => {
            map.insert(
                id,
                Versioned {
                    version: 1,
                    record: record.clone(),
                },
            );
            Ok(1)
        }
        (None, Some(_)) => Err(StoreError::NotFound(id)),
        (Some(_), None) => Err(StoreError::AlreadyExists(id)),
        (Some(entry), Some(expected)) => {
            if entry.version != expected {
                return Err(StoreError::VersionConflict {
                    id,
                    expected,
                    found: entry.version,
                });
            }
            entry.version += 1;
            entry.record = record.clone();
            Ok(entry.version)
        }
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn load_booking(
        &self,
        id: Uuid,
    ) -> Result<Option<Versioned<Booking>>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn save_booking(
        &self,
        booking: &Booking,
        expected_version: Option<u64>,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        let mut bookings = self.bookings.write().await;
        Ok(upsert(&mut bookings, booking.id, booking, expected_version)?)
    }
}

#[async_trait]
impl VehicleRepository for MemoryStore {
    async fn load_vehicle(
        &self,
        id: Uuid,
    ) -> Result<Option<Versioned<Vehicle>>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.vehicles.read().await.get(&id).cloned())
    }

    async fn save_vehicle(
        &self,
        vehicle: &Vehicle,
        expected_version: Option<u64>,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        let mut vehicles = self.vehicles.write().await;
        Ok(upsert(&mut vehicles, vehicle.id, vehicle, expected_version)?)
    }

    async fn try_claim_vehicle(
        &self,
        id: Uuid,
        pickup_at: DateTime<Utc>,
    ) -> Result<VehicleClaim, Box<dyn std::error::Error + Send + Sync>> {
        let mut vehicles = self.vehicles.write().await;
        let Some(entry) = vehicles.get_mut(&id) else {
            return Ok(VehicleClaim::NotFound);
        };
        if !entry.record.is_bookable_at(pickup_at) {
            return Ok(VehicleClaim::Unavailable);
        }
        entry.record.booked = true;
        entry.record.updated_at = Utc::now();
        entry.version += 1;
        Ok(VehicleClaim::Claimed(entry.clone()))
    }

    async fn release_vehicle(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut vehicles = self.vehicles.write().await;
        if let Some(entry) = vehicles.get_mut(&id) {
            if entry.record.booked {
                entry.record.booked = false;
                entry.record.updated_at = Utc::now();
                entry.version += 1;
            }
        }
        Ok(())
    }
}
