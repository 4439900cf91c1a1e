use std::sync::Arc;

use chrono::Utc;
use corsa_core::{
    AuthenticatedActor, BookingRepository, BookingStatusChanged, EventPublisher, PaymentAdapter,
    VehicleClaim, VehicleRepository, Versioned,
};
use corsa_domain::{
    Actor, Booking, BookingMessage, BookingStatus, Passenger, PaymentInfo, PaymentStatus,
    TripPoint, TripType,
};
use corsa_pricing::{CancellationPolicy, FareCalculator, FareError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::rating::{RatingAggregator, RatingError};
use crate::state::{BookingStateMachine, TransitionError};

#[derive(Debug, thiserror::Error)]
pub enum BookingServiceError {
    #[error("vehicle is not available for the requested pickup")]
    VehicleUnavailable,
    #[error("booking not found: {0}")]
    BookingNotFound(Uuid),
    #[error("vehicle not found: {0}")]
    VehicleNotFound(Uuid),
    #[error("booking cannot be rated while {0:?}")]
    NotRatable(BookingStatus),
    #[error("booking is no longer active ({0:?})")]
    BookingInactive(BookingStatus),
    #[error("only trip participants can rate a booking, not {0:?}")]
    UnsupportedRater(Actor),
    #[error(transparent)]
    Fare(#[from] FareError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Rating(#[from] RatingError),
    #[error("storage failure: {source}")]
    Storage {
        #[from]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Everything the rider supplies when requesting a trip. Distance comes
/// from the host's routing collaborator; this engine does not compute
/// routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripDetails {
    pub trip_type: TripType,
    pub pickup: TripPoint,
    pub destination: TripPoint,
    pub distance_km: f64,
    pub passengers: Vec<Passenger>,
    #[serde(default)]
    pub discount: i64,
}

/// Orchestrates the booking lifecycle: creates bookings with computed
/// pricing, walks them through the state machine, finalizes cancellations
/// and ratings. All mutation happens on in-memory copies and is persisted
/// as one write after validation, so a rejected operation never leaves a
/// half-updated record behind.
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    vehicles: Arc<dyn VehicleRepository>,
    payments: Arc<dyn PaymentAdapter>,
    events: Arc<dyn EventPublisher>,
    fares: FareCalculator,
    cancellations: CancellationPolicy,
}

impl BookingService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        vehicles: Arc<dyn VehicleRepository>,
        payments: Arc<dyn PaymentAdapter>,
        events: Arc<dyn EventPublisher>,
        fares: FareCalculator,
        cancellations: CancellationPolicy,
    ) -> Self {
        Self {
            bookings,
            vehicles,
            payments,
            events,
            fares,
            cancellations,
        }
    }

    /// Claim the vehicle, price the trip, and persist a new `PENDING`
    /// booking. The availability check and the `booked` flip are one
    /// atomic operation at the store, so two riders racing for the same
    /// vehicle cannot both get through.
    pub async fn create_booking(
        &self,
        rider: AuthenticatedActor,
        vehicle_id: Uuid,
        details: TripDetails,
    ) -> Result<Booking, BookingServiceError> {
        let pickup_at = details.pickup.datetime();
        let vehicle = match self.vehicles.try_claim_vehicle(vehicle_id, pickup_at).await? {
            VehicleClaim::Claimed(versioned) => versioned.record,
            VehicleClaim::Unavailable => {
                warn!(vehicle = %vehicle_id, "vehicle failed availability check");
                return Err(BookingServiceError::VehicleUnavailable);
            }
            VehicleClaim::NotFound => return Err(BookingServiceError::VehicleNotFound(vehicle_id)),
        };

        let Some(pricing) = vehicle.pricing.as_ref() else {
            self.release_quietly(vehicle_id).await;
            return Err(FareError::PricingUnavailable {
                category: vehicle.category,
                trip_type: details.trip_type,
            }
            .into());
        };

        let quote = match self.fares.quote(
            pricing,
            vehicle.category,
            details.trip_type,
            details.distance_km,
            details.pickup.time,
            details.discount,
        ) {
            Ok(quote) => quote,
            Err(e) => {
                self.release_quietly(vehicle_id).await;
                return Err(e.into());
            }
        };

        let booking = Booking::new(
            generate_booking_number(),
            rider.id,
            vehicle.driver_id,
            vehicle.id,
            details.trip_type,
            details.pickup,
            details.destination,
            details.passengers,
            quote,
        );

        if let Err(e) = self.bookings.save_booking(&booking, None).await {
            self.release_quietly(vehicle_id).await;
            return Err(e.into());
        }

        info!(
            booking = %booking.booking_number,
            vehicle = %vehicle.id,
            total = booking.pricing.total,
            "booking created"
        );
        self.emit_status(&booking).await;
        Ok(booking)
    }

    pub async fn confirm_booking(&self, booking_id: Uuid) -> Result<Booking, BookingServiceError> {
        self.apply_transition(booking_id, BookingStatus::Confirmed, None)
            .await
    }

    pub async fn mark_driver_assigned(
        &self,
        booking_id: Uuid,
    ) -> Result<Booking, BookingServiceError> {
        self.apply_transition(booking_id, BookingStatus::DriverAssigned, None)
            .await
    }

    pub async fn mark_driver_en_route(
        &self,
        booking_id: Uuid,
    ) -> Result<Booking, BookingServiceError> {
        self.apply_transition(booking_id, BookingStatus::DriverEnRoute, None)
            .await
    }

    pub async fn mark_driver_arrived(
        &self,
        booking_id: Uuid,
    ) -> Result<Booking, BookingServiceError> {
        self.apply_transition(booking_id, BookingStatus::DriverArrived, None)
            .await
    }

    pub async fn start_trip(&self, booking_id: Uuid) -> Result<Booking, BookingServiceError> {
        self.apply_transition(booking_id, BookingStatus::TripStarted, None)
            .await
    }

    /// Complete the trip and free the vehicle for the next rider
    pub async fn complete_trip(&self, booking_id: Uuid) -> Result<Booking, BookingServiceError> {
        let booking = self
            .apply_transition(booking_id, BookingStatus::TripCompleted, None)
            .await?;
        self.vehicles.release_vehicle(booking.vehicle_id).await?;
        Ok(booking)
    }

    /// Expire a request no driver confirmed in time
    pub async fn expire_booking(&self, booking_id: Uuid) -> Result<Booking, BookingServiceError> {
        let booking = self
            .apply_transition(booking_id, BookingStatus::Expired, None)
            .await?;
        self.vehicles.release_vehicle(booking.vehicle_id).await?;
        Ok(booking)
    }

    /// Cancel a booking. The transition table is consulted before any fee
    /// math so an uncancellable booking is rejected without ever computing
    /// a fee; the fee and refund are then fixed by how far out the pickup
    /// still is.
    pub async fn cancel_booking(
        &self,
        booking_id: Uuid,
        actor: AuthenticatedActor,
        reason: Option<String>,
    ) -> Result<Booking, BookingServiceError> {
        let Versioned {
            version,
            record: mut booking,
        } = self.load_booking(booking_id).await?;

        if !BookingStateMachine::can_transition(booking.status, BookingStatus::Cancelled) {
            warn!(
                booking = %booking.booking_number,
                status = ?booking.status,
                "cancellation rejected"
            );
            return Err(TransitionError::InvalidTransition {
                from: booking.status,
                to: BookingStatus::Cancelled,
            }
            .into());
        }

        let quote = self
            .cancellations
            .assess(booking.pickup.datetime(), Utc::now(), booking.pricing.total);

        BookingStateMachine::transition(&mut booking, BookingStatus::Cancelled, reason)?;
        booking.cancellation.cancelled_by = Some(actor.role);
        booking.cancellation.cancellation_fee = quote.fee;
        booking.cancellation.refund_amount = quote.refund;

        if booking.payment.status == PaymentStatus::Succeeded && quote.refund > 0 {
            let receipt = self.payments.refund(booking.id, quote.refund).await?;
            booking.payment.status = receipt.status;
        }

        self.bookings.save_booking(&booking, Some(version)).await?;
        self.vehicles.release_vehicle(booking.vehicle_id).await?;

        info!(
            booking = %booking.booking_number,
            fee = quote.fee,
            refund = quote.refund,
            "booking cancelled"
        );
        self.emit_status(&booking).await;
        Ok(booking)
    }

    /// Store a rating for a completed trip. The rider's rating also feeds
    /// the vehicle's running aggregate; re-rating overwrites the booking
    /// slot and swaps the old star out of the aggregate first.
    pub async fn rate_booking(
        &self,
        booking_id: Uuid,
        rater: AuthenticatedActor,
        stars: u8,
        comment: Option<String>,
    ) -> Result<Booking, BookingServiceError> {
        let Versioned {
            version,
            record: mut booking,
        } = self.load_booking(booking_id).await?;

        if booking.status != BookingStatus::TripCompleted {
            return Err(BookingServiceError::NotRatable(booking.status));
        }

        let slot = RatingAggregator::single(stars, comment)?;

        match rater.role {
            Actor::Rider => {
                let Versioned {
                    version: vehicle_version,
                    record: mut vehicle,
                } = self
                    .vehicles
                    .load_vehicle(booking.vehicle_id)
                    .await?
                    .ok_or(BookingServiceError::VehicleNotFound(booking.vehicle_id))?;

                if let Some(previous) = &booking.ratings.by_rider {
                    RatingAggregator::retract(&mut vehicle.ratings, previous.rating)?;
                }
                RatingAggregator::record(&mut vehicle.ratings, stars)?;
                vehicle.updated_at = Utc::now();
                self.vehicles
                    .save_vehicle(&vehicle, Some(vehicle_version))
                    .await?;
                booking.ratings.by_rider = Some(slot);
            }
            Actor::Driver => booking.ratings.by_driver = Some(slot),
            other => return Err(BookingServiceError::UnsupportedRater(other)),
        }

        booking.touch();
        self.bookings.save_booking(&booking, Some(version)).await?;
        Ok(booking)
    }

    /// Record what the payment collaborator reported back. The engine only
    /// keeps the numbers and the status; it never talks to the gateway for
    /// a charge itself.
    pub async fn record_payment(
        &self,
        booking_id: Uuid,
        report: PaymentInfo,
    ) -> Result<Booking, BookingServiceError> {
        let Versioned {
            version,
            record: mut booking,
        } = self.load_booking(booking_id).await?;

        booking.payment = report;
        booking.touch();
        self.bookings.save_booking(&booking, Some(version)).await?;
        Ok(booking)
    }

    pub async fn get_booking(&self, booking_id: Uuid) -> Result<Booking, BookingServiceError> {
        Ok(self.load_booking(booking_id).await?.record)
    }

    /// Append a chat line between the trip's participants. Allowed while
    /// the booking is still active; terminal bookings are read-only.
    pub async fn append_message(
        &self,
        booking_id: Uuid,
        sender: AuthenticatedActor,
        body: String,
    ) -> Result<Booking, BookingServiceError> {
        let Versioned {
            version,
            record: mut booking,
        } = self.load_booking(booking_id).await?;

        if !booking.is_active() {
            return Err(BookingServiceError::BookingInactive(booking.status));
        }

        booking.messages.push(BookingMessage {
            sender: sender.role,
            body,
            sent_at: Utc::now(),
        });
        booking.touch();
        self.bookings.save_booking(&booking, Some(version)).await?;
        Ok(booking)
    }

    async fn apply_transition(
        &self,
        booking_id: Uuid,
        target: BookingStatus,
        reason: Option<String>,
    ) -> Result<Booking, BookingServiceError> {
        let Versioned {
            version,
            record: mut booking,
        } = self.load_booking(booking_id).await?;

        BookingStateMachine::transition(&mut booking, target, reason)?;
        self.bookings.save_booking(&booking, Some(version)).await?;

        info!(booking = %booking.booking_number, status = ?booking.status, "booking transitioned");
        self.emit_status(&booking).await;
        Ok(booking)
    }

    async fn load_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Versioned<Booking>, BookingServiceError> {
        self.bookings
            .load_booking(booking_id)
            .await?
            .ok_or(BookingServiceError::BookingNotFound(booking_id))
    }

    async fn emit_status(&self, booking: &Booking) {
        self.events
            .publish(BookingStatusChanged {
                booking_id: booking.id,
                booking_number: booking.booking_number.clone(),
                status: booking.status,
                occurred_at: Utc::now(),
            })
            .await;
    }

    /// Best-effort claim rollback on a failed creation; the original error
    /// is what the caller needs to see
    async fn release_quietly(&self, vehicle_id: Uuid) {
        if let Err(e) = self.vehicles.release_vehicle(vehicle_id).await {
            warn!(vehicle = %vehicle_id, "failed to release claimed vehicle: {}", e);
        }
    }
}

/// `CS` + last 8 digits of the epoch-millisecond clock + 4 random base-36
/// characters. Collisions are possible but accepted; the UUID id, not this
/// display number, is the lookup key.
pub fn generate_booking_number() -> String {
    const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let millis = Utc::now().timestamp_millis();
    let tail = (millis.rem_euclid(100_000_000)) as u64;
    let mut rng = rand::thread_rng();
    let suffix: String = (0..4)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("CS{tail:08}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_number_shape() {
        let number = generate_booking_number();
        assert_eq!(number.len(), 14);
        assert!(number.starts_with("CS"));
        assert!(number[2..10].chars().all(|c| c.is_ascii_digit()));
        assert!(number[10..]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn booking_numbers_differ() {
        let a = generate_booking_number();
        let b = generate_booking_number();
        // same millisecond is fine, the random suffix still splits them
        assert_ne!(a, b);
    }
}
