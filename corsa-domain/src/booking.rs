use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking status in the trip lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    DriverAssigned,
    DriverEnRoute,
    DriverArrived,
    TripStarted,
    TripCompleted,
    Cancelled,
    Expired,
}

impl BookingStatus {
    /// Terminal statuses have no outbound transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::TripCompleted | BookingStatus::Cancelled | BookingStatus::Expired
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripType {
    OneWay,
    RoundTrip,
    MultiCity,
}

/// Who performed an action on a booking (the engine trusts the caller's
/// identity collaborator to have authenticated this)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Actor {
    Rider,
    Driver,
    Admin,
    System,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// One end of a trip: where and when
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPoint {
    pub coords: GeoPoint,
    pub address: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl TripPoint {
    pub fn datetime(&self) -> DateTime<Utc> {
        self.date.and_time(self.time).and_utc()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub seat: Option<String>,
    pub is_child: bool,
    pub needs_wheelchair: bool,
}

/// Named extras added on top of the base fare
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargeKind {
    BookingFee,
    NightCharge,
    DriverAllowance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdditionalCharge {
    pub kind: ChargeKind,
    pub amount: i64,
}

/// Finalized pricing for a booking.
/// Invariant: `total == subtotal + tax - discount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FareBreakdown {
    pub base_fare: i64,
    pub distance_km: f64,
    /// Per-km rate used for banded categories; flat-fare vehicles have none
    pub rate_per_km: Option<f64>,
    pub additional_charges: Vec<AdditionalCharge>,
    pub subtotal: i64,
    pub tax: i64,
    pub discount: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    Wallet,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub method: Option<PaymentMethod>,
    pub status: PaymentStatus,
    pub gateway: Option<String>,
    pub transaction_id: Option<String>,
}

impl Default for PaymentInfo {
    fn default() -> Self {
        Self {
            method: None,
            status: PaymentStatus::Pending,
            gateway: None,
            transaction_id: None,
        }
    }
}

/// Cancellation outcome.
/// Invariant: `refund_amount == pricing.total - cancellation_fee` once the
/// fee has been assessed.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Cancellation {
    pub is_cancelled: bool,
    pub cancelled_by: Option<Actor>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub cancellation_fee: i64,
    pub refund_amount: i64,
}

/// Actual trip telemetry, filled in as the trip runs
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TripRecord {
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub route_points: Vec<GeoPoint>,
    pub stops: Vec<String>,
}

/// One chat line between the trip's participants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingMessage {
    pub sender: Actor,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// A single rating left on a booking; re-submitting overwrites the slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingSlot {
    pub rating: u8,
    pub comment: Option<String>,
    pub rated_at: DateTime<Utc>,
}

/// At most one rating from each side of the trip
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BookingRatings {
    pub by_rider: Option<RatingSlot>,
    pub by_driver: Option<RatingSlot>,
}

/// A single trip request and everything that happens to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    /// Display reference, e.g. CS48291736XK2P; not guaranteed unique
    pub booking_number: String,
    pub rider_id: Uuid,
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
    pub trip_type: TripType,
    pub pickup: TripPoint,
    pub destination: TripPoint,
    pub passengers: Vec<Passenger>,
    pub pricing: FareBreakdown,
    pub payment: PaymentInfo,
    pub status: BookingStatus,
    pub cancellation: Cancellation,
    pub trip: TripRecord,
    pub ratings: BookingRatings,
    pub messages: Vec<BookingMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        booking_number: String,
        rider_id: Uuid,
        driver_id: Uuid,
        vehicle_id: Uuid,
        trip_type: TripType,
        pickup: TripPoint,
        destination: TripPoint,
        passengers: Vec<Passenger>,
        pricing: FareBreakdown,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            booking_number,
            rider_id,
            driver_id,
            vehicle_id,
            trip_type,
            pickup,
            destination,
            passengers,
            pricing,
            payment: PaymentInfo::default(),
            status: BookingStatus::Pending,
            cancellation: Cancellation::default(),
            trip: TripRecord::default(),
            ratings: BookingRatings::default(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// A booking still moving through its lifecycle
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Every non-terminal status allows cancellation
    pub fn can_be_cancelled(&self) -> bool {
        !self.status.is_terminal()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
