use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleCategory {
    Auto,
    Car,
    Bus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// The category/type/model triple a vehicle's pricing is resolved from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PricingReference {
    pub category: VehicleCategory,
    pub vehicle_type: String,
    pub model: String,
}

/// Flat fares for categories that ignore distance (autos)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlatFares {
    pub one_way: i64,
    pub round_trip: i64,
}

/// Per-km rates by distance band; trips beyond 150 km stay on the 150 km rate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BandedRates {
    pub upto_50_km: f64,
    pub upto_100_km: f64,
    pub upto_150_km: f64,
}

/// Denormalized pricing snapshot stored on the vehicle for fast fare lookup.
/// Autos carry `flat`; cars and buses carry one or both banded tables.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct VehiclePricing {
    pub flat: Option<FlatFares>,
    pub one_way: Option<BandedRates>,
    pub round_trip: Option<BandedRates>,
}

/// Running rating aggregate.
/// Invariant: `average == sum(star * breakdown[star-1]) / count` when
/// count > 0, else 0.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RatingSummary {
    pub average: f64,
    pub count: u32,
    /// Star histogram, index 0 holds one-star counts
    pub breakdown: [u32; 5],
}

/// Days and hours the vehicle accepts pickups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub working_days: Vec<Weekday>,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Schedule {
    /// Whether a pickup at `when` falls inside working days and hours.
    /// Windows with start > end wrap past midnight.
    pub fn covers(&self, when: DateTime<Utc>) -> bool {
        use chrono::Datelike;
        if !self.working_days.contains(&when.weekday()) {
            return false;
        }
        let t = when.time();
        if self.start <= self.end {
            self.start <= t && t <= self.end
        } else {
            t >= self.start || t <= self.end
        }
    }
}

/// One physical vehicle owned by one driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub category: VehicleCategory,
    pub vehicle_type: String,
    pub model: String,
    pub registration_number: String,
    pub pricing_reference: PricingReference,
    pub pricing: Option<VehiclePricing>,
    pub is_available: bool,
    pub booked: bool,
    pub is_active: bool,
    pub is_verified: bool,
    pub under_maintenance: bool,
    pub approval_status: ApprovalStatus,
    pub ratings: RatingSummary,
    pub schedule: Schedule,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn new(
        driver_id: Uuid,
        category: VehicleCategory,
        vehicle_type: String,
        model: String,
        registration_number: String,
        schedule: Schedule,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            driver_id,
            pricing_reference: PricingReference {
                category,
                vehicle_type: vehicle_type.clone(),
                model: model.clone(),
            },
            category,
            vehicle_type,
            model,
            registration_number,
            pricing: None,
            is_available: true,
            booked: false,
            is_active: true,
            is_verified: false,
            under_maintenance: false,
            approval_status: ApprovalStatus::Pending,
            ratings: RatingSummary::default(),
            schedule,
            created_at: now,
            updated_at: now,
        }
    }

    /// Re-denormalize the pricing snapshot from a resolved rate card entry
    pub fn refresh_pricing(&mut self, snapshot: VehiclePricing) {
        self.pricing = Some(snapshot);
        self.updated_at = Utc::now();
    }

    /// Full availability predicate for a pickup at `when`: the vehicle must
    /// be active, verified, approved, not claimed by another booking, not in
    /// the workshop, and inside its working schedule.
    pub fn is_bookable_at(&self, when: DateTime<Utc>) -> bool {
        self.is_active
            && self.is_verified
            && self.approval_status == ApprovalStatus::Approved
            && self.is_available
            && !self.booked
            && !self.under_maintenance
            && self.schedule.covers(when)
    }
}
