pub mod booking;
pub mod vehicle;

pub use booking::{
    Actor, AdditionalCharge, Booking, BookingMessage, BookingRatings, BookingStatus, Cancellation,
    ChargeKind, FareBreakdown, GeoPoint, Passenger, PaymentInfo, PaymentMethod, PaymentStatus,
    RatingSlot, TripPoint, TripRecord, TripType,
};
pub use vehicle::{
    ApprovalStatus, BandedRates, FlatFares, PricingReference, RatingSummary, Schedule, Vehicle,
    VehicleCategory, VehiclePricing,
};
