pub mod rating;
pub mod service;
pub mod state;

pub use rating::{RatingAggregator, RatingError};
pub use service::{generate_booking_number, BookingService, BookingServiceError, TripDetails};
pub use state::{allowed_targets, BookingStateMachine, TransitionError};
