pub mod events;
pub mod identity;
pub mod payment;
pub mod repository;

pub use events::{BookingStatusChanged, EventPublisher, LogPublisher};
pub use identity::AuthenticatedActor;
pub use payment::{MockPaymentAdapter, PaymentAdapter, PaymentReceipt};
pub use repository::{BookingRepository, VehicleClaim, VehicleRepository, Versioned};
