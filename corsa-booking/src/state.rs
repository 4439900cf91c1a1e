use chrono::Utc;
use corsa_domain::{Booking, BookingStatus};

#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
}

/// Outbound transitions allowed from each status. Terminal statuses map to
/// an empty set.
pub fn allowed_targets(from: BookingStatus) -> &'static [BookingStatus] {
    use BookingStatus::*;
    match from {
        Pending => &[Confirmed, Cancelled, Expired],
        Confirmed => &[DriverAssigned, Cancelled],
        DriverAssigned => &[DriverEnRoute, Cancelled],
        DriverEnRoute => &[DriverArrived, Cancelled],
        DriverArrived => &[TripStarted, Cancelled],
        TripStarted => &[TripCompleted, Cancelled],
        TripCompleted | Cancelled | Expired => &[],
    }
}

/// Owns the booking's status field: validates each transition against the
/// table above and applies the side-effect fields that come with it.
/// Mutation happens on the in-memory record only; persisting the result is
/// the caller's job.
pub struct BookingStateMachine;

impl BookingStateMachine {
    pub fn can_transition(from: BookingStatus, to: BookingStatus) -> bool {
        allowed_targets(from).contains(&to)
    }

    pub fn transition(
        booking: &mut Booking,
        target: BookingStatus,
        reason: Option<String>,
    ) -> Result<(), TransitionError> {
        if !Self::can_transition(booking.status, target) {
            return Err(TransitionError::InvalidTransition {
                from: booking.status,
                to: target,
            });
        }

        let now = Utc::now();
        booking.status = target;
        match target {
            BookingStatus::TripStarted => booking.trip.started_at = Some(now),
            BookingStatus::TripCompleted => booking.trip.ended_at = Some(now),
            BookingStatus::Cancelled => {
                booking.cancellation.is_cancelled = true;
                booking.cancellation.cancelled_at = Some(now);
                if reason.is_some() {
                    booking.cancellation.reason = reason;
                }
            }
            _ => {}
        }
        booking.updated_at = now;
        Ok(())
    }
}
