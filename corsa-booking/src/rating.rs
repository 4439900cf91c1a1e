use chrono::Utc;
use corsa_domain::{RatingSlot, RatingSummary};

#[derive(Debug, thiserror::Error)]
pub enum RatingError {
    #[error("rating {0} is outside the 1-5 range")]
    InvalidRating(u8),
}

/// Maintains rating aggregates in two modes: a star histogram with a
/// running average (vehicles), and a single overwritable slot (the one
/// rating each participant leaves on a booking).
pub struct RatingAggregator;

impl RatingAggregator {
    /// Histogram mode: count the star and recompute the average
    pub fn record(summary: &mut RatingSummary, stars: u8) -> Result<(), RatingError> {
        Self::validate(stars)?;
        summary.breakdown[usize::from(stars - 1)] += 1;
        summary.count += 1;
        Self::recompute(summary);
        Ok(())
    }

    /// Remove a star previously counted with [`record`](Self::record); used
    /// when a re-submitted rating replaces an earlier one so the aggregate
    /// never counts one trip twice.
    pub fn retract(summary: &mut RatingSummary, stars: u8) -> Result<(), RatingError> {
        Self::validate(stars)?;
        let slot = &mut summary.breakdown[usize::from(stars - 1)];
        if *slot > 0 && summary.count > 0 {
            *slot -= 1;
            summary.count -= 1;
            Self::recompute(summary);
        }
        Ok(())
    }

    /// Single-entry mode: validate and stamp one booking-level rating
    pub fn single(stars: u8, comment: Option<String>) -> Result<RatingSlot, RatingError> {
        Self::validate(stars)?;
        Ok(RatingSlot {
            rating: stars,
            comment,
            rated_at: Utc::now(),
        })
    }

    fn validate(stars: u8) -> Result<(), RatingError> {
        if (1..=5).contains(&stars) {
            Ok(())
        } else {
            Err(RatingError::InvalidRating(stars))
        }
    }

    fn recompute(summary: &mut RatingSummary) {
        if summary.count == 0 {
            summary.average = 0.0;
            return;
        }
        let weighted: u64 = summary
            .breakdown
            .iter()
            .enumerate()
            .map(|(i, n)| (i as u64 + 1) * u64::from(*n))
            .sum();
        summary.average = weighted as f64 / f64::from(summary.count);
    }
}
