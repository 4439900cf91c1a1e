use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fee rates by time remaining to pickup, evaluated top-down
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationTiers {
    /// More than 24 hours out
    pub over_24h: f64,
    /// Between 2 and 24 hours out
    pub over_2h: f64,
    /// Under 2 hours but before pickup time
    pub before_pickup: f64,
    /// Pickup time reached or passed
    pub after_pickup: f64,
}

impl Default for CancellationTiers {
    fn default() -> Self {
        Self {
            over_24h: 0.05,
            over_2h: 0.15,
            before_pickup: 0.25,
            after_pickup: 0.50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CancellationQuote {
    pub fee: i64,
    pub refund: i64,
    pub hours_until_pickup: f64,
}

/// Computes the penalty for cancelling a booking as a function of how close
/// the cancellation lands to the scheduled pickup. Pure; callers are
/// expected to have checked that the booking is still cancellable.
pub struct CancellationPolicy {
    tiers: CancellationTiers,
}

impl CancellationPolicy {
    pub fn new(tiers: CancellationTiers) -> Self {
        Self { tiers }
    }

    pub fn assess(
        &self,
        pickup_at: DateTime<Utc>,
        now: DateTime<Utc>,
        total: i64,
    ) -> CancellationQuote {
        let hours_until_pickup = (pickup_at - now).num_milliseconds() as f64 / 3_600_000.0;

        let rate = if hours_until_pickup > 24.0 {
            self.tiers.over_24h
        } else if hours_until_pickup > 2.0 {
            self.tiers.over_2h
        } else if hours_until_pickup > 0.0 {
            self.tiers.before_pickup
        } else {
            self.tiers.after_pickup
        };

        let fee = (total as f64 * rate).round() as i64;
        CancellationQuote {
            fee,
            refund: total - fee,
            hours_until_pickup,
        }
    }
}

impl Default for CancellationPolicy {
    fn default() -> Self {
        Self::new(CancellationTiers::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn assess_at(hours_before_pickup: i64, total: i64) -> CancellationQuote {
        let now = Utc::now();
        let pickup = now + Duration::hours(hours_before_pickup);
        CancellationPolicy::default().assess(pickup, now, total)
    }

    #[test]
    fn early_cancellation_costs_five_percent() {
        let quote = assess_at(25, 1000);
        assert_eq!(quote.fee, 50);
        assert_eq!(quote.refund, 950);
    }

    #[test]
    fn same_day_cancellation_costs_fifteen_percent() {
        let quote = assess_at(10, 1000);
        assert_eq!(quote.fee, 150);
        assert_eq!(quote.refund, 850);
    }

    #[test]
    fn last_minute_cancellation_costs_quarter() {
        let quote = assess_at(1, 1000);
        assert_eq!(quote.fee, 250);
        assert_eq!(quote.refund, 750);
    }

    #[test]
    fn cancelling_after_pickup_costs_half() {
        let quote = assess_at(-3, 1000);
        assert!(quote.hours_until_pickup < 0.0);
        assert_eq!(quote.fee, 500);
        assert_eq!(quote.refund, 500);
    }

    #[test]
    fn fee_and_refund_always_sum_to_total() {
        for hours in [-5, 0, 1, 3, 30] {
            let quote = assess_at(hours, 1237);
            assert_eq!(quote.fee + quote.refund, 1237);
        }
    }
}
