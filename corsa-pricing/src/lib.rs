pub mod cancellation;
pub mod fare;
pub mod rate_card;

pub use cancellation::{CancellationPolicy, CancellationQuote, CancellationTiers};
pub use fare::{FareCalculator, FareError, FareRules};
pub use rate_card::{default_rate_card, RateCard};
