use chrono::NaiveTime;
use corsa_pricing::{CancellationTiers, FareRules};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub business_rules: BusinessRules,
}

/// Operator-tunable pricing and penalty knobs. Defaults reproduce the
/// published rate sheet.
#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "defaults::tax_rate")]
    pub tax_rate: f64,
    #[serde(default = "defaults::booking_fee")]
    pub booking_fee: i64,
    #[serde(default = "defaults::night_charge")]
    pub night_charge: i64,
    #[serde(default = "defaults::driver_allowance")]
    pub driver_allowance: i64,
    #[serde(default = "defaults::night_start")]
    pub night_start: NaiveTime,
    #[serde(default = "defaults::night_end")]
    pub night_end: NaiveTime,
    #[serde(default = "defaults::cancellation_over_24h")]
    pub cancellation_over_24h: f64,
    #[serde(default = "defaults::cancellation_over_2h")]
    pub cancellation_over_2h: f64,
    #[serde(default = "defaults::cancellation_before_pickup")]
    pub cancellation_before_pickup: f64,
    #[serde(default = "defaults::cancellation_after_pickup")]
    pub cancellation_after_pickup: f64,
}

mod defaults {
    use chrono::NaiveTime;

    pub fn tax_rate() -> f64 {
        0.13
    }
    pub fn booking_fee() -> i64 {
        50
    }
    pub fn night_charge() -> i64 {
        200
    }
    pub fn driver_allowance() -> i64 {
        300
    }
    pub fn night_start() -> NaiveTime {
        NaiveTime::from_hms_opt(22, 0, 0).unwrap()
    }
    pub fn night_end() -> NaiveTime {
        NaiveTime::from_hms_opt(6, 0, 0).unwrap()
    }
    pub fn cancellation_over_24h() -> f64 {
        0.05
    }
    pub fn cancellation_over_2h() -> f64 {
        0.15
    }
    pub fn cancellation_before_pickup() -> f64 {
        0.25
    }
    pub fn cancellation_after_pickup() -> f64 {
        0.50
    }
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            tax_rate: defaults::tax_rate(),
            booking_fee: defaults::booking_fee(),
            night_charge: defaults::night_charge(),
            driver_allowance: defaults::driver_allowance(),
            night_start: defaults::night_start(),
            night_end: defaults::night_end(),
            cancellation_over_24h: defaults::cancellation_over_24h(),
            cancellation_over_2h: defaults::cancellation_over_2h(),
            cancellation_before_pickup: defaults::cancellation_before_pickup(),
            cancellation_after_pickup: defaults::cancellation_after_pickup(),
        }
    }
}

impl BusinessRules {
    pub fn fare_rules(&self) -> FareRules {
        FareRules {
            tax_rate: self.tax_rate,
            booking_fee: self.booking_fee,
            night_charge: self.night_charge,
            driver_allowance: self.driver_allowance,
            night_start: self.night_start,
            night_end: self.night_end,
        }
    }

    pub fn cancellation_tiers(&self) -> CancellationTiers {
        CancellationTiers {
            over_24h: self.cancellation_over_24h,
            over_2h: self.cancellation_over_2h,
            before_pickup: self.cancellation_before_pickup,
            after_pickup: self.cancellation_after_pickup,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `CORSA__BUSINESS_RULES__TAX_RATE=0.18`
            .add_source(config::Environment::with_prefix("CORSA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
