use chrono::NaiveTime;
use corsa_domain::{
    AdditionalCharge, BandedRates, ChargeKind, FareBreakdown, TripType, VehicleCategory,
    VehiclePricing,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum FareError {
    #[error("no pricing available for {category:?} on a {trip_type:?} trip")]
    PricingUnavailable {
        category: VehicleCategory,
        trip_type: TripType,
    },
}

/// Tunable surcharges and tax applied on top of the raw fare
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FareRules {
    pub tax_rate: f64,
    pub booking_fee: i64,
    /// Added when the pickup falls inside the night window
    pub night_charge: i64,
    /// Added on round and multi-city trips
    pub driver_allowance: i64,
    pub night_start: NaiveTime,
    pub night_end: NaiveTime,
}

impl Default for FareRules {
    fn default() -> Self {
        Self {
            tax_rate: 0.13,
            booking_fee: 50,
            night_charge: 200,
            driver_allowance: 300,
            night_start: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            night_end: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
        }
    }
}

/// Computes fares from a vehicle's pricing snapshot.
///
/// Two deliberate policy quirks are preserved for compatibility with the
/// rate sheets this engine replaces: autos charge a flat fare regardless of
/// distance, and banded rates saturate at the 150 km band (there is no
/// higher band, so longer trips keep that rate).
pub struct FareCalculator {
    rules: FareRules,
}

impl FareCalculator {
    pub fn new(rules: FareRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &FareRules {
        &self.rules
    }

    /// Raw fare before surcharges: the flat fare for autos, otherwise
    /// `round(rate * distance)` with the rate picked by distance band.
    /// Returns the per-km rate actually used, when one was.
    pub fn base_fare(
        pricing: &VehiclePricing,
        category: VehicleCategory,
        trip_type: TripType,
        distance_km: f64,
    ) -> Result<(i64, Option<f64>), FareError> {
        if category == VehicleCategory::Auto {
            let flat = pricing.flat.ok_or(FareError::PricingUnavailable {
                category,
                trip_type,
            })?;
            let fare = match trip_type {
                TripType::OneWay => flat.one_way,
                TripType::RoundTrip | TripType::MultiCity => flat.round_trip,
            };
            return Ok((fare, None));
        }

        let specific = match trip_type {
            TripType::OneWay => pricing.one_way,
            TripType::RoundTrip | TripType::MultiCity => pricing.round_trip,
        };
        let rates = specific
            .or(pricing.one_way)
            .ok_or(FareError::PricingUnavailable {
                category,
                trip_type,
            })?;
        let rate = band_rate(&rates, distance_km);
        Ok(((rate * distance_km).round() as i64, Some(rate)))
    }

    /// Full breakdown for a booking: base fare, named surcharges, tax and
    /// discount, with `total == subtotal + tax - discount`.
    pub fn quote(
        &self,
        pricing: &VehiclePricing,
        category: VehicleCategory,
        trip_type: TripType,
        distance_km: f64,
        pickup_time: NaiveTime,
        discount: i64,
    ) -> Result<FareBreakdown, FareError> {
        let (base_fare, rate_per_km) = Self::base_fare(pricing, category, trip_type, distance_km)?;

        let mut additional_charges = Vec::new();
        if self.rules.booking_fee > 0 {
            additional_charges.push(AdditionalCharge {
                kind: ChargeKind::BookingFee,
                amount: self.rules.booking_fee,
            });
        }
        if self.is_night_pickup(pickup_time) && self.rules.night_charge > 0 {
            additional_charges.push(AdditionalCharge {
                kind: ChargeKind::NightCharge,
                amount: self.rules.night_charge,
            });
        }
        if trip_type != TripType::OneWay && self.rules.driver_allowance > 0 {
            additional_charges.push(AdditionalCharge {
                kind: ChargeKind::DriverAllowance,
                amount: self.rules.driver_allowance,
            });
        }

        let extras: i64 = additional_charges.iter().map(|c| c.amount).sum();
        let subtotal = base_fare + extras;
        let tax = (subtotal as f64 * self.rules.tax_rate).round() as i64;
        let total = subtotal + tax - discount;

        Ok(FareBreakdown {
            base_fare,
            distance_km,
            rate_per_km,
            additional_charges,
            subtotal,
            tax,
            discount,
            total,
        })
    }

    fn is_night_pickup(&self, t: NaiveTime) -> bool {
        if self.rules.night_start <= self.rules.night_end {
            self.rules.night_start <= t && t < self.rules.night_end
        } else {
            t >= self.rules.night_start || t < self.rules.night_end
        }
    }
}

fn band_rate(rates: &BandedRates, distance_km: f64) -> f64 {
    if distance_km <= 50.0 {
        rates.upto_50_km
    } else if distance_km <= 100.0 {
        rates.upto_100_km
    } else {
        // no band above 150 km, longer trips saturate here
        rates.upto_150_km
    }
}
