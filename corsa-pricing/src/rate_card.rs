use std::collections::HashMap;

use corsa_domain::{
    BandedRates, FlatFares, PricingReference, VehicleCategory, VehiclePricing,
};

/// Configured pricing tables keyed by category/type/model. Vehicles resolve
/// their snapshot from here once and carry the denormalized copy.
#[derive(Debug, Clone, Default)]
pub struct RateCard {
    entries: HashMap<PricingReference, VehiclePricing>,
}

impl RateCard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: PricingReference, pricing: VehiclePricing) {
        self.entries.insert(normalize(reference), pricing);
    }

    /// Look up the snapshot for a vehicle's pricing reference
    pub fn resolve(&self, reference: &PricingReference) -> Option<VehiclePricing> {
        self.entries.get(&normalize(reference.clone())).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Type and model matching is case- and whitespace-insensitive
fn normalize(mut reference: PricingReference) -> PricingReference {
    reference.vehicle_type = reference.vehicle_type.trim().to_lowercase();
    reference.model = reference.model.trim().to_lowercase();
    reference
}

/// Starter rate card used by tests and fresh deployments
pub fn default_rate_card() -> RateCard {
    let mut card = RateCard::new();

    card.insert(
        PricingReference {
            category: VehicleCategory::Auto,
            vehicle_type: "three-wheeler".to_string(),
            model: "bajaj re".to_string(),
        },
        VehiclePricing {
            flat: Some(FlatFares {
                one_way: 500,
                round_trip: 900,
            }),
            one_way: None,
            round_trip: None,
        },
    );

    card.insert(
        PricingReference {
            category: VehicleCategory::Car,
            vehicle_type: "sedan".to_string(),
            model: "corolla".to_string(),
        },
        VehiclePricing {
            flat: None,
            one_way: Some(BandedRates {
                upto_50_km: 30.0,
                upto_100_km: 25.0,
                upto_150_km: 20.0,
            }),
            round_trip: Some(BandedRates {
                upto_50_km: 55.0,
                upto_100_km: 45.0,
                upto_150_km: 38.0,
            }),
        },
    );

    card.insert(
        PricingReference {
            category: VehicleCategory::Bus,
            vehicle_type: "coach".to_string(),
            model: "rosa".to_string(),
        },
        VehiclePricing {
            flat: None,
            one_way: Some(BandedRates {
                upto_50_km: 80.0,
                upto_100_km: 65.0,
                upto_150_km: 55.0,
            }),
            round_trip: None,
        },
    );

    card
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_is_case_insensitive() {
        let card = default_rate_card();
        let reference = PricingReference {
            category: VehicleCategory::Car,
            vehicle_type: "Sedan".to_string(),
            model: " COROLLA ".to_string(),
        };
        let pricing = card.resolve(&reference).expect("seeded entry");
        assert_eq!(pricing.one_way.unwrap().upto_50_km, 30.0);
    }

    #[test]
    fn unknown_reference_resolves_to_none() {
        let card = default_rate_card();
        let reference = PricingReference {
            category: VehicleCategory::Bus,
            vehicle_type: "minibus".to_string(),
            model: "hiace".to_string(),
        };
        assert!(card.resolve(&reference).is_none());
    }
}
