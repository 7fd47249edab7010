//! Rate card: the complete set of pricing tables
//!
//! A rate card is validated once when it is loaded or replaced, and is
//! never mutated afterwards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::affiliate::AffiliateSchedule;
use super::model::{DutyRounding, FeeRange, Money, RateTable, Tier};
use crate::shared::errors::ConfigError;

/// Unit fee used when no packaging tier matches the quantity
pub const DEFAULT_FALLBACK_UNIT_FEE: Money = 1000;

/// Pricing configuration (rate card)
///
/// Every table has its own serde default, so a TOML `[pricing]` section can
/// override any one of them and keep the reference values for the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Display currency (ISO 4217). Amounts are not converted.
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_packaging_tiers")]
    pub packaging_tiers: Vec<Tier>,
    #[serde(default = "default_fallback_unit_fee")]
    pub fallback_unit_fee: Money,
    #[serde(default = "default_fulfillment_rate")]
    pub fulfillment_rate: Decimal,
    #[serde(default = "default_duty_rates")]
    pub duty_rates: RateTable<Decimal>,
    #[serde(default)]
    pub duty_rounding: DutyRounding,
    #[serde(default = "default_delivery_costs")]
    pub delivery_costs: RateTable<FeeRange>,
    #[serde(default = "default_cross_border_fee")]
    pub cross_border_fee: FeeRange,
    #[serde(default)]
    pub affiliate: AffiliateSchedule,
}

fn default_currency() -> String {
    "NGN".to_string()
}

fn default_packaging_tiers() -> Vec<Tier> {
    vec![
        Tier::bounded(1, 100, 1000),
        Tier::bounded(101, 200, 980),
        Tier::bounded(201, 300, 950),
        Tier::bounded(301, 500, 930),
        Tier::bounded(501, 1000, 900),
        Tier::unbounded(1001, 880),
    ]
}

fn default_fallback_unit_fee() -> Money {
    DEFAULT_FALLBACK_UNIT_FEE
}

fn default_fulfillment_rate() -> Decimal {
    Decimal::new(52, 3)
}

fn default_duty_rates() -> RateTable<Decimal> {
    RateTable::new(Decimal::new(10, 2))
        .with("electronics", Decimal::new(10, 2))
        .with("clothing", Decimal::new(7, 2))
        .with("industrial", Decimal::new(15, 2))
}

fn default_delivery_costs() -> RateTable<FeeRange> {
    RateTable::new(FeeRange::new(2000, 4500))
        .with("lagos", FeeRange::new(1500, 2500))
        .with("south_west", FeeRange::new(2000, 3500))
        .with("north", FeeRange::new(3000, 6000))
        .with("east", FeeRange::new(2500, 5000))
}

fn default_cross_border_fee() -> FeeRange {
    FeeRange::new(500, 1000)
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            packaging_tiers: default_packaging_tiers(),
            fallback_unit_fee: default_fallback_unit_fee(),
            fulfillment_rate: default_fulfillment_rate(),
            duty_rates: default_duty_rates(),
            duty_rounding: DutyRounding::default(),
            delivery_costs: default_delivery_costs(),
            cross_border_fee: default_cross_border_fee(),
            affiliate: AffiliateSchedule::default(),
        }
    }
}

impl PricingConfig {
    /// Check the structural invariants of every table.
    ///
    /// Unit fees that increase with quantity are reported with a warning
    /// but accepted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_tiers()?;
        non_negative("fallback_unit_fee", self.fallback_unit_fee)?;
        rate_in_range("fulfillment_rate", self.fulfillment_rate)?;

        for (key, rate) in self.duty_rates.iter() {
            rate_in_range(&format!("duty_rates.{}", key), *rate)?;
        }
        for (key, range) in self.delivery_costs.iter() {
            valid_range(&format!("delivery_costs.{}", key), range)?;
        }
        valid_range("cross_border_fee", &self.cross_border_fee)?;

        self.affiliate.validate()
    }

    fn validate_tiers(&self) -> Result<(), ConfigError> {
        let tiers = &self.packaging_tiers;
        let first = tiers.first().ok_or(ConfigError::EmptyTiers)?;
        if first.min_quantity != 1 {
            return Err(ConfigError::FirstTierStart {
                found: first.min_quantity,
            });
        }

        let last_index = tiers.len() - 1;
        let mut expected_min = 1;

        for (index, tier) in tiers.iter().enumerate() {
            if tier.min_quantity != expected_min {
                return Err(ConfigError::TierDiscontinuity {
                    index,
                    expected: expected_min,
                    found: tier.min_quantity,
                });
            }
            non_negative(&format!("packaging_tiers[{}].unit_fee", index), tier.unit_fee)?;

            match tier.max_quantity {
                Some(max) if max < tier.min_quantity => {
                    return Err(ConfigError::TierInverted {
                        index,
                        min: tier.min_quantity,
                        max,
                    });
                }
                Some(_) if index == last_index => return Err(ConfigError::BoundedLastTier),
                Some(max) => expected_min = max.saturating_add(1),
                None if index != last_index => {
                    return Err(ConfigError::UnboundedNotLast { index });
                }
                None => {}
            }
        }

        for (index, pair) in tiers.windows(2).enumerate() {
            if pair[1].unit_fee > pair[0].unit_fee {
                warn!(
                    tier = index + 1,
                    previous_fee = pair[0].unit_fee,
                    unit_fee = pair[1].unit_fee,
                    "Packaging unit fee increases with quantity"
                );
            }
        }

        Ok(())
    }
}

fn non_negative(field: &str, value: Money) -> Result<(), ConfigError> {
    if value < 0 {
        return Err(ConfigError::NegativeAmount {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

pub(crate) fn rate_in_range(field: &str, value: Decimal) -> Result<(), ConfigError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(ConfigError::RateOutOfRange {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

fn valid_range(field: &str, range: &FeeRange) -> Result<(), ConfigError> {
    non_negative(&format!("{}.min", field), range.min)?;
    if range.min > range.max {
        return Err(ConfigError::InvertedRange {
            field: field.to_string(),
            min: range.min,
            max: range.max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn reference_rate_card_is_valid() {
        assert!(PricingConfig::default().validate().is_ok());
    }

    #[test]
    fn reference_tiers_never_increase() {
        let config = PricingConfig::default();
        assert!(config
            .packaging_tiers
            .windows(2)
            .all(|pair| pair[0].unit_fee >= pair[1].unit_fee));
    }

    #[test]
    fn empty_tier_table_is_rejected() {
        let mut config = PricingConfig::default();
        config.packaging_tiers.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyTiers)));
    }

    #[test]
    fn first_tier_must_start_at_one() {
        let mut config = PricingConfig::default();
        config.packaging_tiers = vec![Tier::bounded(5, 10, 100), Tier::unbounded(11, 90)];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FirstTierStart { found: 5 })
        ));
    }

    #[test]
    fn gap_between_tiers_is_rejected() {
        let mut config = PricingConfig::default();
        config.packaging_tiers = vec![Tier::bounded(1, 100, 1000), Tier::unbounded(150, 900)];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TierDiscontinuity {
                index: 1,
                expected: 101,
                found: 150
            })
        ));
    }

    #[test]
    fn overlapping_tiers_are_rejected() {
        let mut config = PricingConfig::default();
        config.packaging_tiers = vec![Tier::bounded(1, 100, 1000), Tier::unbounded(90, 900)];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TierDiscontinuity { index: 1, .. })
        ));
    }

    #[test]
    fn inverted_tier_is_rejected() {
        let mut config = PricingConfig::default();
        config.packaging_tiers = vec![Tier::bounded(1, 0, 1000), Tier::unbounded(1, 900)];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TierInverted { index: 0, min: 1, max: 0 })
        ));
    }

    #[test]
    fn bounded_last_tier_is_rejected() {
        let mut config = PricingConfig::default();
        config.packaging_tiers = vec![Tier::bounded(1, 100, 1000)];
        assert!(matches!(config.validate(), Err(ConfigError::BoundedLastTier)));
    }

    #[test]
    fn unbounded_tier_must_be_last() {
        let mut config = PricingConfig::default();
        config.packaging_tiers = vec![Tier::unbounded(1, 1000), Tier::unbounded(101, 900)];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnboundedNotLast { index: 0 })
        ));
    }

    #[test]
    fn negative_unit_fee_is_rejected() {
        let mut config = PricingConfig::default();
        config.packaging_tiers = vec![Tier::unbounded(1, -5)];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeAmount { value: -5, .. })
        ));
    }

    #[test]
    fn negative_fallback_unit_fee_is_rejected() {
        let mut config = PricingConfig::default();
        config.fallback_unit_fee = -1;
        match config.validate() {
            Err(ConfigError::NegativeAmount { field, value }) => {
                assert_eq!(field, "fallback_unit_fee");
                assert_eq!(value, -1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn increasing_unit_fee_is_accepted() {
        let mut config = PricingConfig::default();
        config.packaging_tiers = vec![Tier::bounded(1, 10, 100), Tier::unbounded(11, 200)];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rate_above_one_is_rejected() {
        let mut config = PricingConfig::default();
        config.duty_rates = RateTable::new(dec!(0.10)).with("luxury", dec!(1.5));
        match config.validate() {
            Err(ConfigError::RateOutOfRange { field, value }) => {
                assert_eq!(field, "duty_rates.luxury");
                assert_eq!(value, dec!(1.5));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn negative_fulfillment_rate_is_rejected() {
        let mut config = PricingConfig::default();
        config.fulfillment_rate = dec!(-0.01);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RateOutOfRange { .. })
        ));
    }

    #[test]
    fn inverted_delivery_range_is_rejected() {
        let mut config = PricingConfig::default();
        config.delivery_costs = RateTable::new(FeeRange::new(2000, 4500))
            .with("north", FeeRange::new(6000, 3000));
        match config.validate() {
            Err(ConfigError::InvertedRange { field, min, max }) => {
                assert_eq!(field, "delivery_costs.north");
                assert_eq!((min, max), (6000, 3000));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn negative_cross_border_fee_is_rejected() {
        let mut config = PricingConfig::default();
        config.cross_border_fee = FeeRange::new(-1, 10);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeAmount { .. })
        ));
    }

    #[test]
    fn partial_toml_keeps_reference_tables() {
        let config: PricingConfig = toml::from_str(
            r#"
            fulfillment_rate = "0.06"

            [duty_rates]
            default = "0.05"
            Electronics = "0.12"
            "#,
        )
        .unwrap();

        assert_eq!(config.fulfillment_rate, dec!(0.06));
        assert_eq!(config.duty_rates.default_value(), &dec!(0.05));
        assert_eq!(
            config.duty_rates.lookup(Some("electronics")),
            (&dec!(0.12), false)
        );
        assert_eq!(config.packaging_tiers, PricingConfig::default().packaging_tiers);
        assert_eq!(config.delivery_costs, PricingConfig::default().delivery_costs);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_table_without_default_is_rejected() {
        let result: Result<PricingConfig, _> = toml::from_str(
            r#"
            [delivery_costs]
            lagos = { min = 1500, max = 2500 }
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn toml_tiers_with_unbounded_tail() {
        let config: PricingConfig = toml::from_str(
            r#"
            [[packaging_tiers]]
            min_quantity = 1
            max_quantity = 50
            unit_fee = 500

            [[packaging_tiers]]
            min_quantity = 51
            unit_fee = 400
            "#,
        )
        .unwrap();

        assert_eq!(
            config.packaging_tiers,
            vec![Tier::bounded(1, 50, 500), Tier::unbounded(51, 400)]
        );
        assert!(config.validate().is_ok());
    }
}
