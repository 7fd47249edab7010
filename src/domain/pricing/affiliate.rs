//! Affiliate cost estimate
//!
//! Commission the platform owes to affiliates for an order. It is a cost to
//! the platform and never part of the buyer's payable total.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::model::{round_half_up, Money};
use super::rate_card::rate_in_range;
use crate::shared::errors::ConfigError;

/// Order size class, derived from the product total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSize {
    Small,
    Medium,
    Large,
}

impl std::fmt::Display for OrderSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Small => write!(f, "SMALL"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::Large => write!(f, "LARGE"),
        }
    }
}

/// Affiliate commission schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffiliateSchedule {
    /// Flat fee per referred signup
    pub per_signup: Money,
    /// Flat fee when the order's supplier was referred
    pub per_supplier_verify: Money,
    /// Orders at or above this total are MEDIUM
    pub medium_order_threshold: Money,
    /// Orders at or above this total are LARGE
    pub large_order_threshold: Money,
    pub small_sale_rate: Decimal,
    pub medium_sale_rate: Decimal,
    pub large_sale_rate: Decimal,
}

impl Default for AffiliateSchedule {
    fn default() -> Self {
        Self {
            per_signup: 50,
            per_supplier_verify: 100,
            medium_order_threshold: 50_000,
            large_order_threshold: 300_000,
            small_sale_rate: Decimal::new(1, 2),
            medium_sale_rate: Decimal::new(2, 2),
            large_sale_rate: Decimal::new(3, 2),
        }
    }
}

impl AffiliateSchedule {
    pub fn order_size(&self, order_value: Money) -> OrderSize {
        if order_value < self.medium_order_threshold {
            OrderSize::Small
        } else if order_value < self.large_order_threshold {
            OrderSize::Medium
        } else {
            OrderSize::Large
        }
    }

    pub fn sale_rate(&self, size: OrderSize) -> Decimal {
        match size {
            OrderSize::Small => self.small_sale_rate,
            OrderSize::Medium => self.medium_sale_rate,
            OrderSize::Large => self.large_sale_rate,
        }
    }

    /// Estimate the affiliate cost of an order worth `order_value`.
    pub fn estimate(
        &self,
        order_value: Money,
        has_affiliate: bool,
        has_supplier_referral: bool,
    ) -> AffiliateEarning {
        let per_supplier_verify = if has_supplier_referral {
            self.per_supplier_verify
        } else {
            0
        };

        if !has_affiliate {
            return AffiliateEarning {
                order_size: self.order_size(order_value),
                per_signup: self.per_signup,
                per_sale_percent: Decimal::ZERO,
                per_supplier_verify,
                estimated_sale_commission: 0,
                total_affiliate_cost: per_supplier_verify,
            };
        }

        let order_size = self.order_size(order_value);
        let per_sale_percent = self.sale_rate(order_size);
        let estimated_sale_commission = round_half_up(Decimal::from(order_value) * per_sale_percent);

        AffiliateEarning {
            order_size,
            per_signup: self.per_signup,
            per_sale_percent,
            per_supplier_verify,
            estimated_sale_commission,
            total_affiliate_cost: self
                .per_signup
                .saturating_add(per_supplier_verify)
                .saturating_add(estimated_sale_commission),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("affiliate.per_signup", self.per_signup),
            ("affiliate.per_supplier_verify", self.per_supplier_verify),
            ("affiliate.medium_order_threshold", self.medium_order_threshold),
        ] {
            if value < 0 {
                return Err(ConfigError::NegativeAmount {
                    field: field.to_string(),
                    value,
                });
            }
        }
        if self.medium_order_threshold > self.large_order_threshold {
            return Err(ConfigError::InvertedRange {
                field: "affiliate.order_thresholds".to_string(),
                min: self.medium_order_threshold,
                max: self.large_order_threshold,
            });
        }
        rate_in_range("affiliate.small_sale_rate", self.small_sale_rate)?;
        rate_in_range("affiliate.medium_sale_rate", self.medium_sale_rate)?;
        rate_in_range("affiliate.large_sale_rate", self.large_sale_rate)
    }
}

/// Affiliate cost breakdown for one order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffiliateEarning {
    pub order_size: OrderSize,
    pub per_signup: Money,
    pub per_sale_percent: Decimal,
    pub per_supplier_verify: Money,
    pub estimated_sale_commission: Money,
    pub total_affiliate_cost: Money,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_size_boundaries() {
        let schedule = AffiliateSchedule::default();
        assert_eq!(schedule.order_size(0), OrderSize::Small);
        assert_eq!(schedule.order_size(49_999), OrderSize::Small);
        assert_eq!(schedule.order_size(50_000), OrderSize::Medium);
        assert_eq!(schedule.order_size(299_999), OrderSize::Medium);
        assert_eq!(schedule.order_size(300_000), OrderSize::Large);
    }

    #[test]
    fn no_affiliate_costs_only_supplier_referral() {
        let schedule = AffiliateSchedule::default();

        let plain = schedule.estimate(100_000, false, false);
        assert_eq!(plain.per_sale_percent, Decimal::ZERO);
        assert_eq!(plain.estimated_sale_commission, 0);
        assert_eq!(plain.total_affiliate_cost, 0);

        let referred = schedule.estimate(100_000, false, true);
        assert_eq!(referred.per_supplier_verify, 100);
        assert_eq!(referred.total_affiliate_cost, 100);
    }

    #[test]
    fn medium_order_with_affiliate() {
        let earning = AffiliateSchedule::default().estimate(100_000, true, false);
        assert_eq!(earning.order_size, OrderSize::Medium);
        assert_eq!(earning.per_sale_percent, dec!(0.02));
        assert_eq!(earning.estimated_sale_commission, 2000);
        assert_eq!(earning.total_affiliate_cost, 50 + 2000);
    }

    #[test]
    fn large_order_with_affiliate_and_referral() {
        let earning = AffiliateSchedule::default().estimate(2_000_000, true, true);
        assert_eq!(earning.order_size, OrderSize::Large);
        assert_eq!(earning.estimated_sale_commission, 60_000);
        assert_eq!(earning.total_affiliate_cost, 50 + 100 + 60_000);
    }

    #[test]
    fn commission_rounds_half_up() {
        // 150 * 0.01 = 1.5
        let earning = AffiliateSchedule::default().estimate(150, true, false);
        assert_eq!(earning.estimated_sale_commission, 2);
    }

    #[test]
    fn total_cost_saturates_at_money_max() {
        let schedule = AffiliateSchedule {
            large_sale_rate: dec!(1),
            ..AffiliateSchedule::default()
        };
        assert!(schedule.validate().is_ok());

        let earning = schedule.estimate(Money::MAX, true, true);
        assert_eq!(earning.estimated_sale_commission, Money::MAX);
        assert_eq!(earning.total_affiliate_cost, Money::MAX);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let schedule = AffiliateSchedule {
            medium_order_threshold: 500_000,
            ..AffiliateSchedule::default()
        };
        assert!(matches!(
            schedule.validate(),
            Err(ConfigError::InvertedRange { .. })
        ));
    }

    #[test]
    fn order_size_display() {
        assert_eq!(OrderSize::Small.to_string(), "SMALL");
        assert_eq!(OrderSize::Large.to_string(), "LARGE");
    }
}
