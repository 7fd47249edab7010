//! Fee resolvers and the full-pricing aggregator
//!
//! Every resolver is a pure function of its inputs and the rate card it was
//! built with. Missing table entries resolve to the documented defaults;
//! nothing here can fail.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use super::affiliate::AffiliateEarning;
use super::model::{
    round_half_up, DeliveryEstimate, DutyCharge, DutyRounding, FulfillmentFee, Money,
    OrderAttributes, PackagingFee, PriceBreakdown,
};
use super::rate_card::PricingConfig;

fn record_fallback(component: &'static str) {
    metrics::counter!("pricing_fallbacks_total", "component" => component).increment(1);
}

/// Pricing calculator bound to one immutable rate card
#[derive(Debug, Clone)]
pub struct PricingCalculator {
    config: Arc<PricingConfig>,
}

impl PricingCalculator {
    /// The rate card is expected to be validated already.
    pub fn new(config: Arc<PricingConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Packaging fee for `quantity` units.
    ///
    /// Uses the first tier containing `quantity`; if none does, the fixed
    /// fallback unit fee applies.
    pub fn resolve_packaging_fee(&self, quantity: u64) -> PackagingFee {
        let unit_fee = match self
            .config
            .packaging_tiers
            .iter()
            .find(|tier| tier.contains(quantity))
        {
            Some(tier) => tier.unit_fee,
            None => {
                debug!(quantity, "No packaging tier matched, using fallback unit fee");
                record_fallback("packaging");
                self.config.fallback_unit_fee
            }
        };

        PackagingFee {
            unit_fee,
            total_fee: unit_fee.saturating_mul(Money::try_from(quantity).unwrap_or(Money::MAX)),
        }
    }

    /// Fulfillment fee: `subtotal × rate`, rounded half-up.
    pub fn resolve_fulfillment_fee(&self, subtotal: Money) -> FulfillmentFee {
        let rate = self.config.fulfillment_rate;
        FulfillmentFee {
            rate,
            amount: round_half_up(Decimal::from(subtotal) * rate),
        }
    }

    /// Duty on `product_value` for `category`.
    ///
    /// Under [`DutyRounding::Deferred`] the amount keeps fractional minor
    /// units.
    pub fn resolve_duty(&self, category: Option<&str>, product_value: Money) -> DutyCharge {
        let (rate, fallback) = self.config.duty_rates.lookup(category);
        if fallback {
            debug!(?category, "Unknown duty category, using default rate");
            record_fallback("duty");
        }

        let amount = Decimal::from(product_value) * *rate;
        let amount = match self.config.duty_rounding {
            DutyRounding::Deferred => amount,
            DutyRounding::PerComponent => Decimal::from(round_half_up(amount)),
        };

        DutyCharge {
            rate: *rate,
            amount,
        }
    }

    /// Delivery estimate: the midpoint of the region's configured range.
    pub fn resolve_delivery(&self, region: Option<&str>) -> DeliveryEstimate {
        let (range, fallback) = self.config.delivery_costs.lookup(region);
        if fallback {
            debug!(?region, "Unknown delivery region, using default range");
            record_fallback("delivery");
        }

        DeliveryEstimate {
            final_cost: range.midpoint(),
        }
    }

    /// Cross-border processing fee, or `None` when it does not apply.
    pub fn resolve_cross_border_fee(&self, cross_border: bool) -> Option<Money> {
        cross_border.then(|| self.config.cross_border_fee.midpoint())
    }

    /// Full price breakdown for an order.
    ///
    /// `total = subtotal + packaging + fulfillment + duty + delivery +
    /// cross-border fee`, rounded half-up once when the duty amount is
    /// fractional.
    pub fn resolve_full_pricing(&self, order: &OrderAttributes) -> PriceBreakdown {
        let special_packaging = self.resolve_packaging_fee(order.quantity);
        let fulfillment = self.resolve_fulfillment_fee(order.product_subtotal);
        let duty = self.resolve_duty(order.category.as_deref(), order.product_subtotal);
        let delivery = self.resolve_delivery(order.region.as_deref());
        let cross_border_fee = self.resolve_cross_border_fee(order.cross_border);

        let integral: Money = [
            order.product_subtotal,
            special_packaging.total_fee,
            fulfillment.amount,
            delivery.final_cost,
            cross_border_fee.unwrap_or(0),
        ]
        .iter()
        .fold(0, |acc: Money, amount| acc.saturating_add(*amount));

        let total = round_half_up(Decimal::from(integral) + duty.amount);

        debug!(
            subtotal = order.product_subtotal,
            quantity = order.quantity,
            total,
            "Full pricing resolved"
        );

        PriceBreakdown {
            special_packaging,
            fulfillment,
            duty,
            delivery,
            cross_border_fee,
            total,
        }
    }

    /// Affiliate commission owed by the platform for an order.
    pub fn resolve_affiliate_cost(
        &self,
        order_value: Money,
        has_affiliate: bool,
        has_supplier_referral: bool,
    ) -> AffiliateEarning {
        self.config
            .affiliate
            .estimate(order_value, has_affiliate, has_supplier_referral)
    }
}

impl Default for PricingCalculator {
    fn default() -> Self {
        Self::new(Arc::new(PricingConfig::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing::model::{FeeRange, RateTable, Tier};
    use rust_decimal_macros::dec;

    fn calculator() -> PricingCalculator {
        PricingCalculator::default()
    }

    /// Rate card whose default duty differs from every named category.
    fn distinct_default_calculator() -> PricingCalculator {
        let config = PricingConfig {
            duty_rates: RateTable::new(dec!(0.20))
                .with("electronics", dec!(0.10))
                .with("clothing", dec!(0.07)),
            delivery_costs: RateTable::new(FeeRange::new(4000, 5000))
                .with("lagos", FeeRange::new(1500, 2500)),
            ..PricingConfig::default()
        };
        PricingCalculator::new(Arc::new(config))
    }

    // ── Packaging ──────────────────────────────────────────────

    #[test]
    fn packaging_low_quantity_tier() {
        let fee = calculator().resolve_packaging_fee(50);
        assert_eq!(fee.unit_fee, 1000);
        assert_eq!(fee.total_fee, 50_000);
    }

    #[test]
    fn packaging_unbounded_tier() {
        let fee = calculator().resolve_packaging_fee(1500);
        assert_eq!(fee.unit_fee, 880);
        assert_eq!(fee.total_fee, 1_320_000);
    }

    #[test]
    fn packaging_tier_boundaries() {
        let calc = calculator();
        assert_eq!(calc.resolve_packaging_fee(100).unit_fee, 1000);
        assert_eq!(calc.resolve_packaging_fee(101).unit_fee, 980);
        assert_eq!(calc.resolve_packaging_fee(300).unit_fee, 950);
        assert_eq!(calc.resolve_packaging_fee(301).unit_fee, 930);
        assert_eq!(calc.resolve_packaging_fee(1000).unit_fee, 900);
        assert_eq!(calc.resolve_packaging_fee(1001).unit_fee, 880);
    }

    #[test]
    fn packaging_unit_fee_never_increases_with_quantity() {
        let calc = calculator();
        let mut previous = calc.resolve_packaging_fee(1).unit_fee;
        for quantity in 2..=2500 {
            let unit_fee = calc.resolve_packaging_fee(quantity).unit_fee;
            assert!(
                unit_fee <= previous,
                "unit fee rose from {} to {} at quantity {}",
                previous,
                unit_fee,
                quantity
            );
            previous = unit_fee;
        }
    }

    #[test]
    fn packaging_tail_covers_quantities_beyond_bounded_tiers() {
        let calc = calculator();
        let largest_bounded = calc
            .config()
            .packaging_tiers
            .iter()
            .filter_map(|tier| tier.max_quantity)
            .max()
            .unwrap();

        for quantity in [largest_bounded + 1, 10_000, 1_000_000] {
            assert_eq!(calc.resolve_packaging_fee(quantity).unit_fee, 880);
        }
    }

    #[test]
    fn packaging_total_saturates_for_huge_quantities() {
        let fee = calculator().resolve_packaging_fee(1u64 << 63);
        assert_eq!(fee.unit_fee, 880);
        assert_eq!(fee.total_fee, Money::MAX);

        let fee = calculator().resolve_packaging_fee(u64::MAX);
        assert!(fee.total_fee > 0);
    }

    #[test]
    fn packaging_falls_back_when_no_tier_matches() {
        let config = PricingConfig {
            packaging_tiers: vec![Tier::bounded(1, 10, 700)],
            fallback_unit_fee: 1000,
            ..PricingConfig::default()
        };
        let calc = PricingCalculator::new(Arc::new(config));

        let fee = calc.resolve_packaging_fee(11);
        assert_eq!(fee.unit_fee, 1000);
        assert_eq!(fee.total_fee, 11_000);
    }

    // ── Fulfillment ────────────────────────────────────────────

    #[test]
    fn fulfillment_is_five_point_two_percent() {
        let fee = calculator().resolve_fulfillment_fee(100_000);
        assert_eq!(fee.rate, dec!(0.052));
        assert_eq!(fee.amount, 5200);
    }

    #[test]
    fn fulfillment_zero_subtotal() {
        assert_eq!(calculator().resolve_fulfillment_fee(0).amount, 0);
    }

    #[test]
    fn fulfillment_rounds_half_up() {
        // 10 * 0.052 = 0.52 -> 1; 5 * 0.052 = 0.26 -> 0
        let calc = calculator();
        assert_eq!(calc.resolve_fulfillment_fee(10).amount, 1);
        assert_eq!(calc.resolve_fulfillment_fee(5).amount, 0);
        // 125 * 0.052 = 6.5 -> 7
        assert_eq!(calc.resolve_fulfillment_fee(125).amount, 7);
    }

    #[test]
    fn fulfillment_is_linear_up_to_rounding() {
        let calc = calculator();
        for subtotal in [1, 37, 999, 12_345, 100_000] {
            let base = calc.resolve_fulfillment_fee(subtotal).amount;
            for k in [2, 3, 10] {
                let scaled = calc.resolve_fulfillment_fee(subtotal * k).amount;
                assert!(
                    (scaled - k * base).abs() <= k,
                    "subtotal {} k {}: {} vs {}",
                    subtotal,
                    k,
                    scaled,
                    k * base
                );
            }
        }
    }

    // ── Duty ───────────────────────────────────────────────────

    #[test]
    fn duty_category_rate() {
        let duty = calculator().resolve_duty(Some("electronics"), 100_000);
        assert_eq!(duty.rate, dec!(0.10));
        assert_eq!(duty.amount, dec!(10000));
    }

    #[test]
    fn duty_unknown_and_empty_category_use_default() {
        let calc = distinct_default_calculator();
        let unknown = calc.resolve_duty(Some("totally-unknown-category"), 100_000);
        let empty = calc.resolve_duty(Some(""), 100_000);
        let absent = calc.resolve_duty(None, 100_000);

        assert_eq!(unknown.rate, dec!(0.20));
        assert_eq!(empty.rate, dec!(0.20));
        assert_eq!(absent.rate, dec!(0.20));
        assert_eq!(unknown.amount, dec!(20000));
    }

    #[test]
    fn duty_lookup_is_case_insensitive() {
        let calc = distinct_default_calculator();
        assert_eq!(
            calc.resolve_duty(Some("Electronics"), 54_321),
            calc.resolve_duty(Some("electronics"), 54_321)
        );
        assert_eq!(calc.resolve_duty(Some("CLOTHING"), 1000).rate, dec!(0.07));
    }

    #[test]
    fn duty_amount_is_not_rounded_by_default() {
        // 1234 * 0.07 = 86.38
        let duty = calculator().resolve_duty(Some("clothing"), 1234);
        assert_eq!(duty.amount, dec!(86.38));
    }

    #[test]
    fn duty_per_component_rounding() {
        let config = PricingConfig {
            duty_rounding: DutyRounding::PerComponent,
            ..PricingConfig::default()
        };
        let calc = PricingCalculator::new(Arc::new(config));
        assert_eq!(calc.resolve_duty(Some("clothing"), 1234).amount, dec!(86));
        // 50 * 0.07 = 3.5 -> 4
        assert_eq!(calc.resolve_duty(Some("clothing"), 50).amount, dec!(4));
    }

    // ── Delivery ───────────────────────────────────────────────

    #[test]
    fn delivery_is_midpoint_of_region_range() {
        assert_eq!(calculator().resolve_delivery(Some("lagos")).final_cost, 2000);
        assert_eq!(calculator().resolve_delivery(Some("LAGOS")).final_cost, 2000);
        assert_eq!(calculator().resolve_delivery(Some("north")).final_cost, 4500);
    }

    #[test]
    fn delivery_unknown_region_uses_default() {
        let calc = distinct_default_calculator();
        assert_eq!(calc.resolve_delivery(Some("mars")).final_cost, 4500);
        assert_eq!(calc.resolve_delivery(None).final_cost, 4500);
        assert_eq!(calc.resolve_delivery(Some("")).final_cost, 4500);
    }

    #[test]
    fn delivery_odd_range_rounds_half_up() {
        let config = PricingConfig {
            delivery_costs: RateTable::new(FeeRange::new(1000, 1001)),
            ..PricingConfig::default()
        };
        let calc = PricingCalculator::new(Arc::new(config));
        assert_eq!(calc.resolve_delivery(None).final_cost, 1001);
    }

    // ── Cross-border ───────────────────────────────────────────

    #[test]
    fn cross_border_fee_applies_only_when_flagged() {
        let calc = calculator();
        assert_eq!(calc.resolve_cross_border_fee(true), Some(750));
        assert_eq!(calc.resolve_cross_border_fee(false), None);
    }

    #[test]
    fn zero_cross_border_fee_is_distinct_from_absent() {
        let config = PricingConfig {
            cross_border_fee: FeeRange::new(0, 0),
            ..PricingConfig::default()
        };
        let calc = PricingCalculator::new(Arc::new(config));
        assert_eq!(calc.resolve_cross_border_fee(true), Some(0));
        assert_eq!(calc.resolve_cross_border_fee(false), None);
    }

    // ── Full pricing ───────────────────────────────────────────

    #[test]
    fn full_pricing_reference_scenario() {
        let order = OrderAttributes {
            product_subtotal: 100_000,
            quantity: 10,
            ..OrderAttributes::default()
        }
        .category("clothing")
        .region("lagos");

        let breakdown = calculator().resolve_full_pricing(&order);

        assert_eq!(breakdown.special_packaging.total_fee, 10_000);
        assert_eq!(breakdown.fulfillment.amount, 5200);
        assert_eq!(breakdown.duty.rate, dec!(0.07));
        assert_eq!(breakdown.duty.amount, dec!(7000));
        assert_eq!(breakdown.delivery.final_cost, 2000);
        assert_eq!(breakdown.cross_border_fee, None);
        assert_eq!(breakdown.total, 124_200);
    }

    #[test]
    fn full_pricing_adds_cross_border_fee() {
        let order = OrderAttributes {
            product_subtotal: 50_000,
            quantity: 1,
            ..OrderAttributes::default()
        }
        .category("shoes")
        .region("lagos")
        .cross_border(true);

        let breakdown = calculator().resolve_full_pricing(&order);

        assert_eq!(breakdown.cross_border_fee, Some(750));
        // 50000 + 1000 + 2600 + 5000 + 2000 + 750
        assert_eq!(breakdown.total, 61_350);
    }

    #[test]
    fn full_pricing_total_is_sum_of_components() {
        let calc = distinct_default_calculator();
        let orders = [
            OrderAttributes::from_unit_price(2000, 50).category("Clothing").region("Lagos"),
            OrderAttributes::from_unit_price(80_000, 25).category("electronics"),
            OrderAttributes::from_unit_price(1, 3000).region("north").cross_border(true),
            OrderAttributes::from_unit_price(0, 1),
        ];

        for order in &orders {
            let b = calc.resolve_full_pricing(order);
            let expected = Decimal::from(
                order.product_subtotal
                    + b.special_packaging.total_fee
                    + b.fulfillment.amount
                    + b.delivery.final_cost
                    + b.cross_border_fee.unwrap_or(0),
            ) + b.duty.amount;
            assert_eq!(b.total, round_half_up(expected), "order {:?}", order);
        }
    }

    #[test]
    fn full_pricing_rounds_fractional_duty_once() {
        // duty 1234 * 0.07 = 86.38; fulfillment round(64.168) = 64
        let order = OrderAttributes {
            product_subtotal: 1234,
            quantity: 1,
            ..OrderAttributes::default()
        }
        .category("clothing")
        .region("lagos");

        let breakdown = calculator().resolve_full_pricing(&order);
        assert_eq!(breakdown.duty.amount, dec!(86.38));
        // 1234 + 1000 + 64 + 86.38 + 2000 = 4384.38
        assert_eq!(breakdown.total, 4384);
    }

    #[test]
    fn full_pricing_is_deterministic() {
        let calc = calculator();
        let order = OrderAttributes::from_unit_price(777, 321)
            .category("industrial")
            .region("east")
            .cross_border(true);
        assert_eq!(calc.resolve_full_pricing(&order), calc.resolve_full_pricing(&order));
    }

    #[test]
    fn full_pricing_degrades_to_defaults() {
        let calc = distinct_default_calculator();
        let order = OrderAttributes {
            product_subtotal: 10_000,
            quantity: 1,
            category: Some("unknown".into()),
            region: Some("nowhere".into()),
            cross_border: false,
        };

        let breakdown = calc.resolve_full_pricing(&order);
        assert_eq!(breakdown.duty.rate, dec!(0.20));
        assert_eq!(breakdown.delivery.final_cost, 4500);
        // 10000 + 1000 + 520 + 2000 + 4500
        assert_eq!(breakdown.total, 18_020);
    }

    #[test]
    fn affiliate_cost_uses_rate_card_schedule() {
        let earning = calculator().resolve_affiliate_cost(100_000, true, true);
        assert_eq!(earning.total_affiliate_cost, 50 + 100 + 2000);
    }
}
