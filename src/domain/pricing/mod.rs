//! Order pricing: rate card, fee resolvers and the full-pricing aggregator

pub mod affiliate;
pub mod calculator;
pub mod model;
pub mod rate_card;

pub use affiliate::{AffiliateEarning, AffiliateSchedule, OrderSize};
pub use calculator::PricingCalculator;
pub use model::{
    normalize_key, round_half_up, DeliveryEstimate, DutyCharge, DutyRounding, FeeRange,
    FulfillmentFee, Money, OrderAttributes, PackagingFee, PriceBreakdown, RateTable, Tier,
};
pub use rate_card::{PricingConfig, DEFAULT_FALLBACK_UNIT_FEE};
