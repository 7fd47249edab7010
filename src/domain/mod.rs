pub mod pricing;

// Re-export commonly used types
pub use pricing::{
    AffiliateEarning, AffiliateSchedule, DeliveryEstimate, DutyCharge, DutyRounding, FeeRange,
    FulfillmentFee, Money, OrderAttributes, OrderSize, PackagingFee, PriceBreakdown,
    PricingCalculator, PricingConfig, RateTable, Tier,
};

// Re-export errors from shared for convenience
pub use crate::shared::errors::ConfigError;
