//! Application services

mod pricing;

pub use pricing::{
    AffiliateContext, PricingService, Quote, RateCardSnapshot, SharedPricingService,
};
