//! # Marketplace Pricing
//!
//! Fee composition engine for a B2B/B2C marketplace: given an order's
//! subtotal, quantity, product category, delivery region and cross-border
//! flag it produces an itemized price breakdown from a configurable rate
//! card.
//!
//! ## Architecture
//!
//! - **domain**: money model, rate card and the pure fee resolvers
//! - **application**: pricing service holding the active rate card
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: lifecycle of the HTTP server and tracing setup
//! - **shared**: errors, money formatting, shutdown coordination

pub mod application;
pub mod config;
pub mod domain;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use application::{PricingService, SharedPricingService};
pub use domain::pricing::{OrderAttributes, PriceBreakdown, PricingCalculator, PricingConfig};

// Re-export API router
pub use interfaces::http::create_api_router;
