//! Pricing module — quotes, fee components, rate card

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
