pub mod health;
pub mod metrics;
pub mod pricing;
pub mod request_id;
