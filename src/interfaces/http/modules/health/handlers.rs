//! Health check handler

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::SharedPricingService;

/// Health check state
#[derive(Clone)]
pub struct HealthState {
    pub pricing: SharedPricingService,
    pub started_at: Arc<Instant>,
}

/// Service health response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub rate_card: RateCardHealth,
}

/// Active rate card summary
#[derive(Debug, Serialize, ToSchema)]
pub struct RateCardHealth {
    pub revision: u64,
    pub loaded_at: DateTime<Utc>,
    pub currency: String,
    pub packaging_tiers: usize,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> Json<HealthResponse> {
    let snapshot = state.pricing.snapshot();
    let config = snapshot.config();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        rate_card: RateCardHealth {
            revision: snapshot.revision,
            loaded_at: snapshot.loaded_at,
            currency: config.currency.clone(),
            packaging_tiers: config.packaging_tiers.len(),
        },
    })
}
