//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::SharedPricingService;
use crate::interfaces::http::common::ApiResponse;

use super::modules::{health, metrics, pricing, request_id};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Pricing
        pricing::quote_order,
        pricing::packaging_fee,
        pricing::fulfillment_fee,
        pricing::import_duty,
        pricing::delivery_estimate,
        pricing::affiliate_cost,
        // Rate card
        pricing::get_rate_card,
        pricing::replace_rate_card,
    ),
    components(
        schemas(
            ApiResponse<String>,
            health::HealthResponse,
            health::RateCardHealth,
            pricing::QuoteRequest,
            pricing::AffiliateContextDto,
            pricing::AffiliateRequest,
            pricing::QuoteResponse,
            pricing::PriceBreakdownResponse,
            pricing::PackagingFeeResponse,
            pricing::FulfillmentFeeResponse,
            pricing::DutyResponse,
            pricing::DeliveryResponse,
            pricing::AffiliateEarningResponse,
            pricing::RateCardResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Pricing", description = "Order quotes and individual fee components"),
        (name = "Rate Card", description = "Inspect and replace the active rate card"),
    ),
    info(
        title = "Marketplace Pricing API",
        version = "1.0.0",
        description = "Fee composition for marketplace orders: packaging, fulfillment, duty, delivery and cross-border surcharges",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(
    pricing_service: SharedPricingService,
    prometheus_handle: PrometheusHandle,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let health_state = health::HealthState {
        pricing: pricing_service.clone(),
        started_at: Arc::new(Instant::now()),
    };
    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health_state);

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::prometheus_metrics))
        .with_state(metrics::MetricsState {
            handle: prometheus_handle,
            pricing: pricing_service.clone(),
        });

    let pricing_routes = Router::new()
        .route("/quote", post(pricing::quote_order))
        .route("/packaging", get(pricing::packaging_fee))
        .route("/fulfillment", get(pricing::fulfillment_fee))
        .route("/duty", get(pricing::import_duty))
        .route("/delivery", get(pricing::delivery_estimate))
        .route("/affiliate", post(pricing::affiliate_cost))
        .route(
            "/rate-card",
            get(pricing::get_rate_card).put(pricing::replace_rate_card),
        )
        .with_state(pricing::PricingAppState {
            pricing: pricing_service,
        });

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .nest("/api/v1/pricing", pricing_routes)
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
}
