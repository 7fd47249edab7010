//! Pricing REST API handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use super::dto::{
    AffiliateEarningResponse, AffiliateRequest, DeliveryQuery, DeliveryResponse, DutyQuery,
    DutyResponse, FulfillmentFeeResponse, FulfillmentQuery, PackagingFeeResponse,
    PackagingQuery, QuoteRequest, QuoteResponse, RateCardResponse,
};
use crate::application::SharedPricingService;
use crate::domain::pricing::{OrderAttributes, PricingConfig};
use crate::interfaces::http::common::{ApiResponse, ValidatedJson, ValidatedQuery};

type ApiError = (StatusCode, Json<ApiResponse<()>>);

/// State shared by the pricing routes
#[derive(Clone)]
pub struct PricingAppState {
    pub pricing: SharedPricingService,
}

#[utoipa::path(
    post,
    path = "/api/v1/pricing/quote",
    tag = "Pricing",
    request_body = QuoteRequest,
    responses(
        (status = 200, description = "Full price breakdown", body = ApiResponse<QuoteResponse>),
        (status = 400, description = "Malformed JSON"),
        (status = 422, description = "Invalid order attributes")
    )
)]
pub async fn quote_order(
    State(state): State<PricingAppState>,
    ValidatedJson(request): ValidatedJson<QuoteRequest>,
) -> Json<ApiResponse<QuoteResponse>> {
    let order = OrderAttributes::from(&request);
    let quote = state
        .pricing
        .quote(&order, request.affiliate.map(Into::into));
    Json(ApiResponse::success(quote.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/pricing/packaging",
    tag = "Pricing",
    params(PackagingQuery),
    responses(
        (status = 200, description = "Special packaging fee", body = ApiResponse<PackagingFeeResponse>),
        (status = 422, description = "Quantity out of range")
    )
)]
pub async fn packaging_fee(
    State(state): State<PricingAppState>,
    ValidatedQuery(query): ValidatedQuery<PackagingQuery>,
) -> Json<ApiResponse<PackagingFeeResponse>> {
    let fee = state
        .pricing
        .snapshot()
        .calculator
        .resolve_packaging_fee(query.quantity);
    Json(ApiResponse::success(fee.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/pricing/fulfillment",
    tag = "Pricing",
    params(FulfillmentQuery),
    responses(
        (status = 200, description = "Fulfillment fee", body = ApiResponse<FulfillmentFeeResponse>),
        (status = 422, description = "Negative subtotal")
    )
)]
pub async fn fulfillment_fee(
    State(state): State<PricingAppState>,
    ValidatedQuery(query): ValidatedQuery<FulfillmentQuery>,
) -> Json<ApiResponse<FulfillmentFeeResponse>> {
    let fee = state
        .pricing
        .snapshot()
        .calculator
        .resolve_fulfillment_fee(query.subtotal);
    Json(ApiResponse::success(fee.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/pricing/duty",
    tag = "Pricing",
    params(DutyQuery),
    responses(
        (status = 200, description = "Import duty", body = ApiResponse<DutyResponse>),
        (status = 422, description = "Negative product value")
    )
)]
pub async fn import_duty(
    State(state): State<PricingAppState>,
    ValidatedQuery(query): ValidatedQuery<DutyQuery>,
) -> Json<ApiResponse<DutyResponse>> {
    let duty = state
        .pricing
        .snapshot()
        .calculator
        .resolve_duty(query.category.as_deref(), query.product_value);
    Json(ApiResponse::success(duty.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/pricing/delivery",
    tag = "Pricing",
    params(DeliveryQuery),
    responses(
        (status = 200, description = "Delivery cost estimate", body = ApiResponse<DeliveryResponse>)
    )
)]
pub async fn delivery_estimate(
    State(state): State<PricingAppState>,
    ValidatedQuery(query): ValidatedQuery<DeliveryQuery>,
) -> Json<ApiResponse<DeliveryResponse>> {
    let delivery = state
        .pricing
        .snapshot()
        .calculator
        .resolve_delivery(query.region.as_deref());
    Json(ApiResponse::success(delivery.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/pricing/affiliate",
    tag = "Pricing",
    request_body = AffiliateRequest,
    responses(
        (status = 200, description = "Affiliate cost estimate", body = ApiResponse<AffiliateEarningResponse>),
        (status = 422, description = "Negative order value")
    )
)]
pub async fn affiliate_cost(
    State(state): State<PricingAppState>,
    ValidatedJson(request): ValidatedJson<AffiliateRequest>,
) -> Json<ApiResponse<AffiliateEarningResponse>> {
    let earning = state.pricing.snapshot().calculator.resolve_affiliate_cost(
        request.order_value,
        request.has_affiliate,
        request.has_supplier_referral,
    );
    Json(ApiResponse::success(earning.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/pricing/rate-card",
    tag = "Rate Card",
    responses(
        (status = 200, description = "Active rate card", body = ApiResponse<RateCardResponse>)
    )
)]
pub async fn get_rate_card(
    State(state): State<PricingAppState>,
) -> Json<ApiResponse<RateCardResponse>> {
    let snapshot = state.pricing.snapshot();
    Json(ApiResponse::success(RateCardResponse::from(&*snapshot)))
}

#[utoipa::path(
    put,
    path = "/api/v1/pricing/rate-card",
    tag = "Rate Card",
    request_body(content = Object, description = "Complete rate card; omitted keys take their defaults"),
    responses(
        (status = 200, description = "Rate card replaced", body = ApiResponse<RateCardResponse>),
        (status = 400, description = "Malformed JSON"),
        (status = 422, description = "Rate card rejected; the active card is unchanged")
    )
)]
pub async fn replace_rate_card(
    State(state): State<PricingAppState>,
    payload: Result<Json<PricingConfig>, JsonRejection>,
) -> Result<Json<ApiResponse<RateCardResponse>>, ApiError> {
    let Json(config) = payload.map_err(|rejection| {
        let status = match &rejection {
            JsonRejection::JsonDataError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::BAD_REQUEST,
        };
        (
            status,
            Json(ApiResponse::error(format!("Invalid rate card: {}", rejection))),
        )
    })?;

    let revision = state.pricing.replace_config(config).map_err(|e| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::error(format!("Invalid rate card: {}", e))),
        )
    })?;

    info!(revision, "Rate card replaced via API");
    let snapshot = state.pricing.snapshot();
    Ok(Json(ApiResponse::success(RateCardResponse::from(&*snapshot))))
}
