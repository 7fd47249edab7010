//! Pricing DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::{AffiliateContext, Quote, RateCardSnapshot};
use crate::domain::pricing::{
    AffiliateEarning, DeliveryEstimate, DutyCharge, FulfillmentFee, OrderAttributes,
    PackagingFee, PriceBreakdown, PricingConfig,
};
use crate::shared::money::format_minor_units;

// ── Requests ───────────────────────────────────────────────────

/// Order attributes to price
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct QuoteRequest {
    /// Product subtotal in minor units
    #[validate(range(min = 0, message = "product_subtotal must be non-negative"))]
    pub product_subtotal: i64,
    #[validate(range(
        min = 1,
        max = 1_000_000_000,
        message = "quantity must be between 1 and 1000000000"
    ))]
    pub quantity: u64,
    /// Product category (case-insensitive). Unknown or empty uses the default duty rate
    pub category: Option<String>,
    /// Delivery region (case-insensitive). Unknown or empty uses the default range
    pub region: Option<String>,
    /// Buyer is a consumer importing across the configured border
    #[serde(default)]
    pub cross_border: bool,
    /// Include the affiliate cost estimate in the response
    pub affiliate: Option<AffiliateContextDto>,
}

impl From<&QuoteRequest> for OrderAttributes {
    fn from(req: &QuoteRequest) -> Self {
        Self {
            product_subtotal: req.product_subtotal,
            quantity: req.quantity,
            category: req.category.clone(),
            region: req.region.clone(),
            cross_border: req.cross_border,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct AffiliateContextDto {
    #[serde(default)]
    pub has_affiliate: bool,
    #[serde(default)]
    pub has_supplier_referral: bool,
}

impl From<AffiliateContextDto> for AffiliateContext {
    fn from(dto: AffiliateContextDto) -> Self {
        Self {
            has_affiliate: dto.has_affiliate,
            has_supplier_referral: dto.has_supplier_referral,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AffiliateRequest {
    #[validate(range(min = 0, message = "order_value must be non-negative"))]
    pub order_value: i64,
    #[serde(default)]
    pub has_affiliate: bool,
    #[serde(default)]
    pub has_supplier_referral: bool,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PackagingQuery {
    #[validate(range(
        min = 1,
        max = 1_000_000_000,
        message = "quantity must be between 1 and 1000000000"
    ))]
    pub quantity: u64,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FulfillmentQuery {
    #[validate(range(min = 0, message = "subtotal must be non-negative"))]
    pub subtotal: i64,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DutyQuery {
    pub category: Option<String>,
    #[validate(range(min = 0, message = "product_value must be non-negative"))]
    pub product_value: i64,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeliveryQuery {
    pub region: Option<String>,
}

// ── Responses ──────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct PackagingFeeResponse {
    pub unit_fee: i64,
    pub total_fee: i64,
}

impl From<PackagingFee> for PackagingFeeResponse {
    fn from(fee: PackagingFee) -> Self {
        Self {
            unit_fee: fee.unit_fee,
            total_fee: fee.total_fee,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FulfillmentFeeResponse {
    pub rate: Decimal,
    pub amount: i64,
}

impl From<FulfillmentFee> for FulfillmentFeeResponse {
    fn from(fee: FulfillmentFee) -> Self {
        Self {
            rate: fee.rate,
            amount: fee.amount,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DutyResponse {
    pub rate: Decimal,
    /// May carry fractional minor units
    pub amount: Decimal,
}

impl From<DutyCharge> for DutyResponse {
    fn from(duty: DutyCharge) -> Self {
        Self {
            rate: duty.rate,
            amount: duty.amount,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeliveryResponse {
    #[serde(rename = "final")]
    pub final_cost: i64,
}

impl From<DeliveryEstimate> for DeliveryResponse {
    fn from(delivery: DeliveryEstimate) -> Self {
        Self {
            final_cost: delivery.final_cost,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PriceBreakdownResponse {
    pub special_packaging: PackagingFeeResponse,
    pub fulfillment: FulfillmentFeeResponse,
    pub duty: DutyResponse,
    pub delivery: DeliveryResponse,
    /// Omitted when the surcharge does not apply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_border_fee: Option<i64>,
    pub total: i64,
}

impl From<PriceBreakdown> for PriceBreakdownResponse {
    fn from(b: PriceBreakdown) -> Self {
        Self {
            special_packaging: b.special_packaging.into(),
            fulfillment: b.fulfillment.into(),
            duty: b.duty.into(),
            delivery: b.delivery.into(),
            cross_border_fee: b.cross_border_fee,
            total: b.total,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AffiliateEarningResponse {
    pub order_size: String,
    pub per_signup: i64,
    pub per_sale_percent: Decimal,
    pub per_supplier_verify: i64,
    pub estimated_sale_commission: i64,
    pub total_affiliate_cost: i64,
}

impl From<AffiliateEarning> for AffiliateEarningResponse {
    fn from(e: AffiliateEarning) -> Self {
        Self {
            order_size: e.order_size.to_string(),
            per_signup: e.per_signup,
            per_sale_percent: e.per_sale_percent,
            per_supplier_verify: e.per_supplier_verify,
            estimated_sale_commission: e.estimated_sale_commission,
            total_affiliate_cost: e.total_affiliate_cost,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuoteResponse {
    pub breakdown: PriceBreakdownResponse,
    pub currency: String,
    pub formatted_total: String,
    /// Revision of the rate card that produced this quote
    pub rate_card_revision: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliate: Option<AffiliateEarningResponse>,
}

impl From<Quote> for QuoteResponse {
    fn from(q: Quote) -> Self {
        Self {
            formatted_total: format_minor_units(q.breakdown.total, &q.currency),
            currency: q.currency,
            rate_card_revision: q.revision,
            breakdown: q.breakdown.into(),
            affiliate: q.affiliate.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RateCardResponse {
    pub revision: u64,
    pub loaded_at: DateTime<Utc>,
    #[schema(value_type = Object)]
    pub rate_card: PricingConfig,
}

impl From<&RateCardSnapshot> for RateCardResponse {
    fn from(s: &RateCardSnapshot) -> Self {
        Self {
            revision: s.revision,
            loaded_at: s.loaded_at,
            rate_card: s.config().clone(),
        }
    }
}
