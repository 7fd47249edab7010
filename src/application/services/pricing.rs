//! Pricing service: quotes against the active rate card and swaps it
//! atomically on reconfiguration

use std::sync::{Arc, RwLock};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::pricing::{
    AffiliateEarning, Money, OrderAttributes, PriceBreakdown, PricingCalculator, PricingConfig,
};
use crate::shared::errors::ConfigError;

/// One loaded rate card and the calculator bound to it
#[derive(Debug)]
pub struct RateCardSnapshot {
    /// 1 for the card loaded at startup, +1 per replacement
    pub revision: u64,
    pub loaded_at: DateTime<Utc>,
    pub calculator: PricingCalculator,
}

impl RateCardSnapshot {
    pub fn config(&self) -> &PricingConfig {
        self.calculator.config()
    }
}

/// A price breakdown tagged with the rate card that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub revision: u64,
    pub currency: String,
    pub breakdown: PriceBreakdown,
    pub affiliate: Option<AffiliateEarning>,
}

/// Affiliate context of an order, when the caller wants the estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AffiliateContext {
    pub has_affiliate: bool,
    pub has_supplier_referral: bool,
}

pub type SharedPricingService = Arc<PricingService>;

/// Service for pricing operations
pub struct PricingService {
    current: RwLock<Arc<RateCardSnapshot>>,
}

impl PricingService {
    /// Validate `config` and make it the active rate card (revision 1).
    pub fn new(config: PricingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            tiers = config.packaging_tiers.len(),
            duty_categories = config.duty_rates.entries().len(),
            delivery_regions = config.delivery_costs.entries().len(),
            duty_rounding = %config.duty_rounding,
            "Rate card loaded"
        );

        Ok(Self {
            current: RwLock::new(Arc::new(RateCardSnapshot {
                revision: 1,
                loaded_at: Utc::now(),
                calculator: PricingCalculator::new(Arc::new(config)),
            })),
        })
    }

    pub fn shared(config: PricingConfig) -> Result<SharedPricingService, ConfigError> {
        Self::new(config).map(Arc::new)
    }

    /// The active rate card. Callers keep a consistent view for as long as
    /// they hold the returned `Arc`, even across a concurrent replacement.
    pub fn snapshot(&self) -> Arc<RateCardSnapshot> {
        let guard = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    pub fn revision(&self) -> u64 {
        self.snapshot().revision
    }

    /// Price an order against the active rate card.
    pub fn quote(&self, order: &OrderAttributes, affiliate: Option<AffiliateContext>) -> Quote {
        let started = Instant::now();
        let snapshot = self.snapshot();
        let calculator = &snapshot.calculator;

        let breakdown = calculator.resolve_full_pricing(order);
        let affiliate = affiliate.map(|ctx| {
            calculator.resolve_affiliate_cost(
                order.product_subtotal,
                ctx.has_affiliate,
                ctx.has_supplier_referral,
            )
        });

        metrics::counter!("pricing_quotes_total").increment(1);
        metrics::histogram!("pricing_quote_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        info!(
            revision = snapshot.revision,
            subtotal = order.product_subtotal,
            quantity = order.quantity,
            cross_border = order.cross_border,
            total = breakdown.total,
            "Quote calculated"
        );

        Quote {
            revision: snapshot.revision,
            currency: snapshot.config().currency.clone(),
            breakdown,
            affiliate,
        }
    }

    /// Validate `config` and atomically make it the active rate card.
    ///
    /// On validation failure the active card is left untouched. Returns the
    /// new revision.
    pub fn replace_config(&self, config: PricingConfig) -> Result<u64, ConfigError> {
        if let Err(e) = config.validate() {
            warn!(error = %e, "Rejected rate card replacement");
            return Err(e);
        }

        let tiers = config.packaging_tiers.len();
        let calculator = PricingCalculator::new(Arc::new(config));

        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let revision = guard.revision + 1;
        *guard = Arc::new(RateCardSnapshot {
            revision,
            loaded_at: Utc::now(),
            calculator,
        });
        drop(guard);

        metrics::counter!("pricing_rate_card_swaps_total").increment(1);
        info!(revision, tiers, "Rate card replaced");

        Ok(revision)
    }

    /// Grand total for `order` against the active rate card.
    pub fn preview_total(&self, order: &OrderAttributes) -> Money {
        self.snapshot().calculator.resolve_full_pricing(order).total
    }
}
