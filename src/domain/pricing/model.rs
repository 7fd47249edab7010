//! Pricing domain entities
//!
//! All money values are integers in minor currency units (kobo, cents).
//! Rates are exact decimal fractions, so `0.052` stays `0.052`.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::shared::errors::ConfigError;

/// Amount in minor currency units
pub type Money = i64;

/// Round half-up (away from zero) to whole minor units.
pub fn round_half_up(value: Decimal) -> Money {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    rounded.to_i64().unwrap_or(if rounded.is_sign_negative() {
        Money::MIN
    } else {
        Money::MAX
    })
}

/// Normalized lookup key: trimmed and lower-cased.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Packaging tier: a quantity range mapped to a per-unit fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub min_quantity: u64,
    /// `None` means unbounded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_quantity: Option<u64>,
    pub unit_fee: Money,
}

impl Tier {
    pub const fn bounded(min_quantity: u64, max_quantity: u64, unit_fee: Money) -> Self {
        Self {
            min_quantity,
            max_quantity: Some(max_quantity),
            unit_fee,
        }
    }

    pub const fn unbounded(min_quantity: u64, unit_fee: Money) -> Self {
        Self {
            min_quantity,
            max_quantity: None,
            unit_fee,
        }
    }

    pub fn contains(&self, quantity: u64) -> bool {
        quantity >= self.min_quantity && self.max_quantity.map_or(true, |max| quantity <= max)
    }
}

/// Inclusive `{min, max}` money range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRange {
    pub min: Money,
    pub max: Money,
}

impl FeeRange {
    pub const fn new(min: Money, max: Money) -> Self {
        Self { min, max }
    }

    /// Midpoint of the range, rounded half-up
    pub fn midpoint(&self) -> Money {
        round_half_up((Decimal::from(self.min) + Decimal::from(self.max)) / Decimal::TWO)
    }
}

/// Case-insensitive keyed table with a mandatory `default` entry.
///
/// Serialized as a flat map where the fallback lives under the `default` key,
/// e.g. `{ default = 0.10, electronics = 0.10 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, V>",
    into = "BTreeMap<String, V>",
    bound(
        serialize = "V: Serialize + Clone",
        deserialize = "V: Deserialize<'de>"
    )
)]
pub struct RateTable<V> {
    default: V,
    entries: BTreeMap<String, V>,
}

/// Key holding the fallback entry of a [`RateTable`]
pub const DEFAULT_KEY: &str = "default";

impl<V> RateTable<V> {
    pub fn new(default: V) -> Self {
        Self {
            default,
            entries: BTreeMap::new(),
        }
    }

    /// Add an entry; the key is normalized. The `default` key replaces the
    /// fallback entry.
    pub fn with(mut self, key: &str, value: V) -> Self {
        let normalized = normalize_key(key);
        if normalized == DEFAULT_KEY {
            self.default = value;
        } else {
            self.entries.insert(normalized, value);
        }
        self
    }

    pub fn default_value(&self) -> &V {
        &self.default
    }

    /// Named entries (without `default`), keyed by normalized name
    pub fn entries(&self) -> &BTreeMap<String, V> {
        &self.entries
    }

    /// Look up `key`, falling back to the default entry when the key is
    /// absent, empty or unknown. The flag is `true` on fallback.
    pub fn lookup(&self, key: Option<&str>) -> (&V, bool) {
        let normalized = key.map(normalize_key).unwrap_or_default();
        if normalized.is_empty() {
            return (&self.default, true);
        }
        match self.entries.get(&normalized) {
            Some(value) => (value, false),
            None => (&self.default, true),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        std::iter::once((DEFAULT_KEY, &self.default))
            .chain(self.entries.iter().map(|(k, v)| (k.as_str(), v)))
    }
}

impl<V> TryFrom<BTreeMap<String, V>> for RateTable<V> {
    type Error = ConfigError;

    fn try_from(raw: BTreeMap<String, V>) -> Result<Self, Self::Error> {
        let mut default = None;
        let mut entries = BTreeMap::new();

        for (key, value) in raw {
            let normalized = normalize_key(&key);
            if normalized == DEFAULT_KEY {
                if default.replace(value).is_some() {
                    return Err(ConfigError::DuplicateKey { key: normalized });
                }
            } else if normalized.is_empty() {
                return Err(ConfigError::EmptyKey);
            } else if entries.insert(normalized.clone(), value).is_some() {
                return Err(ConfigError::DuplicateKey { key: normalized });
            }
        }

        let default = default.ok_or(ConfigError::MissingDefault)?;
        Ok(Self { default, entries })
    }
}

impl<V> From<RateTable<V>> for BTreeMap<String, V> {
    fn from(table: RateTable<V>) -> Self {
        let mut map = table.entries;
        map.insert(DEFAULT_KEY.to_string(), table.default);
        map
    }
}

/// How the duty amount is rounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyRounding {
    /// Duty keeps fractional minor units; the grand total is rounded once.
    #[default]
    Deferred,
    /// Duty is rounded half-up like every other component.
    PerComponent,
}

impl std::fmt::Display for DutyRounding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deferred => write!(f, "deferred"),
            Self::PerComponent => write!(f, "per_component"),
        }
    }
}

/// Order attributes supplied by the checkout flow
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderAttributes {
    /// Must be `>= 0`
    pub product_subtotal: Money,
    /// Must be `>= 1`
    pub quantity: u64,
    pub category: Option<String>,
    pub region: Option<String>,
    /// Buyer is a consumer importing across the configured border
    pub cross_border: bool,
}

impl OrderAttributes {
    /// Attributes for `quantity` units at `unit_price` each
    pub fn from_unit_price(unit_price: Money, quantity: u64) -> Self {
        Self {
            product_subtotal: unit_price
                .saturating_mul(Money::try_from(quantity).unwrap_or(Money::MAX)),
            quantity,
            ..Self::default()
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn cross_border(mut self, cross_border: bool) -> Self {
        self.cross_border = cross_border;
        self
    }
}

/// Packaging component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackagingFee {
    pub unit_fee: Money,
    pub total_fee: Money,
}

/// Fulfillment component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FulfillmentFee {
    pub rate: Decimal,
    pub amount: Money,
}

/// Duty component. `amount` may carry fractional minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyCharge {
    pub rate: Decimal,
    pub amount: Decimal,
}

/// Delivery component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryEstimate {
    pub final_cost: Money,
}

/// Itemized price for one order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub special_packaging: PackagingFee,
    pub fulfillment: FulfillmentFee,
    pub duty: DutyCharge,
    pub delivery: DeliveryEstimate,
    /// `None` when the surcharge does not apply (distinct from a zero fee)
    pub cross_border_fee: Option<Money>,
    pub total: Money,
}
