use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

/// Rejected rate card or unreadable configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Packaging tier table is empty")]
    EmptyTiers,

    #[error("First packaging tier must start at quantity 1, found {found}")]
    FirstTierStart { found: u64 },

    #[error("Packaging tier {index} starts at {found}, expected {expected} (gap or overlap)")]
    TierDiscontinuity {
        index: usize,
        expected: u64,
        found: u64,
    },

    #[error("Packaging tier {index}: max_quantity {max} is below min_quantity {min}")]
    TierInverted { index: usize, min: u64, max: u64 },

    #[error("Packaging tier {index} is unbounded but is not the last tier")]
    UnboundedNotLast { index: usize },

    #[error("Last packaging tier must be unbounded")]
    BoundedLastTier,

    #[error("{field} must not be negative, got {value}")]
    NegativeAmount { field: String, value: i64 },

    #[error("{field} must be within [0, 1], got {value}")]
    RateOutOfRange { field: String, value: Decimal },

    #[error("{field}: min {min} exceeds max {max}")]
    InvertedRange { field: String, min: i64, max: i64 },

    #[error("Rate table is missing the `default` entry")]
    MissingDefault,

    #[error("Rate table has an empty key")]
    EmptyKey,

    #[error("Rate table has duplicate key `{key}`")]
    DuplicateKey { key: String },

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
