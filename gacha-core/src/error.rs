//! Error types for catalog validation and call-site preconditions.
use thiserror::Error;

/// Catalog or configuration cannot support the requested operation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("Cards cannot be empty")]
    EmptyCatalog,
    #[error("All cards must have a usable weight")]
    UnusableWeight,
    #[error("All weights must be positive")]
    NonPositiveWeight,
    #[error("Total weight must be finite")]
    NonFiniteTotal,
    #[error("No cards with rarity {rarity} found")]
    NoGuaranteedItems { rarity: String },
    #[error("invalid pity config: {0}")]
    InvalidConfig(String),
}

/// A caller-supplied parameter violates its precondition.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("Draw count must be positive")]
    NonPositiveDrawCount,
    #[error("Pity count must be non-negative")]
    NegativePityCount,
    #[error("Guarantee limit must be positive")]
    NonPositiveGuaranteeLimit,
}

/// Every failure surfaced by the draw engine and the pity layer.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GachaError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigurationError),
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),
}

impl GachaError {
    /// True when the catalog or config must be fixed before retrying.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_))
    }

    /// True when the call site passed a bad parameter.
    #[must_use]
    pub const fn is_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

pub type GachaResult<T> = Result<T, GachaError>;
