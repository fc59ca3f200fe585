//! Core domain types, the Greeks container, and the library-wide error type.

use serde::{Deserialize, Serialize};

pub mod types;

pub use types::*;

/// Standardized Greeks container returned by the finite-difference engine.
///
/// Units: `vega` per unit volatility (not per vol point), `rho` per unit rate,
/// `theta` per year of calendar time (negative for decaying long premium).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// First derivative to spot.
    pub delta: f64,
    /// Second derivative to spot.
    pub gamma: f64,
    /// First derivative to volatility.
    pub vega: f64,
    /// First derivative to calendar time.
    pub theta: f64,
    /// First derivative to rate.
    pub rho: f64,
}

/// Errors surfaced by leg construction, product assembly, and grid evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// A numeric input violates its domain (strike, vol, spot, maturity, slice shapes).
    InvalidParameter(String),
    /// A named product was requested with strikes or tenors its recipe cannot accept.
    InvalidRecipe(String),
}

impl std::fmt::Display for PricingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Self::InvalidRecipe(msg) => write!(f, "invalid recipe: {msg}"),
        }
    }
}

impl std::error::Error for PricingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_category() {
        let err = PricingError::InvalidParameter("strike must be > 0".to_string());
        assert_eq!(err.to_string(), "invalid parameter: strike must be > 0");

        let err = PricingError::InvalidRecipe("butterfly strikes must increase".to_string());
        assert!(err.to_string().starts_with("invalid recipe:"));
    }
}
