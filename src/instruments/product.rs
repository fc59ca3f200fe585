//! Weighted, signed combinations of option legs on a single underlying.
//!
//! A [`StructuredProduct`] prices as `Σ side_i * weight_i * leg_i.price(S, tau + offset_i)`
//! and derives every Greek by finite differencing that aggregate, so products of
//! any shape share one risk implementation.

use serde::{Deserialize, Serialize};

use crate::core::{Greeks, PricingError, Side};
use crate::greeks::{self, BumpConfig, MarketShift, ScenarioPricer};
use crate::instruments::OptionLeg;

/// One position inside a structured product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductLeg {
    pub leg: OptionLeg,
    /// Number of units, strictly positive. Direction comes from `side`.
    pub weight: f64,
    pub side: Side,
    /// Extra years to this leg's maturity beyond the product's front maturity.
    #[serde(default)]
    pub maturity_offset: f64,
}

impl ProductLeg {
    pub fn new(leg: OptionLeg, weight: f64, side: Side) -> Self {
        Self {
            leg,
            weight,
            side,
            maturity_offset: 0.0,
        }
    }

    pub fn long(leg: OptionLeg, weight: f64) -> Self {
        Self::new(leg, weight, Side::Long)
    }

    pub fn short(leg: OptionLeg, weight: f64) -> Self {
        Self::new(leg, weight, Side::Short)
    }

    /// Moves this leg's maturity `offset` years past the product's front maturity.
    pub fn with_maturity_offset(mut self, offset: f64) -> Self {
        self.maturity_offset = offset;
        self
    }

    /// `side * weight`.
    #[inline]
    pub fn signed_weight(&self) -> f64 {
        self.side.sign() * self.weight
    }

    fn validate(&self, idx: usize) -> Result<(), PricingError> {
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(PricingError::InvalidParameter(format!(
                "leg {idx} weight must be finite and > 0, got {}",
                self.weight
            )));
        }
        if !self.maturity_offset.is_finite() || self.maturity_offset < 0.0 {
            return Err(PricingError::InvalidParameter(format!(
                "leg {idx} maturity offset must be finite and >= 0, got {}",
                self.maturity_offset
            )));
        }
        Ok(())
    }
}

/// Immutable structured product.
///
/// # Examples
/// ```
/// use structura::instruments::{OptionLeg, ProductLeg, StructuredProduct};
///
/// let call = OptionLeg::call(100.0, 0.2, 0.05, 0.0).unwrap();
/// let put = OptionLeg::put(100.0, 0.2, 0.05, 0.0).unwrap();
/// let straddle = StructuredProduct::new(vec![
///     ProductLeg::long(call, 1.0),
///     ProductLeg::long(put, 1.0),
/// ])
/// .unwrap();
///
/// let px = straddle.price(100.0, 1.0);
/// assert!((px - (call.price(100.0, 1.0) + put.price(100.0, 1.0))).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StructuredProductSpec", into = "StructuredProductSpec")]
pub struct StructuredProduct {
    legs: Vec<ProductLeg>,
    maturity: Option<f64>,
    label: Option<String>,
}

/// Unvalidated wire form of [`StructuredProduct`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredProductSpec {
    pub legs: Vec<ProductLeg>,
    #[serde(default)]
    pub maturity: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
}

impl StructuredProduct {
    /// Builds a product from a non-empty leg list.
    ///
    /// # Errors
    /// [`PricingError::InvalidParameter`] for an empty list, a non-positive
    /// weight, or a negative maturity offset.
    pub fn new(legs: Vec<ProductLeg>) -> Result<Self, PricingError> {
        if legs.is_empty() {
            return Err(PricingError::InvalidParameter(
                "structured product needs at least one leg".to_string(),
            ));
        }
        for (idx, leg) in legs.iter().enumerate() {
            leg.validate(idx)?;
        }
        Ok(Self {
            legs,
            maturity: None,
            label: None,
        })
    }

    /// Attaches the contract's front maturity in years.
    pub fn with_maturity(mut self, maturity: f64) -> Result<Self, PricingError> {
        if !maturity.is_finite() || maturity < 0.0 {
            return Err(PricingError::InvalidParameter(format!(
                "product maturity must be finite and >= 0, got {maturity}"
            )));
        }
        self.maturity = Some(maturity);
        Ok(self)
    }

    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn legs(&self) -> &[ProductLeg] {
        &self.legs
    }

    pub fn maturity(&self) -> Option<f64> {
        self.maturity
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Aggregate price at spot `spot` with `tau` years to the front maturity.
    pub fn price(&self, spot: f64, tau: f64) -> f64 {
        self.price_shifted(spot, tau, &MarketShift::NONE)
    }

    /// Aggregate price with a uniform vol/rate shift applied to every leg.
    pub fn price_shifted(&self, spot: f64, tau: f64, shift: &MarketShift) -> f64 {
        self.legs
            .iter()
            .map(|pl| {
                pl.signed_weight() * pl.leg.price_shifted(spot, tau + pl.maturity_offset, shift)
            })
            .sum()
    }

    /// Prices `elapsed` years after inception, i.e. at `tau = maturity - elapsed`.
    ///
    /// # Errors
    /// [`PricingError::InvalidParameter`] when no maturity is attached or
    /// `elapsed` falls outside `[0, maturity]`.
    pub fn price_at_elapsed(&self, spot: f64, elapsed: f64) -> Result<f64, PricingError> {
        let maturity = self.maturity.ok_or_else(|| {
            PricingError::InvalidParameter("product has no maturity attached".to_string())
        })?;
        if !elapsed.is_finite() || elapsed < 0.0 || elapsed > maturity {
            return Err(PricingError::InvalidParameter(format!(
                "elapsed time must lie in [0, {maturity}], got {elapsed}"
            )));
        }
        Ok(self.price(spot, maturity - elapsed))
    }

    /// Value at the front maturity: signed, weighted intrinsic of front legs plus the
    /// remaining time value of any later-dated legs.
    pub fn payoff(&self, spot: f64) -> f64 {
        self.price(spot, 0.0)
    }

    /// Lowest leg volatility, which bounds the downward vega bump.
    pub fn min_volatility(&self) -> f64 {
        self.legs
            .iter()
            .map(|pl| pl.leg.volatility())
            .fold(f64::INFINITY, f64::min)
    }

    pub fn delta(&self, spot: f64, tau: f64) -> f64 {
        self.delta_with(spot, tau, &BumpConfig::default())
    }

    pub fn gamma(&self, spot: f64, tau: f64) -> f64 {
        self.gamma_with(spot, tau, &BumpConfig::default())
    }

    pub fn theta(&self, spot: f64, tau: f64) -> f64 {
        self.theta_with(spot, tau, &BumpConfig::default())
    }

    pub fn vega(&self, spot: f64, tau: f64) -> f64 {
        self.vega_with(spot, tau, &BumpConfig::default())
    }

    pub fn rho(&self, spot: f64, tau: f64) -> f64 {
        self.rho_with(spot, tau, &BumpConfig::default())
    }

    pub fn delta_with(&self, spot: f64, tau: f64, bumps: &BumpConfig) -> f64 {
        greeks::delta(self, spot, tau, bumps)
    }

    pub fn gamma_with(&self, spot: f64, tau: f64, bumps: &BumpConfig) -> f64 {
        greeks::gamma(self, spot, tau, bumps)
    }

    pub fn theta_with(&self, spot: f64, tau: f64, bumps: &BumpConfig) -> f64 {
        greeks::theta(self, spot, tau, bumps)
    }

    pub fn vega_with(&self, spot: f64, tau: f64, bumps: &BumpConfig) -> f64 {
        greeks::vega(self, spot, tau, self.min_volatility(), bumps)
    }

    pub fn rho_with(&self, spot: f64, tau: f64, bumps: &BumpConfig) -> f64 {
        greeks::rho(self, spot, tau, bumps)
    }

    /// All five Greeks with default steps.
    pub fn greeks(&self, spot: f64, tau: f64) -> Greeks {
        self.greeks_with(spot, tau, &BumpConfig::default())
    }

    pub fn greeks_with(&self, spot: f64, tau: f64, bumps: &BumpConfig) -> Greeks {
        greeks::finite_difference_greeks(self, spot, tau, self.min_volatility(), bumps)
    }
}

impl ScenarioPricer for StructuredProduct {
    fn price_scenario(&self, spot: f64, tau: f64, shift: &MarketShift) -> f64 {
        self.price_shifted(spot, tau, shift)
    }
}

impl ScenarioPricer for OptionLeg {
    fn price_scenario(&self, spot: f64, tau: f64, shift: &MarketShift) -> f64 {
        self.price_shifted(spot, tau, shift)
    }
}

impl TryFrom<StructuredProductSpec> for StructuredProduct {
    type Error = PricingError;

    fn try_from(raw: StructuredProductSpec) -> Result<Self, Self::Error> {
        let mut product = Self::new(raw.legs)?;
        if let Some(maturity) = raw.maturity {
            product = product.with_maturity(maturity)?;
        }
        product.label = raw.label;
        Ok(product)
    }
}

impl From<StructuredProduct> for StructuredProductSpec {
    fn from(product: StructuredProduct) -> Self {
        Self {
            legs: product.legs,
            maturity: product.maturity,
            label: product.label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OptionType;
    use approx::assert_relative_eq;

    fn leg(option_type: OptionType, strike: f64) -> OptionLeg {
        OptionLeg::new(option_type, strike, 0.2, 0.05, 0.0).expect("valid leg")
    }

    #[test]
    fn price_is_signed_weighted_sum() {
        let c = leg(OptionType::Call, 95.0);
        let p = leg(OptionType::Put, 105.0);
        let product = StructuredProduct::new(vec![
            ProductLeg::long(c, 2.0),
            ProductLeg::short(p, 0.5),
        ])
        .expect("valid product");

        let expected = 2.0 * c.price(100.0, 0.75) - 0.5 * p.price(100.0, 0.75);
        assert_relative_eq!(product.price(100.0, 0.75), expected, epsilon = 1e-12);
    }

    #[test]
    fn rejects_empty_and_bad_weights() {
        assert!(matches!(
            StructuredProduct::new(Vec::new()),
            Err(PricingError::InvalidParameter(_))
        ));

        let c = leg(OptionType::Call, 100.0);
        assert!(StructuredProduct::new(vec![ProductLeg::long(c, 0.0)]).is_err());
        assert!(StructuredProduct::new(vec![ProductLeg::long(c, f64::NAN)]).is_err());
        assert!(
            StructuredProduct::new(vec![ProductLeg::long(c, 1.0).with_maturity_offset(-0.1)])
                .is_err()
        );
    }

    #[test]
    fn single_long_leg_greeks_match_leg() {
        let c = leg(OptionType::Call, 100.0);
        let product = StructuredProduct::new(vec![ProductLeg::long(c, 1.0)]).expect("valid");
        let g = product.greeks(100.0, 1.0);

        assert_relative_eq!(g.delta, product.delta(100.0, 1.0), epsilon = 1e-12);
        assert_relative_eq!(g.gamma, product.gamma(100.0, 1.0), epsilon = 1e-12);
        assert_relative_eq!(g.theta, product.theta(100.0, 1.0), epsilon = 1e-12);
        assert_relative_eq!(g.vega, product.vega(100.0, 1.0), epsilon = 1e-12);
        assert_relative_eq!(g.rho, product.rho(100.0, 1.0), epsilon = 1e-12);
        assert!((g.delta - 0.6368).abs() < 1e-4);
    }

    #[test]
    fn short_leg_flips_every_greek() {
        let c = leg(OptionType::Call, 100.0);
        let long = StructuredProduct::new(vec![ProductLeg::long(c, 1.0)]).expect("valid");
        let short = StructuredProduct::new(vec![ProductLeg::short(c, 1.0)]).expect("valid");

        let gl = long.greeks(100.0, 0.5);
        let gs = short.greeks(100.0, 0.5);
        assert_relative_eq!(gl.delta, -gs.delta, epsilon = 1e-12);
        assert_relative_eq!(gl.gamma, -gs.gamma, epsilon = 1e-12);
        assert_relative_eq!(gl.vega, -gs.vega, epsilon = 1e-12);
    }

    #[test]
    fn vega_is_additive_across_mixed_volatility_legs() {
        // Call struck at the forward with zero vol next to a 30% vol put.
        let flat = OptionLeg::call(100.0, 0.0, 0.05, 0.05).expect("valid leg");
        let wide = OptionLeg::put(90.0, 0.3, 0.05, 0.05).expect("valid leg");
        let flat_only = StructuredProduct::new(vec![ProductLeg::long(flat, 1.0)]).expect("valid");
        let wide_only = StructuredProduct::new(vec![ProductLeg::long(wide, 1.0)]).expect("valid");
        let mixed = StructuredProduct::new(vec![
            ProductLeg::long(flat, 1.0),
            ProductLeg::long(wide, 1.0),
        ])
        .expect("valid");

        let flat_vega = 100.0 * (-0.05f64).exp() * 0.398_942_280_401_432_7;
        assert_relative_eq!(flat_only.vega(100.0, 1.0), flat_vega, epsilon = 1e-3);
        assert_relative_eq!(mixed.min_volatility(), 0.0);
        assert_relative_eq!(
            mixed.vega(100.0, 1.0) - wide_only.vega(100.0, 1.0),
            flat_vega,
            epsilon = 1e-2
        );
    }

    #[test]
    fn greeks_do_not_mutate_product() {
        let c = leg(OptionType::Call, 100.0);
        let product = StructuredProduct::new(vec![ProductLeg::long(c, 1.0)]).expect("valid");
        let before = product.clone();
        let _ = product.greeks(100.0, 1.0);
        assert_eq!(product, before);
    }

    #[test]
    fn maturity_offset_extends_leg_tenor() {
        let c = leg(OptionType::Call, 100.0);
        let product =
            StructuredProduct::new(vec![ProductLeg::long(c, 1.0).with_maturity_offset(0.25)])
                .expect("valid");
        assert_relative_eq!(product.price(100.0, 0.5), c.price(100.0, 0.75), epsilon = 1e-14);
    }

    #[test]
    fn elapsed_pricing_requires_maturity() {
        let c = leg(OptionType::Call, 100.0);
        let product = StructuredProduct::new(vec![ProductLeg::long(c, 1.0)]).expect("valid");
        assert!(product.price_at_elapsed(100.0, 0.1).is_err());

        let product = product.with_maturity(1.0).expect("valid maturity");
        let px = product.price_at_elapsed(100.0, 0.25).expect("inside contract life");
        assert_relative_eq!(px, c.price(100.0, 0.75), epsilon = 1e-14);
        assert!(product.price_at_elapsed(100.0, 1.5).is_err());
        assert!(product.price_at_elapsed(100.0, -0.1).is_err());
    }

    #[test]
    fn serde_rejects_empty_products() {
        let c = leg(OptionType::Call, 100.0);
        let product = StructuredProduct::new(vec![ProductLeg::long(c, 1.0)])
            .expect("valid")
            .with_label("single call");
        let json = serde_json::to_string(&product).expect("serialize");
        let decoded: StructuredProduct = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded, product);

        assert!(serde_json::from_str::<StructuredProduct>(r#"{"legs":[]}"#).is_err());
    }
}
