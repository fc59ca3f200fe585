//! Price and Greek profiles of a structured product across spot and time grids.
//!
//! These are the array entry points used by charting and reporting callers: one
//! value per `(spot, tau)` point, each point independent of the others. With the
//! `parallel` feature the points are evaluated on the rayon pool; results are
//! identical either way.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Greeks, PricingError};
use crate::greeks::{BumpConfig, MarketShift, ScenarioPricer};
use crate::instruments::StructuredProduct;

/// Quantity evaluated at each grid point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    Price,
    Delta,
    Gamma,
    Theta,
    Vega,
    Rho,
}

impl Measure {
    pub const ALL: [Measure; 6] = [
        Self::Price,
        Self::Delta,
        Self::Gamma,
        Self::Theta,
        Self::Vega,
        Self::Rho,
    ];

    /// Evaluates this measure for `product` at one point.
    pub fn eval(
        self,
        product: &StructuredProduct,
        spot: f64,
        tau: f64,
        bumps: &BumpConfig,
    ) -> f64 {
        match self {
            Self::Price => product.price(spot, tau),
            Self::Delta => product.delta_with(spot, tau, bumps),
            Self::Gamma => product.gamma_with(spot, tau, bumps),
            Self::Theta => product.theta_with(spot, tau, bumps),
            Self::Vega => product.vega_with(spot, tau, bumps),
            Self::Rho => product.rho_with(spot, tau, bumps),
        }
    }
}

/// Price and full Greeks at one grid point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfilePoint {
    pub spot: f64,
    pub tau: f64,
    pub price: f64,
    pub greeks: Greeks,
}

fn check_point(spot: f64, tau: f64) -> Result<(), PricingError> {
    if !spot.is_finite() || spot <= 0.0 {
        return Err(PricingError::InvalidParameter(format!(
            "spot must be finite and > 0, got {spot}"
        )));
    }
    if !tau.is_finite() || tau < 0.0 {
        return Err(PricingError::InvalidParameter(format!(
            "time to maturity must be finite and >= 0, got {tau}"
        )));
    }
    Ok(())
}

fn check_all(spots: &[f64], taus: &[f64]) -> Result<(), PricingError> {
    spots.iter().try_for_each(|&s| check_point(s, 0.0))?;
    taus.iter().try_for_each(|&t| check_point(1.0, t))
}

fn check_paired(spots: &[f64], taus: &[f64]) -> Result<(), PricingError> {
    if spots.len() != taus.len() {
        return Err(PricingError::InvalidParameter(format!(
            "spot and tau arrays must have the same length, got {} and {}",
            spots.len(),
            taus.len()
        )));
    }
    check_all(spots, taus)
}

fn map_points<F>(points: &[(f64, f64)], f: F) -> Vec<f64>
where
    F: Fn(f64, f64) -> f64 + Sync + Send,
{
    #[cfg(feature = "parallel")]
    let values = points.par_iter().map(|&(s, t)| f(s, t)).collect();
    #[cfg(not(feature = "parallel"))]
    let values = points.iter().map(|&(s, t)| f(s, t)).collect();
    values
}

/// Element-wise evaluation over paired `spots[i]`, `taus[i]`.
///
/// # Errors
/// [`PricingError::InvalidParameter`] when the slices differ in length or any
/// spot is not positive or any tau is negative.
pub fn evaluate(
    product: &StructuredProduct,
    measure: Measure,
    spots: &[f64],
    taus: &[f64],
    bumps: &BumpConfig,
) -> Result<Vec<f64>, PricingError> {
    check_paired(spots, taus)?;
    debug!(measure = ?measure, points = spots.len(), "evaluating product profile");

    let points: Vec<(f64, f64)> = spots.iter().copied().zip(taus.iter().copied()).collect();
    Ok(map_points(&points, |s, t| measure.eval(product, s, t, bumps)))
}

/// Element-wise prices of any scenario pricer, such as a single [`OptionLeg`].
///
/// [`OptionLeg`]: crate::instruments::OptionLeg
///
/// # Errors
/// Same shape and domain checks as [`evaluate`].
pub fn evaluate_prices<P: ScenarioPricer + Sync + ?Sized>(
    pricer: &P,
    spots: &[f64],
    taus: &[f64],
) -> Result<Vec<f64>, PricingError> {
    check_paired(spots, taus)?;

    let points: Vec<(f64, f64)> = spots.iter().copied().zip(taus.iter().copied()).collect();
    Ok(map_points(&points, |s, t| pricer.price_scenario(s, t, &MarketShift::NONE)))
}

/// Evaluates every spot at a single time to maturity.
pub fn evaluate_curve(
    product: &StructuredProduct,
    measure: Measure,
    spots: &[f64],
    tau: f64,
    bumps: &BumpConfig,
) -> Result<Vec<f64>, PricingError> {
    let taus = vec![tau; spots.len()];
    check_point(1.0, tau)?;
    evaluate(product, measure, spots, &taus, bumps)
}

/// Cartesian grid: one row per tau, one column per spot.
pub fn surface(
    product: &StructuredProduct,
    measure: Measure,
    spots: &[f64],
    taus: &[f64],
    bumps: &BumpConfig,
) -> Result<Vec<Vec<f64>>, PricingError> {
    check_all(spots, taus)?;
    debug!(
        measure = ?measure,
        spots = spots.len(),
        taus = taus.len(),
        "evaluating product surface"
    );

    let points: Vec<(f64, f64)> = taus
        .iter()
        .flat_map(|&t| spots.iter().map(move |&s| (s, t)))
        .collect();
    let flat = map_points(&points, |s, t| measure.eval(product, s, t, bumps));

    if spots.is_empty() {
        return Ok(vec![Vec::new(); taus.len()]);
    }
    Ok(flat.chunks(spots.len()).map(<[f64]>::to_vec).collect())
}

/// Price and all Greeks at every `(spot, tau)` of the cartesian grid, tau-major.
pub fn greeks_grid(
    product: &StructuredProduct,
    spots: &[f64],
    taus: &[f64],
    bumps: &BumpConfig,
) -> Result<Vec<ProfilePoint>, PricingError> {
    check_all(spots, taus)?;
    let points: Vec<(f64, f64)> = taus
        .iter()
        .flat_map(|&t| spots.iter().map(move |&s| (s, t)))
        .collect();

    let eval = |&(spot, tau): &(f64, f64)| ProfilePoint {
        spot,
        tau,
        price: product.price(spot, tau),
        greeks: product.greeks_with(spot, tau, bumps),
    };

    #[cfg(feature = "parallel")]
    let out = points.par_iter().map(eval).collect();
    #[cfg(not(feature = "parallel"))]
    let out = points.iter().map(eval).collect();
    Ok(out)
}
