//! Greeks and sensitivity analytics.
//!
//! Sensitivities are estimated by bumping the inputs of a black-box scenario pricer
//! and re-evaluating it. Nothing here knows about legs or payoffs: any
//! [`ScenarioPricer`] (a structured product, a single leg, or a closure) gets the
//! same differencing scheme.
//!
//! Schemes:
//! - delta: central difference in spot
//! - gamma: second central difference in spot
//! - theta: one-sided step of `dt` towards expiry, clamped at `tau = 0`
//! - vega / rho: central differences on additive volatility / rate shifts
//!
//! Step sizes are relative to the bumped quantity with an absolute floor, see
//! [`BumpConfig`].

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::Greeks;

/// Additive shifts applied uniformly to every leg's market parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketShift {
    /// Added to each leg's volatility (result floored at zero).
    pub volatility: f64,
    /// Added to each leg's risk-free rate.
    pub rate: f64,
}

impl MarketShift {
    /// No shift.
    pub const NONE: Self = Self {
        volatility: 0.0,
        rate: 0.0,
    };

    pub fn volatility(volatility: f64) -> Self {
        Self {
            volatility,
            rate: 0.0,
        }
    }

    pub fn rate(rate: f64) -> Self {
        Self {
            volatility: 0.0,
            rate,
        }
    }
}

/// Anything that can be priced at `(spot, tau)` under a market shift.
pub trait ScenarioPricer {
    fn price_scenario(&self, spot: f64, tau: f64, shift: &MarketShift) -> f64;
}

impl<F> ScenarioPricer for F
where
    F: Fn(f64, f64, &MarketShift) -> f64,
{
    fn price_scenario(&self, spot: f64, tau: f64, shift: &MarketShift) -> f64 {
        self(spot, tau, shift)
    }
}

/// Finite-difference step sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BumpConfig {
    /// Spot step as a fraction of spot.
    pub spot_relative: f64,
    /// Smallest absolute spot step.
    pub spot_floor: f64,
    /// Volatility step as a fraction of volatility.
    pub vol_relative: f64,
    /// Smallest absolute volatility step.
    pub vol_floor: f64,
    /// Absolute rate step.
    pub rate_step: f64,
    /// Calendar step for theta, in years.
    pub theta_step: f64,
}

impl Default for BumpConfig {
    fn default() -> Self {
        Self {
            spot_relative: 1.0e-4,
            spot_floor: 1.0e-6,
            vol_relative: 1.0e-4,
            vol_floor: 1.0e-4,
            rate_step: 1.0e-4,
            theta_step: 1.0 / 365.0,
        }
    }
}

impl BumpConfig {
    /// Default steps with theta measured over one trading day (1/250 year).
    pub fn trading_days() -> Self {
        Self::default().with_theta_step(1.0 / 250.0)
    }

    pub fn with_spot_relative(mut self, spot_relative: f64) -> Self {
        self.spot_relative = spot_relative;
        self
    }

    pub fn with_vol_step(mut self, vol_relative: f64, vol_floor: f64) -> Self {
        self.vol_relative = vol_relative;
        self.vol_floor = vol_floor;
        self
    }

    pub fn with_rate_step(mut self, rate_step: f64) -> Self {
        self.rate_step = rate_step;
        self
    }

    pub fn with_theta_step(mut self, theta_step: f64) -> Self {
        self.theta_step = theta_step;
        self
    }

    /// Spot step for `spot`, kept below half the spot so `spot - h` stays positive.
    #[inline]
    pub fn spot_step(&self, spot: f64) -> f64 {
        let h = (self.spot_relative * spot.abs()).max(self.spot_floor);
        if spot > 0.0 { h.min(0.5 * spot) } else { h }
    }

    /// Volatility step around a reference volatility.
    #[inline]
    pub fn vol_step(&self, volatility: f64) -> f64 {
        (self.vol_relative * volatility.abs()).max(self.vol_floor)
    }
}

/// `dV/dS` by central difference.
pub fn delta<P: ScenarioPricer + ?Sized>(
    pricer: &P,
    spot: f64,
    tau: f64,
    bumps: &BumpConfig,
) -> f64 {
    let h = bumps.spot_step(spot);
    let up = pricer.price_scenario(spot + h, tau, &MarketShift::NONE);
    let dn = pricer.price_scenario(spot - h, tau, &MarketShift::NONE);
    (up - dn) / (2.0 * h)
}

/// `d²V/dS²` by second central difference.
pub fn gamma<P: ScenarioPricer + ?Sized>(
    pricer: &P,
    spot: f64,
    tau: f64,
    bumps: &BumpConfig,
) -> f64 {
    let base = pricer.price_scenario(spot, tau, &MarketShift::NONE);
    gamma_from_base(pricer, spot, tau, base, bumps)
}

fn gamma_from_base<P: ScenarioPricer + ?Sized>(
    pricer: &P,
    spot: f64,
    tau: f64,
    base: f64,
    bumps: &BumpConfig,
) -> f64 {
    let h = bumps.spot_step(spot);
    let h2 = h * h;
    if h2 == 0.0 {
        // Spot so small that the squared step underflows.
        return 0.0;
    }
    let up = pricer.price_scenario(spot + h, tau, &MarketShift::NONE);
    let dn = pricer.price_scenario(spot - h, tau, &MarketShift::NONE);
    (up - 2.0 * base + dn) / h2
}

/// Value change per year of calendar time, estimated over one `theta_step`.
///
/// When fewer than `theta_step` years remain the step is clamped at expiry and
/// the difference is divided by the step actually taken. Returns zero at `tau <= 0`.
pub fn theta<P: ScenarioPricer + ?Sized>(
    pricer: &P,
    spot: f64,
    tau: f64,
    bumps: &BumpConfig,
) -> f64 {
    let base = pricer.price_scenario(spot, tau, &MarketShift::NONE);
    theta_from_base(pricer, spot, tau, base, bumps)
}

fn theta_from_base<P: ScenarioPricer + ?Sized>(
    pricer: &P,
    spot: f64,
    tau: f64,
    base: f64,
    bumps: &BumpConfig,
) -> f64 {
    if tau <= 0.0 {
        return 0.0;
    }
    let tau_next = (tau - bumps.theta_step).max(0.0);
    if tau_next == 0.0 {
        trace!(tau, step = bumps.theta_step, "theta step clamped at expiry");
    }
    let dt = tau - tau_next;
    let next = pricer.price_scenario(spot, tau_next, &MarketShift::NONE);
    (next - base) / dt
}

/// `dV/dσ` per unit volatility, bumping every leg's volatility by the same amount.
///
/// `min_vol` is the lowest volatility among the priced legs. It sizes the relative
/// step and bounds the down bump, so no leg is shifted below zero volatility and
/// every leg sees the same span.
pub fn vega<P: ScenarioPricer + ?Sized>(
    pricer: &P,
    spot: f64,
    tau: f64,
    min_vol: f64,
    bumps: &BumpConfig,
) -> f64 {
    let h = bumps.vol_step(min_vol);
    let up_shift = h;
    let dn_shift = -h.min(min_vol.max(0.0));
    let up = pricer.price_scenario(spot, tau, &MarketShift::volatility(up_shift));
    let dn = pricer.price_scenario(spot, tau, &MarketShift::volatility(dn_shift));
    (up - dn) / (up_shift - dn_shift)
}

/// `dV/dr` per unit rate, bumping every leg's rate by the same amount.
pub fn rho<P: ScenarioPricer + ?Sized>(
    pricer: &P,
    spot: f64,
    tau: f64,
    bumps: &BumpConfig,
) -> f64 {
    let h = bumps.rate_step;
    let up = pricer.price_scenario(spot, tau, &MarketShift::rate(h));
    let dn = pricer.price_scenario(spot, tau, &MarketShift::rate(-h));
    (up - dn) / (2.0 * h)
}

/// All five Greeks sharing one base valuation.
pub fn finite_difference_greeks<P: ScenarioPricer + ?Sized>(
    pricer: &P,
    spot: f64,
    tau: f64,
    min_vol: f64,
    bumps: &BumpConfig,
) -> Greeks {
    let base = pricer.price_scenario(spot, tau, &MarketShift::NONE);
    Greeks {
        delta: delta(pricer, spot, tau, bumps),
        gamma: gamma_from_base(pricer, spot, tau, base, bumps),
        vega: vega(pricer, spot, tau, min_vol, bumps),
        theta: theta_from_base(pricer, spot, tau, base, bumps),
        rho: rho(pricer, spot, tau, bumps),
    }
}
