//! Single European call/put leg priced in closed form under Black-Scholes-Merton.
//!
//! [`OptionLeg`] carries side, strike and a flat market parameter set (volatility,
//! continuously compounded rate and dividend yield). Spot and time-to-maturity are
//! supplied per evaluation, so one leg can be re-priced across a whole grid.
//!
//! Degenerate inputs are routed to their limits instead of the singular formula:
//! - `tau == 0` returns undiscounted intrinsic value.
//! - `sigma * sqrt(tau) == 0` prices the payoff at the deterministic forward
//!   `F = S e^{(r-q)tau}`, discounted at `r`.
//!
//! References: Hull (11th ed.), Ch. 15 and 17.

use serde::{Deserialize, Serialize};

use crate::core::{OptionType, PricingError};
use crate::greeks::MarketShift;
use crate::math::normal_cdf;

/// Below this total standard deviation the lognormal kernel is replaced by its limit.
const MIN_TOTAL_VOL: f64 = 1.0e-12;

/// Immutable European option leg.
///
/// # Examples
/// ```
/// use structura::core::OptionType;
/// use structura::instruments::OptionLeg;
///
/// let call = OptionLeg::new(OptionType::Call, 100.0, 0.20, 0.05, 0.0).unwrap();
/// let px = call.price(100.0, 1.0);
/// assert!((px - 10.4506).abs() < 1e-4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OptionLegSpec", into = "OptionLegSpec")]
pub struct OptionLeg {
    option_type: OptionType,
    strike: f64,
    volatility: f64,
    risk_free_rate: f64,
    dividend_yield: f64,
}

/// Unvalidated wire form of [`OptionLeg`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionLegSpec {
    pub option_type: OptionType,
    pub strike: f64,
    pub volatility: f64,
    pub risk_free_rate: f64,
    pub dividend_yield: f64,
}

impl OptionLeg {
    /// Builds a validated leg.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidParameter`] when:
    /// - `strike <= 0` or not finite
    /// - `volatility < 0` or not finite
    /// - `risk_free_rate` or `dividend_yield` is not finite
    ///
    /// `volatility == 0` is accepted and priced by its deterministic limit.
    pub fn new(
        option_type: OptionType,
        strike: f64,
        volatility: f64,
        risk_free_rate: f64,
        dividend_yield: f64,
    ) -> Result<Self, PricingError> {
        if !strike.is_finite() || strike <= 0.0 {
            return Err(PricingError::InvalidParameter(format!(
                "leg strike must be finite and > 0, got {strike}"
            )));
        }
        if !volatility.is_finite() || volatility < 0.0 {
            return Err(PricingError::InvalidParameter(format!(
                "leg volatility must be finite and >= 0, got {volatility}"
            )));
        }
        if !risk_free_rate.is_finite() {
            return Err(PricingError::InvalidParameter(
                "leg risk-free rate must be finite".to_string(),
            ));
        }
        if !dividend_yield.is_finite() {
            return Err(PricingError::InvalidParameter(
                "leg dividend yield must be finite".to_string(),
            ));
        }

        Ok(Self {
            option_type,
            strike,
            volatility,
            risk_free_rate,
            dividend_yield,
        })
    }

    /// European call with the given market parameters.
    pub fn call(
        strike: f64,
        volatility: f64,
        risk_free_rate: f64,
        dividend_yield: f64,
    ) -> Result<Self, PricingError> {
        Self::new(
            OptionType::Call,
            strike,
            volatility,
            risk_free_rate,
            dividend_yield,
        )
    }

    /// European put with the given market parameters.
    pub fn put(
        strike: f64,
        volatility: f64,
        risk_free_rate: f64,
        dividend_yield: f64,
    ) -> Result<Self, PricingError> {
        Self::new(
            OptionType::Put,
            strike,
            volatility,
            risk_free_rate,
            dividend_yield,
        )
    }

    #[inline]
    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    #[inline]
    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    #[inline]
    pub fn dividend_yield(&self) -> f64 {
        self.dividend_yield
    }

    /// Payoff if exercised immediately.
    #[inline]
    pub fn intrinsic(&self, spot: f64) -> f64 {
        (self.option_type.sign() * (spot - self.strike)).max(0.0)
    }

    /// Risk-neutral forward `S e^{(r-q)tau}`.
    #[inline]
    pub fn forward(&self, spot: f64, tau: f64) -> f64 {
        spot * ((self.risk_free_rate - self.dividend_yield) * tau).exp()
    }

    /// Black-Scholes-Merton price at spot `spot` with `tau` years to maturity.
    ///
    /// Expects `spot > 0` and `tau >= 0`; negative `tau` is treated as expired.
    #[inline]
    pub fn price(&self, spot: f64, tau: f64) -> f64 {
        self.price_shifted(spot, tau, &MarketShift::NONE)
    }

    /// Price with additive volatility/rate shifts applied to this leg.
    ///
    /// A shifted volatility below zero is floored at zero.
    pub fn price_shifted(&self, spot: f64, tau: f64, shift: &MarketShift) -> f64 {
        if tau <= 0.0 {
            return self.intrinsic(spot);
        }

        let vol = (self.volatility + shift.volatility).max(0.0);
        let rate = self.risk_free_rate + shift.rate;
        let q = self.dividend_yield;

        let df_r = (-rate * tau).exp();
        let df_q = (-q * tau).exp();
        let vol_sqrt_t = vol * tau.sqrt();

        if vol_sqrt_t < MIN_TOTAL_VOL {
            // df_r * max(F - K, 0) with F = S e^{(r-q)tau}
            let sign = self.option_type.sign();
            return (sign * (spot * df_q - self.strike * df_r)).max(0.0);
        }

        let d1 = ((spot / self.strike).ln() + (rate - q + 0.5 * vol * vol) * tau) / vol_sqrt_t;
        let d2 = d1 - vol_sqrt_t;

        let px = match self.option_type {
            OptionType::Call => spot * df_q * normal_cdf(d1) - self.strike * df_r * normal_cdf(d2),
            OptionType::Put => self.strike * df_r * normal_cdf(-d2) - spot * df_q * normal_cdf(-d1),
        };
        // Cancellation deep out of the money can leave a tiny negative residue.
        px.max(0.0)
    }
}

impl TryFrom<OptionLegSpec> for OptionLeg {
    type Error = PricingError;

    fn try_from(raw: OptionLegSpec) -> Result<Self, Self::Error> {
        Self::new(
            raw.option_type,
            raw.strike,
            raw.volatility,
            raw.risk_free_rate,
            raw.dividend_yield,
        )
    }
}

impl From<OptionLeg> for OptionLegSpec {
    fn from(leg: OptionLeg) -> Self {
        Self {
            option_type: leg.option_type,
            strike: leg.strike,
            volatility: leg.volatility,
            risk_free_rate: leg.risk_free_rate,
            dividend_yield: leg.dividend_yield,
        }
    }
}
