//! Structura prices European option combinations ("structured products") under
//! Black-Scholes-Merton and measures their risk by finite differencing.
//!
//! The crate is split the way the data flows:
//! - [`instruments::OptionLeg`] prices one call or put in closed form, with explicit
//!   limits for zero time-to-maturity and zero volatility.
//! - [`instruments::StructuredProduct`] sums signed, weighted legs and derives
//!   Delta, Gamma, Theta, Vega and Rho by re-pricing the aggregate.
//! - [`factory::ProductFactory`] builds named products (straddle, butterfly,
//!   condor, spreads, forwards, ...) from a declarative recipe table.
//! - [`risk`] evaluates a product over arrays of spots and maturities for
//!   charting or reporting consumers.
//!
//! References: Hull, *Options, Futures, and Other Derivatives* (11th ed.), Ch. 12
//! (trading strategies) and Ch. 15, 17, 19 (BSM pricing and Greeks).
//!
//! Numerical considerations:
//! - Greeks are bump-and-reprice estimates; step sizes live in [`greeks::BumpConfig`]
//!   and are relative to the bumped quantity with absolute floors.
//! - Theta steps one calendar day towards expiry and clamps at `tau = 0`.
//!
//! # Feature Flags
//! - `parallel`: evaluates grid points on the Rayon pool.
//!
//! # Quick Start
//! Price a leg:
//! ```rust
//! use structura::core::OptionType;
//! use structura::instruments::OptionLeg;
//!
//! let call = OptionLeg::new(OptionType::Call, 100.0, 0.20, 0.05, 0.0).unwrap();
//! let px = call.price(100.0, 1.0);
//! assert!(px > 10.0 && px < 11.0);
//! ```
//!
//! Build a product and read its Greeks:
//! ```rust
//! use structura::factory::{ProductFactory, ProductTerms};
//!
//! let terms = ProductTerms::new(0.20, 0.05, 0.0, 1.0);
//! let straddle = ProductFactory::straddle(100.0, &terms).unwrap();
//! let g = straddle.greeks(100.0, 1.0);
//! assert!(g.gamma > 0.0 && g.vega > 0.0 && g.theta < 0.0);
//! ```
//!
//! Evaluate a price curve for plotting:
//! ```rust
//! use structura::factory::{ProductFactory, ProductTerms};
//! use structura::greeks::BumpConfig;
//! use structura::risk::{Measure, evaluate_curve};
//!
//! let fly = ProductFactory::symmetric_butterfly(100.0, 20.0, &ProductTerms::default()).unwrap();
//! let spots: Vec<f64> = (60..=140).map(f64::from).collect();
//! let prices = evaluate_curve(&fly, Measure::Price, &spots, 0.1, &BumpConfig::default()).unwrap();
//! assert_eq!(prices.len(), spots.len());
//! ```

pub mod core;
pub mod factory;
pub mod greeks;
pub mod instruments;
pub mod math;
pub mod risk;

/// Common imports for ergonomic usage.
pub mod prelude {
    pub use crate::core::*;
    pub use crate::factory::{ProductFactory, ProductKind, ProductTerms};
    pub use crate::greeks::{BumpConfig, MarketShift, ScenarioPricer};
    pub use crate::instruments::*;
    pub use crate::risk::{Measure, ProfilePoint};
}
