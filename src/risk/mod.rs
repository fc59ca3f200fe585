//! Risk namespace: grid profiles of price and Greeks for structured products and legs.

pub mod profile;

pub use profile::{Measure, ProfilePoint, evaluate, evaluate_curve, evaluate_prices, greeks_grid, surface};
