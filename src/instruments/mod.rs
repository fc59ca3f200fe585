//! Instrument definitions: single option legs and the structured products built from them.

pub mod leg;
pub mod product;

pub use leg::{OptionLeg, OptionLegSpec};
pub use product::{ProductLeg, StructuredProduct, StructuredProductSpec};
