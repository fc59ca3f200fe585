//! Named structured products expressed as declarative leg recipes.
//!
//! Each [`ProductKind`] maps to a static [`Recipe`]: a list of leg templates that
//! reference the caller's strikes by position, plus the ordering rule those
//! strikes must satisfy. [`ProductFactory::build`] is the single interpreter of
//! that table; the named constructors are thin wrappers over it. Adding a product
//! means adding a table entry, not new control flow.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::OptionType::{Call, Put};
use crate::core::Side::{Long, Short};
use crate::core::{OptionType, PricingError, Side};
use crate::instruments::{OptionLeg, ProductLeg, StructuredProduct};

/// Which maturity a template leg expires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tenor {
    /// The product's maturity.
    Front,
    /// [`ProductTerms::back_maturity`].
    Back,
}

/// One leg of a recipe. `strike` indexes into the strikes passed to the factory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegTemplate {
    pub option_type: OptionType,
    pub strike: usize,
    pub weight: f64,
    pub side: Side,
    pub tenor: Tenor,
}

/// Constraint on the strikes handed to a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeRule {
    /// Exactly `n` strikes, strictly increasing.
    Increasing(usize),
    /// Exactly `n` strikes, pairwise different.
    Distinct(usize),
}

impl StrikeRule {
    pub fn count(self) -> usize {
        match self {
            Self::Increasing(n) | Self::Distinct(n) => n,
        }
    }

    fn check(self, kind: ProductKind, strikes: &[f64]) -> Result<(), PricingError> {
        if strikes.len() != self.count() {
            return Err(PricingError::InvalidRecipe(format!(
                "{kind} takes {} strike(s), got {}",
                self.count(),
                strikes.len()
            )));
        }
        match self {
            Self::Increasing(_) => {
                if strikes.windows(2).any(|w| w[1] <= w[0]) {
                    return Err(PricingError::InvalidRecipe(format!(
                        "{kind} strikes must be strictly increasing, got {strikes:?}"
                    )));
                }
            }
            Self::Distinct(_) => {
                for (i, a) in strikes.iter().enumerate() {
                    if strikes[i + 1..].iter().any(|b| a == b) {
                        return Err(PricingError::InvalidRecipe(format!(
                            "{kind} strikes must differ, got {strikes:?}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Declarative description of a named product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recipe {
    pub strikes: StrikeRule,
    pub legs: &'static [LegTemplate],
}

const fn front(option_type: OptionType, strike: usize, weight: f64, side: Side) -> LegTemplate {
    LegTemplate {
        option_type,
        strike,
        weight,
        side,
        tenor: Tenor::Front,
    }
}

const fn back(option_type: OptionType, strike: usize, weight: f64, side: Side) -> LegTemplate {
    LegTemplate {
        option_type,
        strike,
        weight,
        side,
        tenor: Tenor::Back,
    }
}

static FORWARD: Recipe = Recipe {
    strikes: StrikeRule::Increasing(1),
    legs: &[front(Call, 0, 1.0, Long), front(Put, 0, 1.0, Short)],
};

static STRADDLE: Recipe = Recipe {
    strikes: StrikeRule::Increasing(1),
    legs: &[front(Call, 0, 1.0, Long), front(Put, 0, 1.0, Long)],
};

static STRANGLE: Recipe = Recipe {
    strikes: StrikeRule::Increasing(2),
    legs: &[front(Put, 0, 1.0, Long), front(Call, 1, 1.0, Long)],
};

static BUTTERFLY: Recipe = Recipe {
    strikes: StrikeRule::Increasing(3),
    legs: &[
        front(Call, 0, 1.0, Long),
        front(Call, 1, 2.0, Short),
        front(Call, 2, 1.0, Long),
    ],
};

static CONDOR: Recipe = Recipe {
    strikes: StrikeRule::Increasing(4),
    legs: &[
        front(Call, 0, 1.0, Long),
        front(Call, 1, 1.0, Short),
        front(Call, 2, 1.0, Short),
        front(Call, 3, 1.0, Long),
    ],
};

static IRON_CONDOR: Recipe = Recipe {
    strikes: StrikeRule::Increasing(4),
    legs: &[
        front(Put, 0, 1.0, Long),
        front(Put, 1, 1.0, Short),
        front(Call, 2, 1.0, Short),
        front(Call, 3, 1.0, Long),
    ],
};

static CALL_VERTICAL: Recipe = Recipe {
    strikes: StrikeRule::Distinct(2),
    legs: &[front(Call, 0, 1.0, Long), front(Call, 1, 1.0, Short)],
};

static PUT_VERTICAL: Recipe = Recipe {
    strikes: StrikeRule::Distinct(2),
    legs: &[front(Put, 0, 1.0, Long), front(Put, 1, 1.0, Short)],
};

static BULL_SPREAD: Recipe = Recipe {
    strikes: StrikeRule::Increasing(2),
    legs: &[front(Call, 0, 1.0, Long), front(Call, 1, 1.0, Short)],
};

static BEAR_SPREAD: Recipe = Recipe {
    strikes: StrikeRule::Increasing(2),
    legs: &[front(Put, 0, 1.0, Short), front(Put, 1, 1.0, Long)],
};

static CALL_CHRISTMAS_TREE: Recipe = Recipe {
    strikes: StrikeRule::Increasing(3),
    legs: &[
        front(Call, 0, 1.0, Long),
        front(Call, 1, 1.0, Short),
        front(Call, 2, 1.0, Short),
    ],
};

static PUT_CHRISTMAS_TREE: Recipe = Recipe {
    strikes: StrikeRule::Increasing(3),
    legs: &[
        front(Put, 0, 1.0, Short),
        front(Put, 1, 1.0, Short),
        front(Put, 2, 1.0, Long),
    ],
};

static CALENDAR_SPREAD: Recipe = Recipe {
    strikes: StrikeRule::Increasing(1),
    legs: &[front(Call, 0, 1.0, Short), back(Call, 0, 1.0, Long)],
};

/// Named products the factory knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    /// Long call, short put at one strike.
    Forward,
    Straddle,
    Strangle,
    /// Long 1 call@K1, short 2 calls@K2, long 1 call@K3.
    Butterfly,
    /// Calls: long K1, short K2, short K3, long K4.
    Condor,
    /// Long put@K1, short put@K2, short call@K3, long call@K4.
    IronCondor,
    /// Long call@K1, short call@K2, any distinct strikes.
    CallVerticalSpread,
    /// Long put@K1, short put@K2, any distinct strikes.
    PutVerticalSpread,
    BullSpread,
    BearSpread,
    CallChristmasTree,
    PutChristmasTree,
    /// Short front-month call, long back-month call, same strike.
    CalendarSpread,
}

impl ProductKind {
    pub const ALL: [ProductKind; 13] = [
        Self::Forward,
        Self::Straddle,
        Self::Strangle,
        Self::Butterfly,
        Self::Condor,
        Self::IronCondor,
        Self::CallVerticalSpread,
        Self::PutVerticalSpread,
        Self::BullSpread,
        Self::BearSpread,
        Self::CallChristmasTree,
        Self::PutChristmasTree,
        Self::CalendarSpread,
    ];

    pub fn recipe(self) -> &'static Recipe {
        match self {
            Self::Forward => &FORWARD,
            Self::Straddle => &STRADDLE,
            Self::Strangle => &STRANGLE,
            Self::Butterfly => &BUTTERFLY,
            Self::Condor => &CONDOR,
            Self::IronCondor => &IRON_CONDOR,
            Self::CallVerticalSpread => &CALL_VERTICAL,
            Self::PutVerticalSpread => &PUT_VERTICAL,
            Self::BullSpread => &BULL_SPREAD,
            Self::BearSpread => &BEAR_SPREAD,
            Self::CallChristmasTree => &CALL_CHRISTMAS_TREE,
            Self::PutChristmasTree => &PUT_CHRISTMAS_TREE,
            Self::CalendarSpread => &CALENDAR_SPREAD,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Straddle => "straddle",
            Self::Strangle => "strangle",
            Self::Butterfly => "butterfly",
            Self::Condor => "condor",
            Self::IronCondor => "iron condor",
            Self::CallVerticalSpread => "call vertical spread",
            Self::PutVerticalSpread => "put vertical spread",
            Self::BullSpread => "bull spread",
            Self::BearSpread => "bear spread",
            Self::CallChristmasTree => "call christmas tree",
            Self::PutChristmasTree => "put christmas tree",
            Self::CalendarSpread => "calendar spread",
        }
    }
}

impl std::fmt::Display for ProductKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Contract parameters shared by every leg the factory builds.
///
/// Defaults: 25% vol, 5% rate, 2.5% dividend yield, 0.125y maturity, unit notional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductTerms {
    pub volatility: f64,
    pub risk_free_rate: f64,
    pub dividend_yield: f64,
    /// Front maturity in years.
    pub maturity: f64,
    /// Multiplies every recipe weight.
    pub notional: f64,
    /// Second maturity for calendar products.
    #[serde(default)]
    pub back_maturity: Option<f64>,
}

impl Default for ProductTerms {
    fn default() -> Self {
        Self {
            volatility: 0.25,
            risk_free_rate: 0.05,
            dividend_yield: 0.025,
            maturity: 0.125,
            notional: 1.0,
            back_maturity: None,
        }
    }
}

impl ProductTerms {
    pub fn new(volatility: f64, risk_free_rate: f64, dividend_yield: f64, maturity: f64) -> Self {
        Self {
            volatility,
            risk_free_rate,
            dividend_yield,
            maturity,
            ..Self::default()
        }
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    pub fn with_rate(mut self, risk_free_rate: f64) -> Self {
        self.risk_free_rate = risk_free_rate;
        self
    }

    pub fn with_dividend_yield(mut self, dividend_yield: f64) -> Self {
        self.dividend_yield = dividend_yield;
        self
    }

    pub fn with_maturity(mut self, maturity: f64) -> Self {
        self.maturity = maturity;
        self
    }

    pub fn with_notional(mut self, notional: f64) -> Self {
        self.notional = notional;
        self
    }

    pub fn with_back_maturity(mut self, back_maturity: f64) -> Self {
        self.back_maturity = Some(back_maturity);
        self
    }

    /// Validates the shared terms.
    ///
    /// # Errors
    /// [`PricingError::InvalidParameter`] for negative volatility or maturity,
    /// non-positive notional, or non-finite values.
    pub fn validate(&self) -> Result<(), PricingError> {
        if !self.volatility.is_finite() || self.volatility < 0.0 {
            return Err(PricingError::InvalidParameter(format!(
                "volatility must be finite and >= 0, got {}",
                self.volatility
            )));
        }
        if !self.risk_free_rate.is_finite() || !self.dividend_yield.is_finite() {
            return Err(PricingError::InvalidParameter(
                "rate and dividend yield must be finite".to_string(),
            ));
        }
        if !self.maturity.is_finite() || self.maturity < 0.0 {
            return Err(PricingError::InvalidParameter(format!(
                "maturity must be finite and >= 0, got {}",
                self.maturity
            )));
        }
        if !self.notional.is_finite() || self.notional <= 0.0 {
            return Err(PricingError::InvalidParameter(format!(
                "notional must be finite and > 0, got {}",
                self.notional
            )));
        }
        Ok(())
    }

    fn back_offset(&self, kind: ProductKind) -> Result<f64, PricingError> {
        let back = self.back_maturity.ok_or_else(|| {
            PricingError::InvalidRecipe(format!("{kind} needs a back maturity"))
        })?;
        if !back.is_finite() || back <= self.maturity {
            return Err(PricingError::InvalidRecipe(format!(
                "{kind} back maturity {back} must exceed front maturity {}",
                self.maturity
            )));
        }
        Ok(back - self.maturity)
    }
}

/// Stateless constructors for named structured products.
///
/// # Examples
/// ```
/// use structura::factory::{ProductFactory, ProductTerms};
///
/// let terms = ProductTerms::new(0.2, 0.05, 0.0, 1.0);
/// let fly = ProductFactory::butterfly(90.0, 100.0, 110.0, &terms).unwrap();
/// assert_eq!(fly.legs().len(), 3);
///
/// let unordered = ProductFactory::butterfly(110.0, 100.0, 90.0, &terms);
/// assert!(unordered.is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductFactory;

impl ProductFactory {
    /// Interprets the recipe of `kind` against `strikes` and `terms`.
    ///
    /// # Errors
    /// - [`PricingError::InvalidParameter`] when `terms` or a resulting leg is invalid.
    /// - [`PricingError::InvalidRecipe`] when the strikes break the recipe's rule,
    ///   or a calendar product lacks a later back maturity.
    pub fn build(
        kind: ProductKind,
        strikes: &[f64],
        terms: &ProductTerms,
    ) -> Result<StructuredProduct, PricingError> {
        terms.validate()?;
        let recipe = kind.recipe();
        recipe.strikes.check(kind, strikes)?;

        let needs_back = recipe.legs.iter().any(|t| t.tenor == Tenor::Back);
        let back_offset = if needs_back {
            terms.back_offset(kind)?
        } else {
            0.0
        };

        let legs = recipe
            .legs
            .iter()
            .map(|template| -> Result<ProductLeg, PricingError> {
                let leg = OptionLeg::new(
                    template.option_type,
                    strikes[template.strike],
                    terms.volatility,
                    terms.risk_free_rate,
                    terms.dividend_yield,
                )?;
                let offset = match template.tenor {
                    Tenor::Front => 0.0,
                    Tenor::Back => back_offset,
                };
                Ok(
                    ProductLeg::new(leg, template.weight * terms.notional, template.side)
                        .with_maturity_offset(offset),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let product = StructuredProduct::new(legs)?
            .with_maturity(terms.maturity)?
            .with_label(kind.name());

        debug!(
            product = %kind,
            legs = product.legs().len(),
            maturity = terms.maturity,
            notional = terms.notional,
            "built structured product"
        );
        Ok(product)
    }

    /// Synthetic forward: long call, short put at `strike`.
    pub fn forward(strike: f64, terms: &ProductTerms) -> Result<StructuredProduct, PricingError> {
        Self::build(ProductKind::Forward, &[strike], terms)
    }

    pub fn straddle(strike: f64, terms: &ProductTerms) -> Result<StructuredProduct, PricingError> {
        Self::build(ProductKind::Straddle, &[strike], terms)
    }

    pub fn strangle(
        lower_strike: f64,
        upper_strike: f64,
        terms: &ProductTerms,
    ) -> Result<StructuredProduct, PricingError> {
        Self::build(ProductKind::Strangle, &[lower_strike, upper_strike], terms)
    }

    pub fn butterfly(
        k1: f64,
        k2: f64,
        k3: f64,
        terms: &ProductTerms,
    ) -> Result<StructuredProduct, PricingError> {
        Self::build(ProductKind::Butterfly, &[k1, k2, k3], terms)
    }

    /// Butterfly with wings at `center ± width / 2`.
    pub fn symmetric_butterfly(
        center_strike: f64,
        width: f64,
        terms: &ProductTerms,
    ) -> Result<StructuredProduct, PricingError> {
        let half = 0.5 * width;
        Self::butterfly(center_strike - half, center_strike, center_strike + half, terms)
    }

    pub fn condor(
        k1: f64,
        k2: f64,
        k3: f64,
        k4: f64,
        terms: &ProductTerms,
    ) -> Result<StructuredProduct, PricingError> {
        Self::build(ProductKind::Condor, &[k1, k2, k3, k4], terms)
    }

    pub fn iron_condor(
        k1: f64,
        k2: f64,
        k3: f64,
        k4: f64,
        terms: &ProductTerms,
    ) -> Result<StructuredProduct, PricingError> {
        Self::build(ProductKind::IronCondor, &[k1, k2, k3, k4], terms)
    }

    /// Iron condor with inner strikes `lower`/`upper` and wings `width / 2` outside them.
    pub fn symmetric_iron_condor(
        lower_strike: f64,
        upper_strike: f64,
        width: f64,
        terms: &ProductTerms,
    ) -> Result<StructuredProduct, PricingError> {
        let half = 0.5 * width;
        Self::iron_condor(
            lower_strike - half,
            lower_strike,
            upper_strike,
            upper_strike + half,
            terms,
        )
    }

    /// Long `option_type` at `long_strike`, short the same type at `short_strike`.
    pub fn vertical_spread(
        option_type: OptionType,
        long_strike: f64,
        short_strike: f64,
        terms: &ProductTerms,
    ) -> Result<StructuredProduct, PricingError> {
        let kind = match option_type {
            OptionType::Call => ProductKind::CallVerticalSpread,
            OptionType::Put => ProductKind::PutVerticalSpread,
        };
        Self::build(kind, &[long_strike, short_strike], terms)
    }

    /// Long call at the lower strike, short call at the upper strike.
    pub fn bull_spread(
        lower_strike: f64,
        upper_strike: f64,
        terms: &ProductTerms,
    ) -> Result<StructuredProduct, PricingError> {
        Self::build(ProductKind::BullSpread, &[lower_strike, upper_strike], terms)
    }

    /// Short put at the lower strike, long put at the upper strike.
    pub fn bear_spread(
        lower_strike: f64,
        upper_strike: f64,
        terms: &ProductTerms,
    ) -> Result<StructuredProduct, PricingError> {
        Self::build(ProductKind::BearSpread, &[lower_strike, upper_strike], terms)
    }

    pub fn call_christmas_tree(
        k1: f64,
        k2: f64,
        k3: f64,
        terms: &ProductTerms,
    ) -> Result<StructuredProduct, PricingError> {
        Self::build(ProductKind::CallChristmasTree, &[k1, k2, k3], terms)
    }

    pub fn put_christmas_tree(
        k1: f64,
        k2: f64,
        k3: f64,
        terms: &ProductTerms,
    ) -> Result<StructuredProduct, PricingError> {
        Self::build(ProductKind::PutChristmasTree, &[k1, k2, k3], terms)
    }

    /// Short call expiring at `terms.maturity`, long call expiring at `terms.back_maturity`.
    pub fn calendar_spread(
        strike: f64,
        terms: &ProductTerms,
    ) -> Result<StructuredProduct, PricingError> {
        Self::build(ProductKind::CalendarSpread, &[strike], terms)
    }
}
