//! Progressive bracket tables evaluated with the quick-deduction method.
//!
//! A table is an ordered list of `(upper_bound, rate, subtrahend)` triples.
//! The tax on an amount is `amount × rate − subtrahend` for the first bracket
//! whose upper bound is at least the amount. The subtrahend of each bracket
//! makes that expression continuous at every boundary, so it always equals
//! the bracket-by-bracket marginal sum.
//!
//! Tables are validated once, when they are built or deserialised. Evaluation
//! itself is total.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FamilyOfficeError;
use crate::types::{require_non_negative, Money, Rate};
use crate::FamilyOfficeResult;

/// Allowed drift between the two sides of a bracket boundary.
const CONTINUITY_TOLERANCE: Decimal = dec!(0.01);

/// One band of a progressive table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    /// Inclusive upper bound. `None` marks the open-ended top bracket.
    pub upper_bound: Option<Money>,
    /// Marginal rate applied inside this band.
    pub rate: Rate,
    /// Quick deduction subtracted from `amount × rate`.
    pub subtrahend: Money,
}

/// A validated progressive bracket table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bracket>", into = "Vec<Bracket>")]
pub struct BracketTable {
    brackets: Vec<Bracket>,
}

impl BracketTable {
    /// Build a table from explicit quick-deduction triples.
    pub fn new(brackets: Vec<Bracket>) -> FamilyOfficeResult<Self> {
        validate_brackets(&brackets)?;
        Ok(Self { brackets })
    }

    /// Build a table from `(upper_bound, rate)` bands, deriving each
    /// subtrahend from the cumulative tax at the previous bound.
    pub fn from_marginal_rates(bands: &[(Option<Money>, Rate)]) -> FamilyOfficeResult<Self> {
        Self::new(derive_subtrahends(bands))
    }

    /// Tables whose triples are known to be well formed.
    pub(crate) fn from_trusted(brackets: Vec<Bracket>) -> Self {
        debug_assert!(validate_brackets(&brackets).is_ok());
        Self { brackets }
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    /// Tax owed on `amount` under this table.
    pub fn tax(&self, amount: Money) -> Money {
        evaluate(amount, self)
    }
}

impl TryFrom<Vec<Bracket>> for BracketTable {
    type Error = FamilyOfficeError;

    fn try_from(brackets: Vec<Bracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<BracketTable> for Vec<Bracket> {
    fn from(table: BracketTable) -> Self {
        table.brackets
    }
}

/// Evaluate progressive tax on a non-negative `amount`.
///
/// Scans brackets in ascending order and applies the first one whose upper
/// bound is at least `amount`. Never returns a negative value.
pub fn evaluate(amount: Money, table: &BracketTable) -> Money {
    let bracket = table
        .brackets
        .iter()
        .find(|b| b.upper_bound.map_or(true, |upper| amount <= upper))
        .or_else(|| table.brackets.last());

    match bracket {
        Some(b) => (amount * b.rate - b.subtrahend).max(Decimal::ZERO),
        None => Decimal::ZERO,
    }
}

/// [`evaluate`] for caller-supplied amounts: a negative amount is an error
/// rather than zero tax.
pub fn evaluate_checked(amount: Money, table: &BracketTable) -> FamilyOfficeResult<Money> {
    require_non_negative("amount", amount)?;
    Ok(evaluate(amount, table))
}

fn derive_subtrahends(bands: &[(Option<Money>, Rate)]) -> Vec<Bracket> {
    let mut brackets = Vec::with_capacity(bands.len());
    let mut previous_bound = Decimal::ZERO;
    let mut previous_rate = Decimal::ZERO;
    let mut subtrahend = Decimal::ZERO;

    for &(upper_bound, rate) in bands {
        subtrahend += previous_bound * (rate - previous_rate);
        brackets.push(Bracket {
            upper_bound,
            rate,
            subtrahend,
        });
        previous_rate = rate;
        if let Some(upper) = upper_bound {
            previous_bound = upper;
        }
    }

    brackets
}

fn validate_brackets(brackets: &[Bracket]) -> FamilyOfficeResult<()> {
    if brackets.is_empty() {
        return Err(FamilyOfficeError::InvalidBracketTable {
            index: 0,
            reason: "table has no brackets".into(),
        });
    }

    let last = brackets.len() - 1;
    let mut previous: Option<(Money, &Bracket)> = None;

    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            return Err(FamilyOfficeError::InvalidBracketTable {
                index,
                reason: "rate must be between 0 and 1".into(),
            });
        }

        match (bracket.upper_bound, index == last) {
            (None, true) => {}
            (None, false) => {
                return Err(FamilyOfficeError::InvalidBracketTable {
                    index,
                    reason: "only the last bracket may be unbounded".into(),
                });
            }
            (Some(_), true) => {
                return Err(FamilyOfficeError::InvalidBracketTable {
                    index,
                    reason: "last bracket must be unbounded".into(),
                });
            }
            (Some(upper), false) => {
                let floor = previous.map_or(Decimal::ZERO, |(bound, _)| bound);
                if upper <= floor {
                    return Err(FamilyOfficeError::InvalidBracketTable {
                        index,
                        reason: format!("upper bound {} must exceed {}", upper, floor),
                    });
                }
            }
        }

        if let Some((bound, prev)) = previous {
            let below = bound * prev.rate - prev.subtrahend;
            let above = bound * bracket.rate - bracket.subtrahend;
            if (below - above).abs() > CONTINUITY_TOLERANCE {
                return Err(FamilyOfficeError::InvalidBracketTable {
                    index,
                    reason: format!(
                        "subtrahend {} breaks continuity at {} (expected {})",
                        bracket.subtrahend,
                        bound,
                        bound * bracket.rate - below
                    ),
                });
            }
        }

        if let Some(upper) = bracket.upper_bound {
            previous = Some((upper, bracket));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
