//! Estimated one-rep-max formulas
//!
//! Turns the load and rep count of an AMRAP set into an estimate of the
//! lifter's true one-rep max.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ParseError;

/// Rep counts above this are treated as this many; the formulas drift badly past it.
pub const MAX_RELIABLE_REPS: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OneRepMaxFormula {
    /// w × (1 + r/30)
    #[default]
    Epley,
    /// w × 36 / (37 − r)
    Brzycki,
    /// Mean of Epley and Brzycki
    Average,
}

impl FromStr for OneRepMaxFormula {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "epley" => Ok(Self::Epley),
            "brzycki" => Ok(Self::Brzycki),
            "average" | "avg" => Ok(Self::Average),
            _ => Err(ParseError::UnknownFormula(s.to_string())),
        }
    }
}

/// Estimate a one-rep max from an AMRAP set.
///
/// Returns zero for a non-positive weight or zero reps, which the progression
/// engine treats as missing data. A single rep is already a one-rep max.
pub fn estimate_one_rep_max(weight: Decimal, reps: u32, formula: OneRepMaxFormula) -> Decimal {
    if weight <= Decimal::ZERO || reps == 0 {
        return Decimal::ZERO;
    }
    if reps == 1 {
        return weight;
    }

    let r = Decimal::from(reps.min(MAX_RELIABLE_REPS));
    match formula {
        OneRepMaxFormula::Epley => epley(weight, r),
        OneRepMaxFormula::Brzycki => brzycki(weight, r),
        OneRepMaxFormula::Average => (epley(weight, r) + brzycki(weight, r)) / dec!(2),
    }
}

fn epley(weight: Decimal, reps: Decimal) -> Decimal {
    weight * (Decimal::ONE + reps / dec!(30))
}

fn brzycki(weight: Decimal, reps: Decimal) -> Decimal {
    // reps is capped at 15 so the denominator stays positive
    weight * dec!(36) / (dec!(37) - reps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epley() {
        // 100 × (1 + 3/30) = 110
        assert_eq!(
            estimate_one_rep_max(dec!(100), 3, OneRepMaxFormula::Epley),
            dec!(110)
        );
    }

    #[test]
    fn test_brzycki() {
        // 100 × 36 / 32 = 112.5
        assert_eq!(
            estimate_one_rep_max(dec!(100), 5, OneRepMaxFormula::Brzycki),
            dec!(112.5)
        );
    }

    #[test]
    fn test_average() {
        // Epley 100 × (1 + 10/30) ≈ 133.33, Brzycki 100 × 36 / 27 ≈ 133.33
        let e1rm = estimate_one_rep_max(dec!(100), 10, OneRepMaxFormula::Average);
        assert!((e1rm - dec!(133.33)).abs() < dec!(0.01));
    }

    #[test]
    fn test_single_rep_is_the_weight() {
        for formula in [
            OneRepMaxFormula::Epley,
            OneRepMaxFormula::Brzycki,
            OneRepMaxFormula::Average,
        ] {
            assert_eq!(estimate_one_rep_max(dec!(140), 1, formula), dec!(140));
        }
    }

    #[test]
    fn test_no_data_yields_zero() {
        assert_eq!(
            estimate_one_rep_max(dec!(0), 5, OneRepMaxFormula::Epley),
            Decimal::ZERO
        );
        assert_eq!(
            estimate_one_rep_max(dec!(100), 0, OneRepMaxFormula::Epley),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_reps_are_capped() {
        let at_cap = estimate_one_rep_max(dec!(100), MAX_RELIABLE_REPS, OneRepMaxFormula::Epley);
        let beyond = estimate_one_rep_max(dec!(100), 30, OneRepMaxFormula::Epley);
        assert_eq!(at_cap, beyond);
        assert_eq!(at_cap, dec!(150));
    }

    #[test]
    fn test_formula_parsing() {
        assert_eq!("Epley".parse::<OneRepMaxFormula>().unwrap(), OneRepMaxFormula::Epley);
        assert_eq!("avg".parse::<OneRepMaxFormula>().unwrap(), OneRepMaxFormula::Average);
        assert!("lander".parse::<OneRepMaxFormula>().is_err());
    }
}
