//! Week scheme resolution
//!
//! Maps a week of the 4-week wave onto its prescribed main-lift sets. The
//! table is static: weeks 2, 3 and 4 have their own schemes and every other
//! week number (including 1, zero, negatives and anything past 4) gets the
//! 5s-week default.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// One prescribed set within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPrescription {
    /// Fraction of training max, in (0, 1]
    pub percentage: Decimal,
    pub reps: u32,
    /// As many reps as possible on this set
    pub is_amrap: bool,
}

impl SetPrescription {
    const fn fixed(percentage: Decimal, reps: u32) -> Self {
        Self {
            percentage,
            reps,
            is_amrap: false,
        }
    }

    const fn amrap(percentage: Decimal, reps: u32) -> Self {
        Self {
            percentage,
            reps,
            is_amrap: true,
        }
    }
}

/// Prescribed main-lift work for one week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekScheme {
    /// Lightest to heaviest
    pub main_sets: [SetPrescription; 3],
    pub include_auxiliary_volume: bool,
    /// Summary of the top set, e.g. "90% × 3+"
    pub display_label: String,
}

/// A prescription turned into a concrete load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingSet {
    pub weight: Decimal,
    pub reps: u32,
    pub is_amrap: bool,
    pub percentage: Decimal,
}

impl WeekScheme {
    /// The heaviest set of the session
    pub fn top_set(&self) -> &SetPrescription {
        &self.main_sets[2]
    }

    pub fn is_deload(&self) -> bool {
        !self.main_sets.iter().any(|set| set.is_amrap)
    }

    /// Concrete loads for a training max, rounded to the nearest multiple of
    /// `rounding_increment`. A non-positive increment disables rounding.
    pub fn working_sets(&self, training_max: Decimal, rounding_increment: Decimal) -> Vec<WorkingSet> {
        self.main_sets
            .iter()
            .map(|set| WorkingSet {
                weight: round_to_increment(training_max * set.percentage, rounding_increment),
                reps: set.reps,
                is_amrap: set.is_amrap,
                percentage: set.percentage,
            })
            .collect()
    }
}

/// Round a load to the nearest loadable increment (e.g. 2.5 for the smallest plate pair)
pub fn round_to_increment(weight: Decimal, increment: Decimal) -> Decimal {
    if increment <= Decimal::ZERO {
        return weight;
    }
    let steps = (weight / increment).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    (steps * increment).normalize()
}

/// Resolve the prescribed scheme for a week number.
pub fn resolve(week: i32) -> WeekScheme {
    let scheme = match week {
        2 => WeekScheme {
            main_sets: [
                SetPrescription::fixed(dec!(0.70), 3),
                SetPrescription::fixed(dec!(0.80), 3),
                SetPrescription::amrap(dec!(0.90), 3),
            ],
            include_auxiliary_volume: true,
            display_label: "90% × 3+".to_string(),
        },
        3 => WeekScheme {
            main_sets: [
                SetPrescription::fixed(dec!(0.75), 5),
                SetPrescription::fixed(dec!(0.85), 3),
                SetPrescription::amrap(dec!(0.95), 1),
            ],
            include_auxiliary_volume: true,
            display_label: "95% × 1+".to_string(),
        },
        4 => WeekScheme {
            main_sets: [
                SetPrescription::fixed(dec!(0.40), 5),
                SetPrescription::fixed(dec!(0.50), 5),
                SetPrescription::fixed(dec!(0.60), 5),
            ],
            include_auxiliary_volume: false,
            display_label: "Deload: 60% × 5".to_string(),
        },
        _ => WeekScheme {
            main_sets: [
                SetPrescription::fixed(dec!(0.65), 5),
                SetPrescription::fixed(dec!(0.75), 5),
                SetPrescription::amrap(dec!(0.85), 5),
            ],
            include_auxiliary_volume: true,
            display_label: "85% × 5+".to_string(),
        },
    };

    tracing::trace!(week, label = %scheme.display_label, "Resolved week scheme");
    scheme
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn shape(scheme: &WeekScheme) -> Vec<(Decimal, u32, bool)> {
        scheme
            .main_sets
            .iter()
            .map(|s| (s.percentage, s.reps, s.is_amrap))
            .collect()
    }

    #[test]
    fn test_week_two() {
        let scheme = resolve(2);
        assert_eq!(
            shape(&scheme),
            vec![
                (dec!(0.70), 3, false),
                (dec!(0.80), 3, false),
                (dec!(0.90), 3, true)
            ]
        );
        assert!(scheme.include_auxiliary_volume);
        assert_eq!(scheme.display_label, "90% × 3+");
    }

    #[test]
    fn test_week_three() {
        let scheme = resolve(3);
        assert_eq!(
            shape(&scheme),
            vec![
                (dec!(0.75), 5, false),
                (dec!(0.85), 3, false),
                (dec!(0.95), 1, true)
            ]
        );
        assert!(scheme.include_auxiliary_volume);
        assert_eq!(scheme.display_label, "95% × 1+");
    }

    #[test]
    fn test_deload_week() {
        let scheme = resolve(4);
        assert_eq!(
            shape(&scheme),
            vec![
                (dec!(0.40), 5, false),
                (dec!(0.50), 5, false),
                (dec!(0.60), 5, false)
            ]
        );
        assert!(!scheme.include_auxiliary_volume);
        assert!(scheme.is_deload());
        assert_eq!(scheme.display_label, "Deload: 60% × 5");
    }

    #[test]
    fn test_default_scheme_for_unmatched_weeks() {
        for week in [1, 0, -1, 5, 8, i32::MIN, i32::MAX] {
            let scheme = resolve(week);
            assert_eq!(
                shape(&scheme),
                vec![
                    (dec!(0.65), 5, false),
                    (dec!(0.75), 5, false),
                    (dec!(0.85), 5, true)
                ],
                "week {}",
                week
            );
            assert!(scheme.include_auxiliary_volume);
            assert_eq!(scheme.display_label, "85% × 5+");
        }
    }

    #[test]
    fn test_working_sets_rounding() {
        // 85% of 300 = 255; 65% of 300 = 195; 75% of 300 = 225
        let sets = resolve(1).working_sets(dec!(300), dec!(2.5));
        let weights: Vec<Decimal> = sets.iter().map(|s| s.weight).collect();
        assert_eq!(weights, vec![dec!(195), dec!(225), dec!(255)]);
        assert!(sets[2].is_amrap);

        // 95% of 205 = 194.75 -> 195
        let top = resolve(3).working_sets(dec!(205), dec!(2.5))[2];
        assert_eq!(top.weight, dec!(195));
    }

    #[test]
    fn test_round_to_increment() {
        assert_eq!(round_to_increment(dec!(101.2), dec!(2.5)), dec!(100));
        assert_eq!(round_to_increment(dec!(101.25), dec!(2.5)), dec!(102.5));
        assert_eq!(round_to_increment(dec!(101.2), dec!(0)), dec!(101.2));
    }

    proptest! {
        #[test]
        fn test_scheme_shape_invariants(week in any::<i32>()) {
            let scheme = resolve(week);

            prop_assert_eq!(scheme.main_sets.len(), 3);
            let amrap_count = scheme.main_sets.iter().filter(|s| s.is_amrap).count();
            prop_assert!(amrap_count <= 1);
            if amrap_count == 1 {
                prop_assert!(scheme.main_sets[2].is_amrap);
            }
            prop_assert!(scheme.main_sets.windows(2).all(|w| w[0].percentage < w[1].percentage));
            for set in &scheme.main_sets {
                prop_assert!(set.percentage > Decimal::ZERO && set.percentage <= Decimal::ONE);
                prop_assert!(set.reps > 0);
            }
        }
    }
}
