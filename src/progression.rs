//! Training max progression
//!
//! Computes next cycle's training maxes from the current ones. Two policies:
//!
//! - **Classic**: a fixed bump per cycle, +5 upper body / +10 lower body.
//! - **Auto**: move toward 90% of the best recent estimated one-rep max,
//!   bounded to between half and double the classic bump. Without usable
//!   history the exercise gets the half bump.
//!
//! Only the exercises named as active are touched, and a training max never
//! goes down.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::models::{BodyRegion, Exercise, PerformanceRecord, TrainingMaxSet};

/// How training maxes advance between cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressionPolicy {
    /// Fixed per-cycle increment
    Classic,
    /// Increment derived from recent AMRAP performance
    #[default]
    Auto,
}

impl FromStr for ProgressionPolicy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "classic" | "fixed" => Ok(Self::Classic),
            "auto" | "adaptive" => Ok(Self::Auto),
            _ => Err(ParseError::UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for ProgressionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classic => write!(f, "classic"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

/// Increment magnitudes used by both policies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionRules {
    /// Classic bump for upper-body lifts
    pub upper_increment: Decimal,
    /// Classic bump for lower-body lifts
    pub lower_increment: Decimal,
    /// Fraction of estimated one-rep max the auto policy aims for
    pub target_ratio: Decimal,
    /// Smallest auto increment, and the no-data bump, as a fraction of classic
    pub floor_fraction: Decimal,
    /// Largest auto increment as a multiple of classic
    pub ceiling_multiplier: Decimal,
}

impl Default for ProgressionRules {
    fn default() -> Self {
        Self {
            upper_increment: dec!(5),
            lower_increment: dec!(10),
            target_ratio: dec!(0.90),
            floor_fraction: dec!(0.5),
            ceiling_multiplier: dec!(2.0),
        }
    }
}

impl ProgressionRules {
    pub fn classic_increment(&self, region: BodyRegion) -> Decimal {
        match region {
            BodyRegion::Upper => self.upper_increment,
            BodyRegion::Lower => self.lower_increment,
        }
    }

    pub fn min_increment(&self, region: BodyRegion) -> Decimal {
        self.classic_increment(region) * self.floor_fraction
    }

    pub fn max_increment(&self, region: BodyRegion) -> Decimal {
        self.classic_increment(region) * self.ceiling_multiplier
    }
}

/// Which bound an auto increment was pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClampBound {
    Min,
    Max,
}

/// Why a training max moved by the amount it did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IncrementReason {
    /// Fixed classic increment
    Classic,
    /// Auto policy with no usable history
    FloorBump,
    /// Auto policy aiming at a fraction of the best estimated one-rep max
    Target {
        /// Best estimate, rounded to a whole number
        best: Decimal,
        target: Decimal,
        clamped: Option<ClampBound>,
    },
}

/// Outcome for one exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingMaxChange {
    pub exercise: Exercise,
    pub previous: Decimal,
    pub updated: Decimal,
    pub reason: IncrementReason,
}

impl TrainingMaxChange {
    pub fn increment(&self) -> Decimal {
        self.updated - self.previous
    }
}

/// New training maxes together with a per-exercise breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressionReport {
    pub training_maxes: TrainingMaxSet,
    pub changes: Vec<TrainingMaxChange>,
}

/// Advance training maxes for the active exercises with the standard rules.
pub fn advance(
    current: &TrainingMaxSet,
    active: &BTreeSet<Exercise>,
    policy: ProgressionPolicy,
    history: &[PerformanceRecord],
) -> TrainingMaxSet {
    advance_with_rules(current, active, policy, history, &ProgressionRules::default())
}

/// Advance training maxes using custom increment rules.
///
/// Increments that come out negative under unusual rules are treated as zero.
pub fn advance_with_rules(
    current: &TrainingMaxSet,
    active: &BTreeSet<Exercise>,
    policy: ProgressionPolicy,
    history: &[PerformanceRecord],
    rules: &ProgressionRules,
) -> TrainingMaxSet {
    advance_with_report(current, active, policy, history, rules).training_maxes
}

/// Advance training maxes and explain each change.
pub fn advance_with_report(
    current: &TrainingMaxSet,
    active: &BTreeSet<Exercise>,
    policy: ProgressionPolicy,
    history: &[PerformanceRecord],
    rules: &ProgressionRules,
) -> ProgressionReport {
    let mut training_maxes = current.clone();
    let mut changes = Vec::with_capacity(active.len());

    for &exercise in active {
        let previous = current.get(exercise);
        let (increment, reason) = match policy {
            ProgressionPolicy::Classic => (
                rules.classic_increment(exercise.body_region()),
                IncrementReason::Classic,
            ),
            ProgressionPolicy::Auto => auto_increment(exercise, previous, history, rules),
        };
        // scale-free so 300 + 5.0 reads back as 305
        let updated = (previous + increment.max(Decimal::ZERO)).normalize();

        tracing::debug!(
            exercise = %exercise,
            %policy,
            %previous,
            %updated,
            "Advanced training max"
        );

        training_maxes.set(exercise, updated);
        changes.push(TrainingMaxChange {
            exercise,
            previous,
            updated,
            reason,
        });
    }

    ProgressionReport {
        training_maxes,
        changes,
    }
}

/// Highest positive estimated one-rep max recorded for an exercise
pub fn best_estimated_one_rep_max(
    exercise: Exercise,
    history: &[PerformanceRecord],
) -> Option<Decimal> {
    history
        .iter()
        .filter(|record| record.exercise == exercise && record.is_valid())
        .map(|record| record.estimated_one_rep_max)
        .max()
}

/// Auto-policy increment for one exercise.
///
/// The best estimate is rounded to a whole number before the target ratio is
/// applied. The result always lies in `[min_increment, max_increment]`.
pub fn auto_increment(
    exercise: Exercise,
    current: Decimal,
    history: &[PerformanceRecord],
    rules: &ProgressionRules,
) -> (Decimal, IncrementReason) {
    let region = exercise.body_region();

    let Some(best) = best_estimated_one_rep_max(exercise, history) else {
        return (rules.min_increment(region), IncrementReason::FloorBump);
    };

    let best = best.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let target = (best * rules.target_ratio).normalize();
    let raw = (target - current).max(Decimal::ZERO);

    let (min, max) = (rules.min_increment(region), rules.max_increment(region));
    let (increment, clamped) = if raw < min {
        (min, Some(ClampBound::Min))
    } else if raw > max {
        (max, Some(ClampBound::Max))
    } else {
        (raw, None)
    };

    (
        increment,
        IncrementReason::Target {
            best,
            target,
            clamped,
        },
    )
}
