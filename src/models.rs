use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ParseError, WaveLiftError};
use crate::formulas::{estimate_one_rep_max, OneRepMaxFormula};

/// Main lifts tracked by the program
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exercise {
    Squat,
    Bench,
    Deadlift,
    Row,
    OverheadPress,
}

/// Body region an exercise belongs to, used to size increments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyRegion {
    Upper,
    Lower,
}

impl Exercise {
    /// Every exercise, in display order
    pub const ALL: [Exercise; 5] = [
        Exercise::Squat,
        Exercise::Bench,
        Exercise::Deadlift,
        Exercise::Row,
        Exercise::OverheadPress,
    ];

    pub fn body_region(&self) -> BodyRegion {
        match self {
            Exercise::Squat | Exercise::Deadlift => BodyRegion::Lower,
            Exercise::Bench | Exercise::Row | Exercise::OverheadPress => BodyRegion::Upper,
        }
    }

    /// External string label, used at serialization boundaries
    pub fn label(&self) -> &'static str {
        match self {
            Exercise::Squat => "squat",
            Exercise::Bench => "bench",
            Exercise::Deadlift => "deadlift",
            Exercise::Row => "row",
            Exercise::OverheadPress => "overhead_press",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Exercise::Squat => "Squat",
            Exercise::Bench => "Bench Press",
            Exercise::Deadlift => "Deadlift",
            Exercise::Row => "Row",
            Exercise::OverheadPress => "Overhead Press",
        }
    }
}

/// Classify an exercise as upper or lower body.
pub fn body_region(exercise: Exercise) -> BodyRegion {
    exercise.body_region()
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Exercise {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "squat" | "back_squat" => Ok(Exercise::Squat),
            "bench" | "bench_press" => Ok(Exercise::Bench),
            "deadlift" | "dl" => Ok(Exercise::Deadlift),
            "row" | "barbell_row" => Ok(Exercise::Row),
            "overhead_press" | "ohp" | "press" => Ok(Exercise::OverheadPress),
            _ => Err(ParseError::UnknownExercise(s.to_string())),
        }
    }
}

impl fmt::Display for BodyRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyRegion::Upper => write!(f, "upper"),
            BodyRegion::Lower => write!(f, "lower"),
        }
    }
}

/// Training max for every exercise.
///
/// Always holds exactly one entry per [`Exercise`]; there is no way to build a
/// partial set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TrainingMaxSet {
    values: BTreeMap<Exercise, Decimal>,
}

impl TrainingMaxSet {
    pub fn new(
        squat: Decimal,
        bench: Decimal,
        deadlift: Decimal,
        row: Decimal,
        overhead_press: Decimal,
    ) -> Self {
        Self::from_fn(|exercise| match exercise {
            Exercise::Squat => squat,
            Exercise::Bench => bench,
            Exercise::Deadlift => deadlift,
            Exercise::Row => row,
            Exercise::OverheadPress => overhead_press,
        })
    }

    /// Build a set by asking for the value of each exercise
    pub fn from_fn(mut value_for: impl FnMut(Exercise) -> Decimal) -> Self {
        let values = Exercise::ALL
            .iter()
            .map(|&exercise| (exercise, value_for(exercise)))
            .collect();
        Self { values }
    }

    /// Build a set from a map that must name every exercise
    pub fn try_from_map(map: &BTreeMap<Exercise, Decimal>) -> Result<Self, WaveLiftError> {
        if let Some(missing) = Exercise::ALL.iter().find(|e| !map.contains_key(e)) {
            return Err(WaveLiftError::MissingTrainingMax(*missing));
        }
        Ok(Self::from_fn(|exercise| map[&exercise]))
    }

    /// Build a set from `exercise=value` pairs naming every exercise exactly once
    pub fn try_from_assignments(assignments: &[(Exercise, Decimal)]) -> Result<Self, WaveLiftError> {
        Self::try_from_map(&collect_training_maxes(assignments)?)
    }

    pub fn get(&self, exercise: Exercise) -> Decimal {
        // every key is populated on construction
        self.values.get(&exercise).copied().unwrap_or_default()
    }

    pub fn set(&mut self, exercise: Exercise, value: Decimal) {
        self.values.insert(exercise, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Exercise, Decimal)> + '_ {
        self.values.iter().map(|(e, v)| (*e, *v))
    }
}

impl<'de> Deserialize<'de> for TrainingMaxSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let map = BTreeMap::<Exercise, Decimal>::deserialize(deserializer)?;
        TrainingMaxSet::try_from_map(&map).map_err(serde::de::Error::custom)
    }
}

/// Parse an `exercise=value` training max assignment, e.g. `squat=300`
pub fn parse_training_max(input: &str) -> Result<(Exercise, Decimal), ParseError> {
    let invalid = |reason: &str| ParseError::InvalidAssignment {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let (label, value) = input
        .split_once('=')
        .ok_or_else(|| invalid("expected exercise=value"))?;
    let exercise = label.parse::<Exercise>()?;
    let value = value
        .trim()
        .parse::<Decimal>()
        .map_err(|_| invalid("value is not a number"))?;

    Ok((exercise, value))
}

/// Collect `exercise=value` pairs, rejecting an exercise named twice
pub fn collect_training_maxes(
    assignments: &[(Exercise, Decimal)],
) -> Result<BTreeMap<Exercise, Decimal>, WaveLiftError> {
    let mut map = BTreeMap::new();
    for &(exercise, value) in assignments {
        if map.insert(exercise, value).is_some() {
            return Err(WaveLiftError::DuplicateTrainingMax(exercise));
        }
    }
    Ok(map)
}

/// Result of one historical AMRAP set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub exercise: Exercise,

    /// Estimated one-rep max derived from the set; non-positive means no data
    pub estimated_one_rep_max: Decimal,

    /// Day the set was performed, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_on: Option<NaiveDate>,
}

impl PerformanceRecord {
    pub fn new(exercise: Exercise, estimated_one_rep_max: Decimal) -> Self {
        Self {
            exercise,
            estimated_one_rep_max,
            recorded_on: None,
        }
    }

    /// Derive a record from the load and reps of an AMRAP set using the Epley formula
    pub fn from_amrap(exercise: Exercise, weight: Decimal, reps: u32) -> Self {
        Self::new(
            exercise,
            estimate_one_rep_max(weight, reps, OneRepMaxFormula::Epley),
        )
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.recorded_on = Some(date);
        self
    }

    /// Whether the record carries usable data
    pub fn is_valid(&self) -> bool {
        self.estimated_one_rep_max > Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_set() -> TrainingMaxSet {
        TrainingMaxSet::new(dec!(300), dec!(200), dec!(350), dec!(150), dec!(120))
    }

    #[test]
    fn test_body_region_classification() {
        assert_eq!(body_region(Exercise::Squat), BodyRegion::Lower);
        assert_eq!(body_region(Exercise::Deadlift), BodyRegion::Lower);
        assert_eq!(body_region(Exercise::Bench), BodyRegion::Upper);
        assert_eq!(body_region(Exercise::Row), BodyRegion::Upper);
        assert_eq!(body_region(Exercise::OverheadPress), BodyRegion::Upper);

        // Stable across calls
        for exercise in Exercise::ALL {
            assert_eq!(body_region(exercise), body_region(exercise));
        }
    }

    #[test]
    fn test_exercise_label_round_trip() {
        for exercise in Exercise::ALL {
            assert_eq!(exercise.label().parse::<Exercise>().unwrap(), exercise);
        }
        assert_eq!("OHP".parse::<Exercise>().unwrap(), Exercise::OverheadPress);
        assert_eq!("Bench Press".parse::<Exercise>().unwrap(), Exercise::Bench);
        assert!("curl".parse::<Exercise>().is_err());
    }

    #[test]
    fn test_training_max_set_is_complete() {
        let set = sample_set();
        assert_eq!(set.iter().count(), 5);
        assert_eq!(set.get(Exercise::Deadlift), dec!(350));
        assert_eq!(set.get(Exercise::OverheadPress), dec!(120));
    }

    #[test]
    fn test_try_from_map_rejects_partial_input() {
        let mut map = BTreeMap::new();
        map.insert(Exercise::Squat, dec!(300));
        map.insert(Exercise::Bench, dec!(200));

        let err = TrainingMaxSet::try_from_map(&map).unwrap_err();
        assert!(matches!(err, WaveLiftError::MissingTrainingMax(Exercise::Deadlift)));
    }

    #[test]
    fn test_assignments_reject_duplicates() {
        let assignments = [
            (Exercise::Squat, dec!(300)),
            (Exercise::Bench, dec!(200)),
            (Exercise::Deadlift, dec!(350)),
            (Exercise::Row, dec!(150)),
            (Exercise::OverheadPress, dec!(120)),
        ];
        assert_eq!(
            TrainingMaxSet::try_from_assignments(&assignments).unwrap(),
            sample_set()
        );

        let mut repeated = assignments.to_vec();
        repeated.push((Exercise::Squat, dec!(320)));
        let err = TrainingMaxSet::try_from_assignments(&repeated).unwrap_err();
        assert!(matches!(err, WaveLiftError::DuplicateTrainingMax(Exercise::Squat)));

        let err = collect_training_maxes(&[(Exercise::Row, dec!(100)), (Exercise::Row, dec!(100))])
            .unwrap_err();
        assert!(matches!(err, WaveLiftError::DuplicateTrainingMax(Exercise::Row)));
    }

    #[test]
    fn test_training_max_set_serde() {
        let set = sample_set();
        let json = serde_json::to_string(&set).unwrap();
        assert!(json.contains("\"overhead_press\""));

        let restored: TrainingMaxSet = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, set);

        let partial = r#"{"squat": "300"}"#;
        assert!(serde_json::from_str::<TrainingMaxSet>(partial).is_err());
    }

    #[test]
    fn test_parse_training_max() {
        assert_eq!(
            parse_training_max("squat=300").unwrap(),
            (Exercise::Squat, dec!(300))
        );
        assert_eq!(
            parse_training_max("ohp = 102.5").unwrap(),
            (Exercise::OverheadPress, dec!(102.5))
        );
        assert!(matches!(
            parse_training_max("squat300"),
            Err(ParseError::InvalidAssignment { .. })
        ));
        assert!(matches!(
            parse_training_max("squat=heavy"),
            Err(ParseError::InvalidAssignment { .. })
        ));
        assert_eq!(
            parse_training_max("curl=40"),
            Err(ParseError::UnknownExercise("curl".to_string()))
        );
    }

    #[test]
    fn test_performance_record_validity() {
        assert!(PerformanceRecord::new(Exercise::Squat, dec!(340)).is_valid());
        assert!(!PerformanceRecord::new(Exercise::Squat, dec!(0)).is_valid());
        assert!(!PerformanceRecord::new(Exercise::Squat, dec!(-10)).is_valid());
    }

    #[test]
    fn test_record_from_amrap() {
        // 300 x 6 => 300 * (1 + 6/30) = 360
        let record = PerformanceRecord::from_amrap(Exercise::Squat, dec!(300), 6);
        assert_eq!(record.estimated_one_rep_max, dec!(360));
        assert_eq!(record.recorded_on, None);
    }
}
