//! Error types for WaveLift
//!
//! The calculation core never fails. These errors only appear at the edges:
//! parsing user input, importing history files and loading configuration.

use std::path::PathBuf;
use thiserror::Error;

use crate::models::Exercise;

/// Top-level error type for all WaveLift operations
#[derive(Debug, Error)]
pub enum WaveLiftError {
    /// Text could not be turned into a domain value
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// A training max set was built without every exercise
    #[error("Missing training max for {0}")]
    MissingTrainingMax(Exercise),

    /// The same exercise was given a training max more than once
    #[error("Training max for {0} given more than once")]
    DuplicateTrainingMax(Exercise),

    /// Performance history import failed
    #[error("History import error: {0}")]
    History(#[from] HistoryError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors converting external labels into typed values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),

    #[error("Unknown progression policy: {0}")]
    UnknownPolicy(String),

    #[error("Unknown one-rep-max formula: {0}")]
    UnknownFormula(String),

    /// Expected `exercise=value`
    #[error("Invalid training max assignment '{input}': {reason}")]
    InvalidAssignment { input: String, reason: String },
}

/// Performance history import errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// File could not be opened
    #[error("History file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// CSV structure is unusable
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Neither an estimate nor weight/reps columns are present
    #[error("Missing column: {column}")]
    MissingColumn { column: String },

    /// A row could not be interpreted
    #[error("Invalid record on line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },
}

/// Result type alias for WaveLift operations
pub type Result<T> = std::result::Result<T, WaveLiftError>;

impl WaveLiftError {
    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            WaveLiftError::Parse(ParseError::UnknownExercise(label)) => format!(
                "'{}' is not a tracked lift. Use one of: squat, bench, deadlift, row, overhead_press.",
                label
            ),
            WaveLiftError::MissingTrainingMax(exercise) => format!(
                "No training max given for {}. Every lift needs a starting value.",
                exercise.display_name()
            ),
            WaveLiftError::DuplicateTrainingMax(exercise) => format!(
                "{} has more than one training max. Give each lift exactly once.",
                exercise.display_name()
            ),
            WaveLiftError::History(HistoryError::FileNotFound { path }) => {
                format!("Could not find history file: {}", path.display())
            }
            _ => self.to_string(),
        }
    }
}
