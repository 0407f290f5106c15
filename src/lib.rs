// Library interface for WaveLift modules
// This allows integration tests and the CLI to share the core

pub mod config;
pub mod error;
pub mod formulas;
pub mod history;
pub mod logging;
pub mod models;
pub mod progression;
pub mod week_scheme;

// Re-export commonly used types for convenience
pub use models::*;
pub use week_scheme::{resolve, SetPrescription, WeekScheme, WorkingSet};
pub use progression::{
    advance, advance_with_report, advance_with_rules, ProgressionPolicy, ProgressionReport,
    ProgressionRules, TrainingMaxChange,
};
pub use formulas::{estimate_one_rep_max, OneRepMaxFormula};
pub use history::HistoryImporter;
pub use config::AppConfig;
pub use error::{WaveLiftError, Result};
pub use logging::{LogConfig, LogLevel, LogFormat};
