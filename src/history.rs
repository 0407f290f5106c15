//! Performance history import
//!
//! Reads AMRAP results from CSV. This is the only place exercise labels are
//! turned into typed [`Exercise`] values; the progression engine never sees
//! strings.

use chrono::NaiveDate;
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::HistoryError;
use crate::formulas::{estimate_one_rep_max, OneRepMaxFormula};
use crate::models::{Exercise, PerformanceRecord};

/// CSV importer with flexible column names
///
/// Each row needs an exercise and either an estimated one-rep max or the
/// weight and reps of the AMRAP set. A date column is optional.
pub struct HistoryImporter {
    column_mapping: HashMap<String, String>,
    formula: OneRepMaxFormula,
}

impl Default for HistoryImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryImporter {
    pub fn new() -> Self {
        let mut column_mapping = HashMap::new();

        Self::add_mapping(&mut column_mapping, "exercise", &["exercise", "lift", "movement", "name"]);
        Self::add_mapping(
            &mut column_mapping,
            "estimated_one_rep_max",
            &["estimated_one_rep_max", "e1rm", "estimated_1rm", "one_rep_max", "1rm"],
        );
        Self::add_mapping(&mut column_mapping, "weight", &["weight", "load", "kg", "lbs"]);
        Self::add_mapping(&mut column_mapping, "reps", &["reps", "repetitions", "amrap_reps"]);
        Self::add_mapping(&mut column_mapping, "date", &["date", "day", "performed_on", "recorded_on"]);

        Self {
            column_mapping,
            formula: OneRepMaxFormula::default(),
        }
    }

    /// Formula used when a row gives weight and reps instead of an estimate
    pub fn with_formula(mut self, formula: OneRepMaxFormula) -> Self {
        self.formula = formula;
        self
    }

    fn add_mapping(mapping: &mut HashMap<String, String>, standard: &str, variations: &[&str]) {
        for variation in variations {
            mapping.insert(variation.to_lowercase(), standard.to_string());
        }
    }

    fn normalize_column_name(&self, name: &str) -> String {
        let normalized = name.trim().to_lowercase().replace([' ', '-'], "_");

        self.column_mapping
            .get(&normalized)
            .cloned()
            .unwrap_or(normalized)
    }

    pub fn import_file(&self, file_path: &Path) -> Result<Vec<PerformanceRecord>, HistoryError> {
        if !file_path.exists() {
            return Err(HistoryError::FileNotFound {
                path: file_path.to_path_buf(),
            });
        }
        let file = std::fs::File::open(file_path).map_err(csv::Error::from)?;
        let records = self.import_reader(file)?;

        tracing::info!(
            path = %file_path.display(),
            records = records.len(),
            "Imported performance history"
        );
        Ok(records)
    }

    pub fn import_reader<R: Read>(&self, source: R) -> Result<Vec<PerformanceRecord>, HistoryError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(source);

        let headers = reader.headers()?.clone();
        let columns: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (self.normalize_column_name(header), i))
            .collect();

        let column = |name: &str| columns.get(name).copied();
        let exercise_col = column("exercise").ok_or_else(|| HistoryError::MissingColumn {
            column: "exercise".to_string(),
        })?;
        let estimate_col = column("estimated_one_rep_max");
        let weight_reps_cols = column("weight").zip(column("reps"));
        if estimate_col.is_none() && weight_reps_cols.is_none() {
            return Err(HistoryError::MissingColumn {
                column: "estimated_one_rep_max (or weight and reps)".to_string(),
            });
        }
        let date_col = column("date");

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result?;
            // header is line 1
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            let field = |i: usize| row.get(i).unwrap_or("");
            let invalid = |reason: String| HistoryError::InvalidRecord { line, reason };

            let exercise: Exercise = field(exercise_col)
                .parse()
                .map_err(|e: crate::error::ParseError| invalid(e.to_string()))?;

            let estimate = match estimate_col.map(field).filter(|v| !v.is_empty()) {
                Some(value) => parse_decimal(value).map_err(invalid)?,
                None => match weight_reps_cols {
                    Some((weight_col, reps_col)) => {
                        let weight = parse_decimal(field(weight_col)).map_err(invalid)?;
                        let reps = field(reps_col)
                            .parse::<u32>()
                            .map_err(|_| invalid(format!("Invalid reps: '{}'", field(reps_col))))?;
                        estimate_one_rep_max(weight, reps, self.formula)
                    }
                    None => return Err(invalid("No estimated one-rep max".to_string())),
                },
            };

            let mut record = PerformanceRecord::new(exercise, estimate);
            if let Some(value) = date_col.map(field).filter(|v| !v.is_empty()) {
                let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .map_err(|_| invalid(format!("Invalid date: '{}'", value)))?;
                record = record.on(date);
            }
            records.push(record);
        }

        Ok(records)
    }
}

fn parse_decimal(value: &str) -> Result<Decimal, String> {
    value
        .parse::<Decimal>()
        .map_err(|_| format!("Invalid number: '{}'", value))
}

/// Keep records performed on or after `since`. Undated records are kept.
pub fn filter_since(records: &[PerformanceRecord], since: NaiveDate) -> Vec<PerformanceRecord> {
    records
        .iter()
        .filter(|record| record.recorded_on.map_or(true, |date| date >= since))
        .cloned()
        .collect()
}
