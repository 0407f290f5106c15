use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

use wavelift::history::{filter_since, HistoryImporter};
use wavelift::logging::{init_logging, LogFormat, LogLevel};
use wavelift::models::{collect_training_maxes, parse_training_max};
use wavelift::progression::IncrementReason;
use wavelift::{
    advance_with_report, estimate_one_rep_max, resolve, AppConfig, Exercise, OneRepMaxFormula,
    ProgressionPolicy, TrainingMaxSet, WaveLiftError,
};

/// WaveLift - 4-week wave strength program calculator
///
/// Prints the prescribed sets for a week of the cycle and computes the next
/// cycle's training maxes.
#[derive(Parser)]
#[command(name = "wavelift")]
#[command(version)]
#[command(about = "Wave-cycle strength program calculator", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log level (error, warn, info, debug, trace); overrides config and -v
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format on stderr (pretty, json, compact)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the prescribed sets for a week of the cycle
    Week {
        /// Week number (2, 3 and 4 have their own schemes; anything else is a 5s week)
        #[arg(allow_negative_numbers = true)]
        week: i32,

        /// Training max to compute loads for, as exercise=value (repeatable)
        #[arg(long = "tm", value_name = "EXERCISE=VALUE", value_parser = parse_training_max)]
        training_maxes: Vec<(Exercise, Decimal)>,

        /// Round loads to this increment (overrides config)
        #[arg(long)]
        rounding: Option<Decimal>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Compute next cycle's training maxes
    Advance {
        /// Current training max for every exercise, as exercise=value
        #[arg(long = "tm", value_name = "EXERCISE=VALUE", value_parser = parse_training_max, required = true)]
        training_maxes: Vec<(Exercise, Decimal)>,

        /// Exercises to advance (default: all)
        #[arg(short, long, value_delimiter = ',')]
        active: Vec<Exercise>,

        /// Progression policy: classic or auto (default from config)
        #[arg(short, long)]
        policy: Option<ProgressionPolicy>,

        /// CSV file of AMRAP results
        #[arg(long, value_name = "FILE")]
        history: Option<PathBuf>,

        /// Only use history recorded on or after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Estimate a one-rep max from an AMRAP set
    Estimate {
        /// Load lifted
        weight: Decimal,

        /// Reps completed
        reps: u32,

        /// Formula: epley, brzycki or average (default from config)
        #[arg(short, long)]
        formula: Option<OneRepMaxFormula>,
    },
}

#[derive(Tabled)]
struct SetRow {
    #[tabled(rename = "Set")]
    number: usize,
    #[tabled(rename = "%")]
    percentage: String,
    #[tabled(rename = "Reps")]
    reps: String,
    #[tabled(rename = "Load")]
    load: String,
}

#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "Exercise")]
    exercise: String,
    #[tabled(rename = "Current")]
    previous: Decimal,
    #[tabled(rename = "Next")]
    updated: Decimal,
    #[tabled(rename = "Change")]
    increment: String,
    #[tabled(rename = "Basis")]
    basis: String,
}

fn main() {
    if let Err(err) = run() {
        let message = match err.downcast_ref::<WaveLiftError>() {
            Some(wave_err) => wave_err.user_message(),
            None => format!("{:#}", err),
        };
        eprintln!("{} {}", "error:".red().bold(), message);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_or_default(),
    };

    let mut log_config = config.logging.clone();
    if cli.verbose > 0 {
        log_config.level = LogLevel::from_verbosity(cli.verbose);
    }
    if let Some(level) = cli.log_level {
        log_config.level = level;
    }
    if let Some(format) = cli.log_format {
        log_config.format = format;
    }
    init_logging(&log_config)?;

    match cli.command {
        Commands::Week {
            week,
            training_maxes,
            rounding,
            json,
        } => show_week(
            week,
            &training_maxes,
            rounding.unwrap_or(config.loading.rounding_increment),
            json,
        ),

        Commands::Advance {
            training_maxes,
            active,
            policy,
            history,
            since,
            json,
        } => {
            let current = TrainingMaxSet::try_from_assignments(&training_maxes)?;

            let active: BTreeSet<Exercise> = if active.is_empty() {
                Exercise::ALL.into_iter().collect()
            } else {
                active.into_iter().collect()
            };

            let mut records = match history {
                Some(path) => HistoryImporter::new()
                    .with_formula(config.history.formula)
                    .import_file(&path)
                    .map_err(WaveLiftError::from)
                    .with_context(|| format!("Failed to import history from {}", path.display()))?,
                None => Vec::new(),
            };
            if let Some(since) = since {
                records = filter_since(&records, since);
            }

            let policy = policy.unwrap_or(config.default_policy);
            let report = advance_with_report(&current, &active, policy, &records, &config.progression);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!(
                "{} {}",
                "Next cycle training maxes".green().bold(),
                format!("({} policy, {} history records)", policy, records.len()).dimmed()
            );
            let rows: Vec<ChangeRow> = report
                .changes
                .iter()
                .map(|change| ChangeRow {
                    exercise: change.exercise.display_name().to_string(),
                    previous: change.previous,
                    updated: change.updated,
                    increment: format!("+{}", change.increment().normalize()),
                    basis: describe_reason(&change.reason),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
            Ok(())
        }

        Commands::Estimate {
            weight,
            reps,
            formula,
        } => {
            let formula = formula.unwrap_or(config.history.formula);
            let estimate = estimate_one_rep_max(weight, reps, formula);
            println!(
                "{} × {} → {} {}",
                weight,
                reps,
                estimate.round_dp(1).normalize().to_string().bold(),
                format!("({:?})", formula).dimmed()
            );
            Ok(())
        }
    }
}

fn show_week(
    week: i32,
    training_maxes: &[(Exercise, Decimal)],
    rounding: Decimal,
    json: bool,
) -> Result<()> {
    collect_training_maxes(training_maxes)?;
    let scheme = resolve(week);

    if json {
        let loads: BTreeMap<Exercise, _> = training_maxes
            .iter()
            .map(|&(exercise, tm)| (exercise, scheme.working_sets(tm, rounding)))
            .collect();
        let output = serde_json::json!({ "week": week, "scheme": scheme, "loads": loads });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{} {}", format!("Week {}:", week).cyan().bold(), scheme.display_label);
    if !scheme.include_auxiliary_volume {
        println!("{}", "No auxiliary volume this week".yellow());
    }

    let targets: Vec<(String, Option<Decimal>)> = if training_maxes.is_empty() {
        vec![(String::new(), None)]
    } else {
        training_maxes
            .iter()
            .map(|&(exercise, tm)| (format!("{} (TM {})", exercise.display_name(), tm), Some(tm)))
            .collect()
    };

    for (heading, tm) in targets {
        if !heading.is_empty() {
            println!("\n{}", heading.bold());
        }
        let rows: Vec<SetRow> = scheme
            .main_sets
            .iter()
            .enumerate()
            .map(|(i, set)| SetRow {
                number: i + 1,
                percentage: format!("{}%", (set.percentage * Decimal::ONE_HUNDRED).normalize()),
                reps: if set.is_amrap {
                    format!("{}+", set.reps)
                } else {
                    set.reps.to_string()
                },
                load: tm
                    .map(|tm| {
                        scheme.working_sets(tm, rounding)[i]
                            .weight
                            .normalize()
                            .to_string()
                    })
                    .unwrap_or_else(|| "-".to_string()),
            })
            .collect();
        println!("{}", Table::new(rows).with(Style::rounded()));
    }

    Ok(())
}

fn describe_reason(reason: &IncrementReason) -> String {
    match reason {
        IncrementReason::Classic => "fixed increment".to_string(),
        IncrementReason::FloorBump => "no AMRAP data, minimum bump".to_string(),
        IncrementReason::Target {
            best,
            target,
            clamped,
        } => {
            let bound = match clamped {
                Some(bound) => format!(", clamped to {:?}", bound).to_lowercase(),
                None => String::new(),
            };
            format!("best e1RM {} → target {}{}", best, target.normalize(), bound)
        }
    }
}
