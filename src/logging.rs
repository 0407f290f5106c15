//! Structured logging for WaveLift
//!
//! The calculation modules only emit `tracing` events; this module installs
//! the subscriber for the binary.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,

    /// Format of the stderr output
    pub format: LogFormat,

    /// Also write JSON lines to this file, rotated daily
    pub file_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Compact,
            file_path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Map a `-v` count onto a level, starting from warn
    pub fn from_verbosity(verbose: u8) -> Self {
        match verbose {
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    pub fn to_tracing_level(&self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line with colors
    Pretty,
    Json,
    /// Single line per event
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

/// Filter for the crate's events.
///
/// A valid `env_override` (the contents of `RUST_LOG`) replaces the configured
/// level; an invalid one is ignored.
pub fn build_filter(config: &LogConfig, env_override: Option<&str>) -> EnvFilter {
    env_override
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| {
            let level = LevelFilter::from_level(config.level.to_tracing_level());
            EnvFilter::new(format!("wavelift={}", level))
        })
}

/// Install the global subscriber
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(config, env.as_deref());

    // stdout carries command output
    let stderr = fmt::layer().with_writer(std::io::stderr);
    let stderr_layer = match config.format {
        LogFormat::Pretty => stderr.pretty().boxed(),
        LogFormat::Json => stderr.json().boxed(),
        LogFormat::Compact => stderr.compact().boxed(),
    };

    let file_layer = config.file_path.as_ref().map(|path| {
        let directory = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "wavelift.log".to_string());
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(tracing_appender::rolling::daily(directory, file_name))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    tracing::debug!(level = ?config.level, format = ?config.format, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
    }

    #[test]
    fn test_verbosity_mapping() {
        assert_eq!(LogLevel::from_verbosity(0), LogLevel::Warn);
        assert_eq!(LogLevel::from_verbosity(2), LogLevel::Debug);
        assert_eq!(LogLevel::from_verbosity(9).to_tracing_level(), Level::TRACE);
    }

    #[test]
    fn test_filter_uses_configured_level() {
        let config = LogConfig {
            level: LogLevel::Debug,
            ..LogConfig::default()
        };
        let expected = EnvFilter::new("wavelift=debug").to_string();
        assert_eq!(build_filter(&config, None).to_string(), expected);

        // blank RUST_LOG falls back to the config
        assert_eq!(build_filter(&config, Some("  ")).to_string(), expected);
    }

    #[test]
    fn test_filter_env_override() {
        let config = LogConfig::default();
        let filter = build_filter(&config, Some("wavelift=trace,csv=info"));
        assert_eq!(
            filter.to_string(),
            EnvFilter::new("wavelift=trace,csv=info").to_string()
        );
        assert_ne!(filter.to_string(), build_filter(&config, None).to_string());
    }

    #[test]
    fn test_init_logging_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            level: LogLevel::Info,
            format: LogFormat::Json,
            file_path: Some(dir.path().join("wavelift.log")),
        };

        // the only test in this binary that installs a global subscriber
        init_logging(&config).unwrap();
        tracing::info!("written to the log file");
    }
}
