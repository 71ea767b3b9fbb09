//! Structured logging initialisation.
//!
//! Everything in the crate logs through `tracing` macros with structured
//! fields; this module installs the subscriber that renders them. Output goes
//! to stderr so command output on stdout stays machine readable.
//!
//! ## Environment Variables
//!
//! | variable | meaning | default |
//! |---|---|---|
//! | `SWITCHYARD_LOG_LEVEL` | `trace`/`debug`/`info`/`warn`/`error` | `info` |
//! | `SWITCHYARD_LOG_FORMAT` | `json` or `pretty` | `pretty` |
//! | `SWITCHYARD_LOG_TARGET_FILTER` | extra comma separated filter directives | unset |
//! | `RUST_LOG` | overrides the level filter entirely | unset |

use std::env;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{warn, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for aggregation, pretty-print for terminals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    /// Log format: json/pretty
    pub format: LogFormat,
    /// Extra filter directives (comma-separated)
    pub target_filter: Option<String>,
    /// Include file:line location
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Defaults overridden by the `SWITCHYARD_LOG_*` variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Override fields whose environment variable is set
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_vars(|key| env::var(key).ok())
    }

    pub(crate) fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(level) = var("SWITCHYARD_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(format) = var("SWITCHYARD_LOG_FORMAT") {
            self.format = LogFormat::parse(&format);
        }
        if let Some(filter) = var("SWITCHYARD_LOG_TARGET_FILTER") {
            self.target_filter = Some(filter);
        }
        if let Some(location) = var("SWITCHYARD_LOG_INCLUDE_LOCATION").and_then(|s| s.parse().ok()) {
            self.include_location = location;
        }
        self
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over `config.log_level` when set.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
///
/// # Example
///
/// ```no_run
/// use switchyard::logging::{init_logging, LogConfig};
///
/// init_logging(&LogConfig::from_env()).expect("Failed to initialize logging");
/// ```
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level().as_str()));
    let (env_filter, rejected) = match &config.target_filter {
        Some(target_filter) => add_target_directives(env_filter, target_filter),
        None => (env_filter, Vec::new()),
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    for directive in rejected {
        warn!(directive = %directive, "Ignoring invalid log filter directive");
    }

    Ok(())
}

/// Add comma separated directives to `filter`, returning the ones that did
/// not parse.
fn add_target_directives(mut filter: EnvFilter, directives: &str) -> (EnvFilter, Vec<String>) {
    let mut rejected = Vec::new();
    for directive in directives.split(',').map(str::trim).filter(|d| !d.is_empty()) {
        match directive.parse() {
            Ok(parsed) => filter = filter.add_directive(parsed),
            Err(_) => rejected.push(directive.to_string()),
        }
    }
    (filter, rejected)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("other"), LogFormat::Pretty);
    }

    #[test]
    fn test_apply_vars_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SWITCHYARD_LOG_LEVEL", "debug"),
            ("SWITCHYARD_LOG_FORMAT", "json"),
            ("SWITCHYARD_LOG_INCLUDE_LOCATION", "true"),
        ]
        .into_iter()
        .collect();
        let config = LogConfig::default().apply_vars(|k| vars.get(k).map(|v| (*v).to_string()));

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.include_location);
        assert_eq!(config.target_filter, None);
    }

    #[test]
    fn test_invalid_target_directives_are_returned() {
        let (_, rejected) = add_target_directives(
            EnvFilter::new("info"),
            "switchyard::router=debug, switchyard=bogus ,,roxmltree=warn",
        );
        assert_eq!(rejected, ["switchyard=bogus"]);
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let config = LogConfig {
            log_level: "loud".to_string(),
            ..LogConfig::default()
        };
        assert_eq!(config.level(), Level::INFO);
    }
}
