//! Structured logging setup for the `treerouter` binary.
//!
//! A `tracing-subscriber` registry is assembled from an [`EnvFilter`] plus one
//! fmt layer, JSON or human readable. `RUST_LOG` wins over the configured level
//! when it is present. Output always goes to stderr so that command results on
//! stdout stay machine readable.
//!
//! | Variable                           | Default |
//! |------------------------------------|---------|
//! | `TREEROUTER_LOG_LEVEL`             | `info`  |
//! | `TREEROUTER_LOG_FORMAT`            | `json`  |
//! | `TREEROUTER_LOG_TARGET_FILTER`     | unset   |
//! | `TREEROUTER_LOG_INCLUDE_LOCATION`  | `false` |

use anyhow::{anyhow, Context};
use std::env;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LEVEL_ENV: &str = "TREEROUTER_LOG_LEVEL";
const FORMAT_ENV: &str = "TREEROUTER_LOG_FORMAT";
const TARGET_FILTER_ENV: &str = "TREEROUTER_LOG_TARGET_FILTER";
const LOCATION_ENV: &str = "TREEROUTER_LOG_INCLUDE_LOCATION";

/// Output encoding of log events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    /// Unknown names select JSON.
    pub fn parse(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("pretty") {
            LogFormat::Pretty
        } else {
            LogFormat::Json
        }
    }
}

/// Settings consumed by [`init_logging_with_config`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_level: String,
    pub format: LogFormat,
    /// Comma separated directives appended to the filter, e.g.
    /// `treerouter::router=trace,treerouter::hot_reload=debug`.
    pub target_filter: Option<String>,
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::default(),
            target_filter: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Reads the `TREEROUTER_LOG_*` variables, keeping defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: env::var(LEVEL_ENV).unwrap_or(defaults.log_level),
            format: env::var(FORMAT_ENV)
                .map(|name| LogFormat::parse(&name))
                .unwrap_or(defaults.format),
            target_filter: env::var(TARGET_FILTER_ENV).ok(),
            include_location: env::var(LOCATION_ENV)
                .map(|flag| matches!(flag.trim(), "1" | "true" | "TRUE" | "yes"))
                .unwrap_or(defaults.include_location),
        }
    }

    /// Verbose, human readable settings for local debugging.
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
            include_location: true,
        }
    }

    fn level(&self) -> Level {
        self.log_level.trim().parse().unwrap_or(Level::INFO)
    }

    fn directives(&self) -> anyhow::Result<Vec<Directive>> {
        let Some(raw) = self.target_filter.as_deref() else {
            return Ok(Vec::new());
        };
        raw.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<Directive>()
                    .map_err(|e| anyhow!("invalid log filter directive {part:?}: {e}"))
            })
            .collect()
    }

    fn env_filter(&self) -> anyhow::Result<EnvFilter> {
        let base = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));
        Ok(self
            .directives()?
            .into_iter()
            .fold(base, EnvFilter::add_directive))
    }
}

/// Installs the global subscriber using [`LogConfig::from_env`].
pub fn init_logging() -> anyhow::Result<()> {
    init_logging_with_config(&LogConfig::from_env())
}

/// Installs the global subscriber.
///
/// Fails on a malformed target filter or when a subscriber is already set.
pub fn init_logging_with_config(config: &LogConfig) -> anyhow::Result<()> {
    let filter = config.env_filter()?;
    let location = config.include_location;

    let layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_file(location)
            .with_line_number(location)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_file(location)
            .with_line_number(location)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .context("a global tracing subscriber is already installed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_format_names_fall_back_to_json() {
        assert_eq!(LogFormat::parse(" Pretty "), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("logfmt"), LogFormat::Json);
    }

    #[test]
    fn level_parsing_is_lenient() {
        let mut config = LogConfig::default();
        assert_eq!(config.level(), Level::INFO);
        config.log_level = "WARN".to_string();
        assert_eq!(config.level(), Level::WARN);
        config.log_level = "chatty".to_string();
        assert_eq!(config.level(), Level::INFO);
    }

    #[test]
    fn target_filter_is_split_into_directives() {
        let config = LogConfig {
            target_filter: Some("treerouter::router=trace, ,treerouter=debug".to_string()),
            ..LogConfig::default_dev()
        };
        assert_eq!(config.directives().unwrap().len(), 2);
    }

    #[test]
    fn malformed_directive_is_rejected() {
        let config = LogConfig {
            target_filter: Some("treerouter=loud".to_string()),
            ..LogConfig::default()
        };
        let err = config.directives().unwrap_err();
        assert!(err.to_string().contains("treerouter=loud"));
    }
}
