use std::sync::Once;

use env_logger::fmt::TimestampPrecision;
use log::LevelFilter;

/// Logger configuration for hosts.
///
/// `filter` uses the `env_logger` directive syntax, e.g.
/// `"lunas_engine=debug,winit=warn"`. Per-tick logging is emitted at `trace`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directives that override `RUST_LOG` when set.
    pub filter: Option<String>,

    /// Level used when neither `filter` nor `RUST_LOG` is set.
    pub fallback_level: LevelFilter,

    /// Millisecond timestamps help line up frame logs; off for terse output.
    pub timestamps: bool,

    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            fallback_level: LevelFilter::Info,
            timestamps: true,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum FilterSource {
    Directives(String),
    Level(LevelFilter),
}

/// Explicit directives, then `RUST_LOG`, then the fallback level. Blank
/// strings count as unset.
fn select_filter(config: &LoggingConfig, rust_log: Option<String>) -> FilterSource {
    let non_blank = |directives: &String| !directives.trim().is_empty();
    config
        .filter
        .clone()
        .filter(non_blank)
        .or_else(|| rust_log.filter(non_blank))
        .map_or(FilterSource::Level(config.fallback_level), FilterSource::Directives)
}

fn builder_for(config: &LoggingConfig) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();

    match select_filter(config, std::env::var("RUST_LOG").ok()) {
        FilterSource::Directives(directives) => builder.parse_filters(&directives),
        FilterSource::Level(level) => builder.filter_level(level),
    };

    let precision = config.timestamps.then_some(TimestampPrecision::Millis);
    builder
        .format_timestamp(precision)
        .write_style(config.write_style);

    builder
}

static INSTALLED: Once = Once::new();

/// Installs the `env_logger` backend for the `log` facade.
///
/// Only the first call has any effect. If a logger is already installed (a test
/// harness, an embedding host) it is left in place.
pub fn init_logging(config: LoggingConfig) {
    INSTALLED.call_once(|| match builder_for(&config).try_init() {
        Ok(()) => log::debug!("env_logger installed"),
        Err(_) => log::debug!("logger already installed; keeping it"),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_beats_rust_log() {
        let config = LoggingConfig::with_filter("lunas_engine=trace");
        assert_eq!(
            select_filter(&config, Some("warn".into())),
            FilterSource::Directives("lunas_engine=trace".into())
        );
    }

    #[test]
    fn rust_log_is_used_without_explicit_filter() {
        let config = LoggingConfig::default();
        assert_eq!(
            select_filter(&config, Some("winit=warn".into())),
            FilterSource::Directives("winit=warn".into())
        );
    }

    #[test]
    fn blank_directives_fall_back_to_level() {
        let config = LoggingConfig {
            filter: Some("  ".into()),
            fallback_level: LevelFilter::Warn,
            ..LoggingConfig::default()
        };
        assert_eq!(select_filter(&config, None), FilterSource::Level(LevelFilter::Warn));
        assert_eq!(
            select_filter(&config, Some("debug".into())),
            FilterSource::Directives("debug".into())
        );
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(LoggingConfig::with_filter("lunas_engine=debug"));
        init_logging(LoggingConfig::default());
    }
}
