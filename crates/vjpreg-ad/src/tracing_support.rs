//! Subscriber setup for the registry's diagnostics
//!
//! [`Registry::vjp`] and [`Registry::bind`] each open a `debug` span carrying
//! `op` and `argnum`; inside it the registry logs the slot kind and shapes.
//! Registration is logged at `debug`, overwritten entries at `warn` and
//! construction of the global registry at `info`. With
//! [`TracingConfig::dispatch_timing`] set, the subscriber also reports the
//! duration of every dispatch span when it closes.
//!
//! The subscriber needs the `tracing` feature; without it [`init_tracing`]
//! accepts the config and does nothing.
//!
//! ```ignore
//! use vjpreg_ad::tracing_support::{init_tracing, TracingConfig};
//!
//! // VJPREG_LOG=vjpreg_ad=debug VJPREG_LOG_FORMAT=json VJPREG_LOG_TIMING=1
//! init_tracing(TracingConfig::from_env())?;
//! ```
//!
//! [`Registry::vjp`]: crate::Registry::vjp
//! [`Registry::bind`]: crate::Registry::bind

#[cfg(feature = "tracing")]
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

const DEFAULT_FILTER: &str = "vjpreg_ad=info,warn";

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracingFormat {
    /// Multi-line, human-readable
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
    /// One line per event
    Compact,
}

impl TracingFormat {
    /// Parse a format name, falling back to [`TracingFormat::Pretty`]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => TracingFormat::Json,
            "compact" => TracingFormat::Compact,
            _ => TracingFormat::Pretty,
        }
    }
}

/// Subscriber configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub format: TracingFormat,
    /// `EnvFilter` directive, e.g. `"vjpreg_ad=debug"`
    pub filter: String,
    pub with_ansi: bool,
    /// Include source file and line of each event
    pub with_source: bool,
    /// Report the duration of each `vjp` / `bind` span on close
    pub dispatch_timing: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            format: TracingFormat::default(),
            filter: DEFAULT_FILTER.to_string(),
            with_ansi: true,
            with_source: false,
            dispatch_timing: false,
        }
    }
}

impl TracingConfig {
    /// Build a config from the process environment.
    ///
    /// - `VJPREG_LOG`, then `RUST_LOG`: filter directive
    /// - `VJPREG_LOG_FORMAT`: `pretty`, `json` or `compact`
    /// - `VJPREG_LOG_TIMING`: any value other than `0`/`false` enables dispatch timing
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(filter) = lookup("VJPREG_LOG").or_else(|| lookup("RUST_LOG")) {
            config.filter = filter;
        }
        if let Some(format) = lookup("VJPREG_LOG_FORMAT") {
            config.format = TracingFormat::parse(&format);
        }
        if let Some(timing) = lookup("VJPREG_LOG_TIMING") {
            config.dispatch_timing = !matches!(timing.trim(), "" | "0" | "false");
        }
        config
    }
}

/// Install a global subscriber built from `config`.
///
/// # Errors
///
/// Fails on an invalid filter directive, or when a global subscriber is
/// already set.
#[cfg(feature = "tracing")]
pub fn init_tracing(config: TracingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.filter)?;
    let span_events = if config.dispatch_timing {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = fmt::layer()
        .with_ansi(config.with_ansi)
        .with_file(config.with_source)
        .with_line_number(config.with_source)
        .with_span_events(span_events);
    let layer: Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync> = match config.format
    {
        TracingFormat::Pretty => base.pretty().boxed(),
        TracingFormat::Json => base.json().boxed(),
        TracingFormat::Compact => base.compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()?;
    Ok(())
}

#[cfg(not(feature = "tracing"))]
pub fn init_tracing(_config: TracingConfig) -> anyhow::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_tracing_format_parse() {
        assert_eq!(TracingFormat::parse("json"), TracingFormat::Json);
        assert_eq!(TracingFormat::parse(" Compact "), TracingFormat::Compact);
        assert_eq!(TracingFormat::parse("unknown"), TracingFormat::Pretty);
    }

    #[test]
    fn test_empty_environment_gives_default() {
        assert_eq!(TracingConfig::from_lookup(env(&[])), TracingConfig::default());
    }

    #[test]
    fn test_vjpreg_log_takes_precedence_over_rust_log() {
        let config = TracingConfig::from_lookup(env(&[
            ("RUST_LOG", "warn"),
            ("VJPREG_LOG", "vjpreg_ad=debug"),
        ]));
        assert_eq!(config.filter, "vjpreg_ad=debug");

        let config = TracingConfig::from_lookup(env(&[("RUST_LOG", "warn")]));
        assert_eq!(config.filter, "warn");
    }

    #[test]
    fn test_format_and_timing_from_environment() {
        let config = TracingConfig::from_lookup(env(&[
            ("VJPREG_LOG_FORMAT", "json"),
            ("VJPREG_LOG_TIMING", "1"),
        ]));
        assert_eq!(config.format, TracingFormat::Json);
        assert!(config.dispatch_timing);

        let config = TracingConfig::from_lookup(env(&[("VJPREG_LOG_TIMING", "false")]));
        assert!(!config.dispatch_timing);
    }

    #[cfg(not(feature = "tracing"))]
    #[test]
    fn test_init_without_feature_is_noop() {
        assert!(init_tracing(TracingConfig::default()).is_ok());
        assert!(init_tracing(TracingConfig::default()).is_ok());
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn test_invalid_filter_is_rejected() {
        let config = TracingConfig {
            filter: "vjpreg_ad=notalevel".to_string(),
            ..Default::default()
        };
        assert!(init_tracing(config).is_err());
    }
}
