use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Console log style of a reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact lines for an operator's terminal
    #[default]
    Text,
    /// One JSON object per event, for scheduled runs shipped to a log collector
    Json,
}

/// Directives used when `RUST_LOG` is unset.
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "info,address_etl=debug"
    } else {
        "warn,address_etl=info"
    }
}

pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)))
}

/// Installs the global subscriber. Per-row events carry `line` and `client_id`
/// fields, which the JSON format emits as top-level keys.
pub fn init_logger(format: LogFormat, verbose: bool) {
    let layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(verbose);

    let layer = match format {
        LogFormat::Text => layer.compact().boxed(),
        LogFormat::Json => layer.json().flatten_event(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Monitoring {
        log_format: LogFormat,
    }

    #[test]
    fn test_log_format_from_config_value() {
        let parsed: Monitoring = toml::from_str("log_format = \"json\"").unwrap();
        assert_eq!(parsed.log_format, LogFormat::Json);
        let parsed: Monitoring = toml::from_str("log_format = \"text\"").unwrap();
        assert_eq!(parsed.log_format, LogFormat::Text);
        assert!(toml::from_str::<Monitoring>("log_format = \"xml\"").is_err());
        assert_eq!(LogFormat::default(), LogFormat::Text);
    }

    #[test]
    fn test_verbose_raises_crate_level() {
        assert_eq!(default_directives(false), "warn,address_etl=info");
        assert_eq!(default_directives(true), "info,address_etl=debug");
        assert!(default_directives(true).parse::<EnvFilter>().is_ok());
        assert!(default_directives(false).parse::<EnvFilter>().is_ok());
    }
}
