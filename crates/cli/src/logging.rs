use hotelscout_core::config::{AppConfig, LogFormat};
use hotelscout_core::trace::TraceLevel;
use tracing_subscriber::EnvFilter;

const TRACE_TARGET: &str = "hotelscout_core::trace";

/// Filter directives for the configured log level. Planning trace events are
/// let through at `info` whenever tracing is enabled, whatever the log level.
pub fn filter_directives(config: &AppConfig) -> String {
    let level = config.logging.level.trim().to_ascii_lowercase();
    if config.trace.level == TraceLevel::Silent {
        return level;
    }
    format!("{level},{TRACE_TARGET}=info")
}

/// Installs the global subscriber on stderr. stdout is reserved for command output.
pub fn init(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(filter_directives(config)).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if installed.is_err() {
        tracing::debug!("logging: subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use hotelscout_core::config::AppConfig;
    use hotelscout_core::trace::TraceLevel;

    use super::filter_directives;

    #[test]
    fn trace_events_pass_the_default_warn_level() {
        let config = AppConfig::default();
        assert_eq!(filter_directives(&config), "warn,hotelscout_core::trace=info");
    }

    #[test]
    fn silent_trace_keeps_plain_log_level() {
        let mut config = AppConfig::default();
        config.trace.level = TraceLevel::Silent;
        config.logging.level = "DEBUG".to_string();
        assert_eq!(filter_directives(&config), "debug");
    }
}
