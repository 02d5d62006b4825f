use tracing::Subscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::logger::{
    config::LoggerConfig,
    error::{LoggerError, LoggerResult},
    object::{LoggerFormat, LoggerTimer},
};

/// Identifier attached to every journald entry.
pub(crate) const SYSLOG_IDENTIFIER: &str = "warm-server";

/// Text or JSON logs on stderr, depending on `cfg.format`.
///
/// Run output owns stdout, so log lines never go there.
pub(crate) fn stderr_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    let registry = tracing_subscriber::registry().with(cfg.level.to_env_filter()?);
    let lines = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(cfg.with_targets)
        .with_timer(LoggerTimer::new(cfg.tz));

    match cfg.format {
        LoggerFormat::Json => init_subscriber(registry.with(lines.json().with_ansi(false))),
        _ => init_subscriber(registry.with(lines.with_ansi(cfg.should_use_color()))),
    }
}

#[cfg(target_os = "linux")]
pub(crate) fn journald_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    let journald = tracing_journald::layer()
        .map_err(|e| LoggerError::JournaldInitFailed(e.to_string()))?
        .with_syslog_identifier(SYSLOG_IDENTIFIER.to_string());

    init_subscriber(
        tracing_subscriber::registry()
            .with(cfg.level.to_env_filter()?)
            .with(journald),
    )
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn journald_logger(_cfg: &LoggerConfig) -> LoggerResult<()> {
    Err(LoggerError::JournaldNotSupported)
}

fn init_subscriber<S>(subscriber: S) -> LoggerResult<()>
where
    S: Subscriber + Send + Sync + 'static,
{
    subscriber
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_first_subscriber_is_installed() {
        let text = LoggerConfig {
            use_color: false,
            ..Default::default()
        };
        let json = LoggerConfig {
            format: LoggerFormat::Json,
            ..text.clone()
        };

        // Whichever test in this binary runs first may already own the global slot.
        let _ = stderr_logger(&text);

        assert!(matches!(stderr_logger(&json), Err(LoggerError::AlreadyInitialized)));
        assert!(matches!(stderr_logger(&text), Err(LoggerError::AlreadyInitialized)));
    }

    #[test]
    #[cfg(not(target_os = "linux"))]
    fn journald_is_unsupported_off_linux() {
        let result = journald_logger(&LoggerConfig::default());
        assert!(matches!(result, Err(LoggerError::JournaldNotSupported)));
    }
}
