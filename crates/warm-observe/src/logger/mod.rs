mod config;
mod error;
mod init;
mod object;

pub use config::{LOG_ENV, LoggerConfig};
pub use error::{LoggerError, LoggerResult};
pub use object::{LoggerFormat, LoggerLevel, LoggerTimeZone, LoggerTimer, init_local_offset};

/// Install the global tracing subscriber described by `cfg`.
///
/// With `LoggerTimeZone::Local`, call [`init_local_offset`] in `main()` before the
/// Tokio runtime starts any worker threads.
///
/// # Examples
/// ```rust
/// use warm_observe::{LoggerConfig, init_logger};
///
/// let config = LoggerConfig::default();
/// init_logger(&config).unwrap();
/// tracing::info!("logger ready");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LoggerFormat::Text | LoggerFormat::Json => init::stderr_logger(cfg),
        LoggerFormat::Journald => init::journald_logger(cfg),
    }
}
