use serde::{Deserialize, Serialize};
use std::io::IsTerminal;

use crate::logger::{
    error::LoggerResult,
    object::{LoggerFormat, LoggerLevel, LoggerTimeZone},
};

/// Environment variable that overrides the configured filter expression.
pub const LOG_ENV: &str = "WARM_LOG";

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// Filter expression (e.g. `"info"`, `"warm_core=debug,info"`).
    pub level: LoggerLevel,
    /// Timezone of text/JSON timestamps.
    pub tz: LoggerTimeZone,
    /// Include module/target names in log lines.
    pub with_targets: bool,
    /// Colored text output; applied only when stderr is a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Whether ANSI colors should be emitted right now.
    ///
    /// Call during logger initialization, not while parsing configuration,
    /// so terminal detection reflects the running process.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stderr().is_terminal()
    }

    /// Replace `level` with the value of [`LOG_ENV`], if set and non-empty.
    pub fn apply_env(&mut self) -> LoggerResult<()> {
        match std::env::var(LOG_ENV) {
            Ok(filter) if !filter.trim().is_empty() => self.apply_filter(&filter),
            _ => Ok(()),
        }
    }

    fn apply_filter(&mut self, filter: &str) -> LoggerResult<()> {
        self.level = filter.parse()?;
        Ok(())
    }
}
