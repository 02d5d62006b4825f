use std::{fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use warm_model::{StrategySelection, TestFramework};
use warm_observe::LoggerConfig;

/// Server configuration, read from an optional JSON file.
///
/// ```json
/// {
///   "logger":    { "format": "text", "level": "warm_core=debug,info" },
///   "framework": { "name": "rspec", "command": "bundle", "args": ["exec", "rspec"] },
///   "strategy":  { "mode": "registry", "variant": "subprocess" }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    pub logger: LoggerConfig,
    pub framework: TestFramework,
    pub strategy: StrategySelection,
}

impl ServerConfig {
    /// Load from `path`, or use defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.framework.validate()?;
        cfg.strategy.validate()?;
        Ok(cfg)
    }
}
