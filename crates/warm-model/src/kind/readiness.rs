use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Warm-up progress of a coordinator.
///
/// Transitions only move forward: `NotStarted → WarmingUp → Ready`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Readiness {
    /// Preload has never been requested.
    #[default]
    NotStarted,
    /// Warm-up is executing; runs must wait.
    WarmingUp,
    /// Warm-up finished; runs may proceed.
    Ready,
}

impl Readiness {
    /// Returns the readiness as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Readiness::NotStarted => "notStarted",
            Readiness::WarmingUp => "warmingUp",
            Readiness::Ready => "ready",
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        !matches!(self, Readiness::NotStarted)
    }

    /// Returns `true` if moving to `next` keeps the transition monotonic.
    pub fn can_advance_to(&self, next: Readiness) -> bool {
        next > *self
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Readiness {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "notstarted" | "not-started" => Ok(Readiness::NotStarted),
            "warmingup" | "warming-up" => Ok(Readiness::WarmingUp),
            "ready" => Ok(Readiness::Ready),
            other => Err(ModelError::UnknownReadiness(other.to_string())),
        }
    }
}
