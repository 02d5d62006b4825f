use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Named event-bus channel.
///
/// - `Work`     : requests that drive warm-up and runs (`preload`, `run`).
/// - `Interrupt`: cancellation and shutdown (`abort`, `sigint`, `quit`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Channel {
    Work,
    Interrupt,
}

impl Channel {
    /// Returns the channel name as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Work => "work",
            Channel::Interrupt => "interrupt",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(Channel::Work),
            "interrupt" => Ok(Channel::Interrupt),
            other => Err(ModelError::UnknownChannel(other.to_string())),
        }
    }
}
