use std::{fmt, time::Duration};

/// Result of a finished warm-up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WarmUpOutcome {
    /// Wall time spent warming up.
    pub elapsed: Duration,
    /// Free-form detail reported by the backend (e.g. the preload command).
    pub detail: Option<String>,
}

impl WarmUpOutcome {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            elapsed,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// `elapsed` in whole milliseconds, saturating at `u64::MAX`.
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Result of a single run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    /// Identifier of the run, unique within the process.
    pub run_id: String,
    /// Exit code reported by the run; `None` when it was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Whether the run was stopped by a cancellation request.
    pub canceled: bool,
}

impl RunOutcome {
    pub fn exited(run_id: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self {
            run_id: run_id.into(),
            exit_code,
            canceled: false,
        }
    }

    pub fn canceled(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            exit_code: None,
            canceled: true,
        }
    }

    /// Returns `true` if the run exited with status zero and was not canceled.
    pub fn success(&self) -> bool {
        !self.canceled && self.exit_code == Some(0)
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.canceled, self.exit_code) {
            (true, _) => write!(f, "{}: canceled", self.run_id),
            (false, Some(code)) => write!(f, "{}: exit {code}", self.run_id),
            (false, None) => write!(f, "{}: terminated by signal", self.run_id),
        }
    }
}
