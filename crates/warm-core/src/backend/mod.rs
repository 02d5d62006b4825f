//! Backend abstraction wrapped by the run-strategy coordinator.
//!
//! Concrete backends implement this trait and are plugged in through the strategy registry.
mod error;
pub use error::BackendError;

mod id;
pub use id::make_run_id;

mod outcome;
pub use outcome::{RunOutcome, WarmUpOutcome};

use std::sync::Arc;

use async_trait::async_trait;

use crate::stream::OutputStream;

/// Shared handle to a backend.
pub type BackendRef = Arc<dyn Backend>;

/// Execution backend driven by the coordinator.
///
/// A backend is responsible for:
/// - the one-time warm-up of the test environment (`warm_up`)
/// - executing a single run with the given arguments and streams (`execute_run`)
/// - cancelling the in-flight run (`cancel_run`) and reporting liveness (`is_running`)
///
/// Every capability defaults to [`BackendError::NotImplemented`]; the coordinator provides no logic of its own for them.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Backend name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Prepare the environment once, before any run.
    async fn warm_up(&self) -> Result<WarmUpOutcome, BackendError> {
        Err(BackendError::not_implemented(self.name(), "warm_up"))
    }

    /// Execute one run.
    async fn execute_run(
        &self,
        _args: &[String],
        _stderr: &OutputStream,
        _stdout: &OutputStream,
    ) -> Result<RunOutcome, BackendError> {
        Err(BackendError::not_implemented(self.name(), "execute_run"))
    }

    /// Stop the in-flight run.
    ///
    /// Must be safe to call when nothing is running.
    async fn cancel_run(&self) -> Result<(), BackendError> {
        Err(BackendError::not_implemented(self.name(), "cancel_run"))
    }

    /// Returns `true` while a run is executing.
    fn is_running(&self) -> Result<bool, BackendError> {
        Err(BackendError::not_implemented(self.name(), "is_running"))
    }

    /// Release whatever the backend holds (live runs, temp state).
    async fn cleanup(&self) -> Result<(), BackendError> {
        Err(BackendError::not_implemented(self.name(), "cleanup"))
    }
}
