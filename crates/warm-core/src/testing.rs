//! Recording backend shared by unit tests.
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::{
    backend::{Backend, BackendError, RunOutcome, WarmUpOutcome},
    stream::OutputStream,
};

#[derive(Default)]
pub(crate) struct StubBackend {
    warm_ups: AtomicUsize,
    runs: Mutex<Vec<Vec<String>>>,
    cancels: AtomicUsize,
    running: AtomicBool,
    warming: AtomicBool,
    overlapped: AtomicBool,
    gate: Option<Arc<Notify>>,
    warm_up_error: Option<String>,
}

impl StubBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Warm-up blocks until the returned `Notify` is signalled.
    pub(crate) fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let backend = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (backend, gate)
    }

    pub(crate) fn failing(reason: &str) -> Self {
        Self {
            warm_up_error: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub(crate) fn warm_up_count(&self) -> usize {
        self.warm_ups.load(Ordering::SeqCst)
    }

    pub(crate) fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    pub(crate) fn run_calls(&self) -> Vec<Vec<String>> {
        self.runs.lock().unwrap().clone()
    }

    /// `true` if a run ever started while warm-up was executing.
    pub(crate) fn overlapped(&self) -> bool {
        self.overlapped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn warm_up(&self) -> Result<WarmUpOutcome, BackendError> {
        self.warming.store(true, Ordering::SeqCst);
        self.warm_ups.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        } else {
            tokio::task::yield_now().await;
        }

        self.warming.store(false, Ordering::SeqCst);
        match &self.warm_up_error {
            Some(reason) => Err(BackendError::WarmUp(reason.clone())),
            None => Ok(WarmUpOutcome::default()),
        }
    }

    async fn execute_run(
        &self,
        args: &[String],
        _stderr: &OutputStream,
        stdout: &OutputStream,
    ) -> Result<RunOutcome, BackendError> {
        if self.warming.load(Ordering::SeqCst) {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        self.runs.lock().unwrap().push(args.to_vec());
        stdout.write_line(&format!("ran {}", args.join(" ")))?;
        Ok(RunOutcome::exited("stub-run", Some(0)))
    }

    async fn cancel_run(&self) -> Result<(), BackendError> {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_running(&self) -> Result<bool, BackendError> {
        Ok(self.running.load(Ordering::SeqCst))
    }

    async fn cleanup(&self) -> Result<(), BackendError> {
        Ok(())
    }
}
