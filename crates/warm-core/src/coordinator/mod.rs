//! Run-strategy coordinator.
//!
//! Owns the readiness state machine of one backend and wires it to the event bus.
//!
//! ```text
//!   preload() ──► NotStarted ─claim─► WarmingUp ──warm_up()──► Ready
//!                     │                   │                      │
//!   run()  ──► PreloadNotInvoked      wait for Ready ───────► execute_run()
//!
//!   SIGINT ──► forwarder task ──► interrupt/sigint ──► abort_or_quit_server()
//!                                                        ├─ running: cancel_run + prompt
//!                                                        └─ idle:    interrupt/quit
//! ```
mod observers;

mod signal;
pub use signal::forward_interrupts;

use std::{backtrace::Backtrace, sync::Arc};

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, error, info, instrument, trace};
use warm_model::{Channel, EVENT_QUIT, Readiness, StrategySelection, TestFramework};

use crate::{
    backend::{BackendRef, RunOutcome, WarmUpOutcome},
    bus::{EventBus, Payload},
    error::CoreError,
    registry::StrategyRegistry,
    stream::OutputStream,
};

/// Prompt written to the error stream after an interrupt stopped a run.
pub const ABORT_PROMPT: &str = "Running tests stopped.  Press CTRL-C again to quit.";

/// Coordinates warm-up, gated runs and cancellation for one backend.
pub struct RunStrategy {
    variant: &'static str,
    framework: TestFramework,
    backend: BackendRef,
    readiness: watch::Sender<Readiness>,
    bus: EventBus,
    stdout: OutputStream,
    stderr: OutputStream,
}

impl RunStrategy {
    /// Wrap an already constructed backend.
    ///
    /// Fatal warm-up reports go to process stdout and operator prompts to process stderr
    /// unless replaced with [`RunStrategy::with_stdout`] / [`RunStrategy::with_stderr`].
    pub fn new(
        variant: &'static str,
        framework: TestFramework,
        backend: BackendRef,
        bus: EventBus,
    ) -> Self {
        let (readiness, _) = watch::channel(Readiness::NotStarted);
        Self {
            variant,
            framework,
            backend,
            readiness,
            bus,
            stdout: OutputStream::stdout(),
            stderr: OutputStream::stderr(),
        }
    }

    pub fn with_stdout(mut self, stdout: OutputStream) -> Self {
        self.stdout = stdout;
        self
    }

    pub fn with_stderr(mut self, stderr: OutputStream) -> Self {
        self.stderr = stderr;
        self
    }

    /// Construct a coordinator from the process-wide registry.
    pub fn factory(
        framework: TestFramework,
        selection: &StrategySelection,
        bus: EventBus,
    ) -> Result<Arc<Self>, CoreError> {
        Self::factory_in(StrategyRegistry::global(), framework, selection, bus)
    }

    /// Construct a coordinator from `registry`.
    ///
    /// `StrategySelection::Fixed` always resolves to the built-in default variant;
    /// `StrategySelection::Registry` resolves the configured name.
    #[instrument(level = "debug", skip_all, fields(variant = selection.variant(), framework = %framework.name))]
    pub fn factory_in(
        registry: &StrategyRegistry,
        framework: TestFramework,
        selection: &StrategySelection,
        bus: EventBus,
    ) -> Result<Arc<Self>, CoreError> {
        framework.validate()?;
        selection.validate()?;

        let variant = registry.get(selection.variant()).ok_or_else(|| {
            CoreError::UnknownVariant(selection.variant().to_string())
        })?;
        let backend = variant.build(&framework)?;

        debug!(backend = backend.name(), "strategy constructed");
        Ok(Arc::new(Self::new(variant.name(), framework, backend, bus)))
    }

    pub fn variant(&self) -> &'static str {
        self.variant
    }

    pub fn framework(&self) -> &TestFramework {
        &self.framework
    }

    pub fn backend(&self) -> &BackendRef {
        &self.backend
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Current readiness.
    pub fn readiness(&self) -> Readiness {
        *self.readiness.borrow()
    }

    /// Receiver that observes every readiness transition.
    pub fn subscribe_readiness(&self) -> watch::Receiver<Readiness> {
        self.readiness.subscribe()
    }

    /// Warm the backend up, once.
    ///
    /// Returns `Ok(None)` when warm-up was already claimed by an earlier call.
    /// The claim is atomic, so concurrent callers never start a second warm-up.
    /// A failed warm-up leaves readiness at `WarmingUp`.
    #[instrument(level = "debug", skip(self), fields(variant = self.variant))]
    pub async fn preload(&self) -> Result<Option<WarmUpOutcome>, CoreError> {
        let claimed = self.readiness.send_if_modified(|state| {
            if state.can_advance_to(Readiness::WarmingUp) {
                *state = Readiness::WarmingUp;
                true
            } else {
                false
            }
        });
        if !claimed {
            trace!(readiness = %self.readiness(), "preload already started");
            return Ok(None);
        }

        info!("warm-up started");
        let outcome = self.backend.warm_up().await?;
        self.readiness.send_replace(Readiness::Ready);

        info!(
            elapsed_ms = outcome.elapsed_ms(),
            detail = outcome.detail.as_deref().unwrap_or(""),
            "warm-up finished; accepting runs"
        );
        Ok(Some(outcome))
    }

    /// Execute one run once warm-up has finished.
    ///
    /// Fails with [`CoreError::PreloadNotInvoked`] if `preload` was never called;
    /// otherwise waits for `Ready` without a timeout.
    #[instrument(level = "debug", skip(self, stderr, stdout), fields(variant = self.variant))]
    pub async fn run(
        &self,
        args: &[String],
        stderr: &OutputStream,
        stdout: &OutputStream,
    ) -> Result<RunOutcome, CoreError> {
        let mut rx = self.readiness.subscribe();
        let started = rx.borrow_and_update().is_started();
        if !started {
            return Err(CoreError::PreloadNotInvoked);
        }

        if !self.readiness().is_ready() {
            debug!("run waiting for warm-up to finish");
        }
        rx.wait_for(Readiness::is_ready)
            .await
            .map_err(|_| CoreError::Internal("readiness channel closed".into()))?;

        let outcome = self.backend.execute_run(args, stderr, stdout).await?;
        info!(run = %outcome.run_id, exit_code = ?outcome.exit_code, canceled = outcome.canceled, "run finished");
        Ok(outcome)
    }

    /// Run `preload` on a separate task.
    ///
    /// A warm-up failure is unrecoverable: the error message, its kind and a backtrace
    /// are written to stdout and the process exits with status 1.
    pub fn preload_in_background(self: &Arc<Self>) -> JoinHandle<()> {
        let me = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = me.preload().await {
                me.report_fatal(&e);
                std::process::exit(1);
            }
        })
    }

    /// Cancel the in-flight run, if any.
    ///
    /// Returns `true` when the backend reported a live run and cancellation was requested.
    #[instrument(level = "debug", skip(self), fields(variant = self.variant))]
    pub async fn abort(&self) -> Result<bool, CoreError> {
        if !self.backend.is_running()? {
            trace!("abort requested while idle");
            return Ok(false);
        }
        self.backend.cancel_run().await?;
        info!("in-flight run canceled");
        Ok(true)
    }

    /// Two-stage interrupt: cancel a live run, otherwise ask the server to quit.
    #[instrument(level = "debug", skip(self), fields(variant = self.variant))]
    pub async fn abort_or_quit_server(&self) -> Result<(), CoreError> {
        if self.backend.is_running()? {
            self.abort().await?;
            self.stderr.write_line(ABORT_PROMPT)?;
            self.stderr.flush()?;
        } else {
            info!("interrupt while idle; requesting quit");
            self.bus
                .trigger(Channel::Interrupt, EVENT_QUIT, Payload::Empty)
                .await?;
        }
        Ok(())
    }

    /// Release backend resources.
    pub async fn cleanup(&self) -> Result<(), CoreError> {
        self.backend.cleanup().await?;
        Ok(())
    }

    fn report_fatal(&self, e: &CoreError) {
        error!(error = %e, label = e.as_label(), "background warm-up failed; terminating");

        let trace = Backtrace::force_capture();
        let _ = self.stdout.write_line(&format!("{e} ({})", e.as_label()));
        let _ = self.stdout.write_line(&trace.to_string());
        let _ = self.stdout.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Mutex, time::Duration};

    use warm_model::{EVENT_ABORT, EVENT_PRELOAD, EVENT_RUN, EVENT_SIGINT};

    use crate::{
        backend::{BackendError, BackendRef},
        bus::ObserverFn,
        registry::StrategyVariant,
        testing::StubBackend,
    };

    fn strategy(backend: Arc<StubBackend>) -> (Arc<RunStrategy>, crate::stream::Captured) {
        let (stderr, captured) = OutputStream::capture("stderr");
        let s = RunStrategy::new(
            "stub",
            TestFramework::default(),
            backend,
            EventBus::new(),
        )
        .with_stderr(stderr);
        (Arc::new(s), captured)
    }

    fn streams() -> (OutputStream, OutputStream) {
        (
            OutputStream::capture("stderr").0,
            OutputStream::capture("stdout").0,
        )
    }

    fn quit_counter(bus: &EventBus) -> Arc<Mutex<usize>> {
        let quits = Arc::new(Mutex::new(0));
        let q = Arc::clone(&quits);
        bus.observe(
            Channel::Interrupt,
            EVENT_QUIT,
            ObserverFn::arc("quit-counter", move |_p: Payload| {
                let q = Arc::clone(&q);
                async move {
                    *q.lock().unwrap() += 1;
                    Ok::<(), CoreError>(())
                }
            }),
        );
        quits
    }

    #[tokio::test]
    async fn preload_moves_to_ready_and_is_idempotent() {
        let backend = Arc::new(StubBackend::new());
        let (s, _) = strategy(Arc::clone(&backend));

        assert_eq!(s.readiness(), Readiness::NotStarted);
        assert!(s.preload().await.unwrap().is_some());
        assert_eq!(s.readiness(), Readiness::Ready);

        assert!(s.preload().await.unwrap().is_none());
        assert_eq!(backend.warm_up_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_preloads_warm_up_exactly_once() {
        let (backend, gate) = StubBackend::gated();
        let backend = Arc::new(backend);
        let (s, _) = strategy(Arc::clone(&backend));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let s = Arc::clone(&s);
                tokio::spawn(async move { s.preload().await })
            })
            .collect();

        // Let every task reach the claim before releasing warm-up.
        tokio::time::sleep(Duration::from_millis(50)).await;
        gate.notify_one();

        let mut performed = 0;
        for h in handles {
            if h.await.unwrap().unwrap().is_some() {
                performed += 1;
            }
        }

        assert_eq!(performed, 1);
        assert_eq!(backend.warm_up_count(), 1);
        assert_eq!(s.readiness(), Readiness::Ready);
    }

    #[tokio::test]
    async fn run_before_preload_is_a_contract_violation() {
        let backend = Arc::new(StubBackend::new());
        let (s, _) = strategy(Arc::clone(&backend));
        let (err, out) = streams();

        let res = s.run(&["-v".to_string()], &err, &out).await;

        assert!(matches!(res, Err(CoreError::PreloadNotInvoked)));
        assert!(backend.run_calls().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn run_waits_for_warm_up_to_finish() {
        let (backend, gate) = StubBackend::gated();
        let backend = Arc::new(backend);
        let (s, _) = strategy(Arc::clone(&backend));

        let preload = {
            let s = Arc::clone(&s);
            tokio::spawn(async move { s.preload().await })
        };
        let mut rx = s.subscribe_readiness();
        rx.wait_for(|r| *r == Readiness::WarmingUp).await.unwrap();

        let run = {
            let s = Arc::clone(&s);
            tokio::spawn(async move {
                let (err, out) = streams();
                s.run(&["-v".to_string()], &err, &out).await
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!run.is_finished(), "run must not proceed while warming up");
        assert!(backend.run_calls().is_empty());

        gate.notify_one();
        preload.await.unwrap().unwrap();
        let outcome = run.await.unwrap().unwrap();

        assert!(outcome.success());
        assert_eq!(backend.run_calls(), vec![vec!["-v".to_string()]]);
        assert!(!backend.overlapped());
    }

    #[tokio::test]
    async fn background_preload_then_run_executes_once() {
        let backend = Arc::new(StubBackend::new());
        let (s, _) = strategy(Arc::clone(&backend));
        let (err, out) = streams();

        s.preload_in_background().await.unwrap();
        s.run(&["-v".to_string()], &err, &out).await.unwrap();

        assert_eq!(backend.run_calls(), vec![vec!["-v".to_string()]]);
    }

    #[tokio::test]
    async fn failed_warm_up_propagates_and_keeps_gate_closed() {
        let backend = Arc::new(StubBackend::failing("boom"));
        let (s, _) = strategy(Arc::clone(&backend));

        let err = s.preload().await.unwrap_err();

        assert!(err.to_string().contains("boom"));
        assert_eq!(err.as_label(), "warm_up_failed");
        assert_eq!(s.readiness(), Readiness::WarmingUp);
    }

    #[tokio::test]
    async fn abort_cancels_only_when_running() {
        let backend = Arc::new(StubBackend::new());
        let (s, _) = strategy(Arc::clone(&backend));

        assert!(!s.abort().await.unwrap());
        assert_eq!(backend.cancel_count(), 0);

        backend.set_running(true);
        assert!(s.abort().await.unwrap());
        assert_eq!(backend.cancel_count(), 1);
    }

    #[tokio::test]
    async fn sigint_while_running_cancels_and_prompts() {
        let backend = Arc::new(StubBackend::new());
        let (s, prompt) = strategy(Arc::clone(&backend));
        s.register_observers();
        let quits = quit_counter(s.bus());

        backend.set_running(true);
        s.bus()
            .trigger(Channel::Interrupt, EVENT_SIGINT, Payload::Empty)
            .await
            .unwrap();

        assert_eq!(backend.cancel_count(), 1);
        assert_eq!(*quits.lock().unwrap(), 0);
        assert_eq!(prompt.contents(), format!("{ABORT_PROMPT}\n"));
    }

    #[tokio::test]
    async fn sigint_while_idle_requests_quit() {
        let backend = Arc::new(StubBackend::new());
        let (s, prompt) = strategy(Arc::clone(&backend));
        s.register_observers();
        let quits = quit_counter(s.bus());

        s.bus()
            .trigger(Channel::Interrupt, EVENT_SIGINT, Payload::Empty)
            .await
            .unwrap();

        assert_eq!(backend.cancel_count(), 0);
        assert_eq!(*quits.lock().unwrap(), 1);
        assert!(prompt.is_empty());
    }

    #[tokio::test]
    async fn work_events_drive_preload_and_run() {
        let backend = Arc::new(StubBackend::new());
        let (s, _) = strategy(Arc::clone(&backend));
        s.register_observers();
        let bus = s.bus().clone();

        bus.trigger(Channel::Work, EVENT_PRELOAD, Payload::Empty)
            .await
            .unwrap();
        assert_eq!(s.readiness(), Readiness::Ready);

        let (err, _) = OutputStream::capture("stderr");
        let (out, printed) = OutputStream::capture("stdout");
        bus.trigger(
            Channel::Work,
            EVENT_RUN,
            Payload::run(vec!["spec/a_spec.rb".into()], err, out),
        )
        .await
        .unwrap();

        assert_eq!(backend.run_calls(), vec![vec!["spec/a_spec.rb".to_string()]]);
        assert_eq!(printed.contents(), "ran spec/a_spec.rb\n");
    }

    #[tokio::test]
    async fn run_event_errors_reach_the_trigger_caller() {
        let backend = Arc::new(StubBackend::new());
        let (s, _) = strategy(Arc::clone(&backend));
        s.register_observers();

        let (err, out) = streams();
        let res = s
            .bus()
            .trigger(Channel::Work, EVENT_RUN, Payload::run(Vec::new(), err, out))
            .await;
        assert!(matches!(res, Err(CoreError::PreloadNotInvoked)));

        let res = s
            .bus()
            .trigger(Channel::Work, EVENT_RUN, Payload::Empty)
            .await;
        assert!(matches!(res, Err(CoreError::InvalidPayload { .. })));
    }

    #[tokio::test]
    async fn abort_event_uses_liveness() {
        let backend = Arc::new(StubBackend::new());
        let (s, _) = strategy(Arc::clone(&backend));
        s.register_observers();

        s.bus()
            .trigger(Channel::Interrupt, EVENT_ABORT, Payload::Empty)
            .await
            .unwrap();
        assert_eq!(backend.cancel_count(), 0);

        backend.set_running(true);
        s.bus()
            .trigger(Channel::Interrupt, EVENT_ABORT, Payload::Empty)
            .await
            .unwrap();
        assert_eq!(backend.cancel_count(), 1);
    }

    fn build_stub(_fw: &TestFramework) -> Result<BackendRef, BackendError> {
        Ok(Arc::new(StubBackend::new()))
    }

    #[test]
    fn factory_resolves_selection_through_registry() {
        let registry = StrategyRegistry::new();
        registry
            .register(StrategyVariant::new("stub", build_stub))
            .unwrap();

        let s = RunStrategy::factory_in(
            &registry,
            TestFramework::default(),
            &StrategySelection::registry("stub"),
            EventBus::new(),
        )
        .unwrap();
        assert_eq!(s.variant(), "stub");
        assert_eq!(s.backend().name(), "stub");

        // Fixed selection needs the built-in variant, which this registry lacks.
        let res = RunStrategy::factory_in(
            &registry,
            TestFramework::default(),
            &StrategySelection::Fixed,
            EventBus::new(),
        );
        assert!(matches!(res, Err(CoreError::UnknownVariant(name)) if name == "subprocess"));
    }

    #[test]
    fn factory_rejects_invalid_framework() {
        let registry = StrategyRegistry::new();
        registry
            .register(StrategyVariant::new("stub", build_stub))
            .unwrap();

        let res = RunStrategy::factory_in(
            &registry,
            TestFramework::new("broken", ""),
            &StrategySelection::registry("stub"),
            EventBus::new(),
        );
        assert!(matches!(res, Err(CoreError::Model(_))));
    }
}
