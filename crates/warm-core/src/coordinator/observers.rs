use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Weak},
};

use tokio::task::JoinHandle;
use tracing::{debug, trace};
use warm_model::{Channel, EVENT_ABORT, EVENT_PRELOAD, EVENT_RUN, EVENT_SIGINT};

use super::{RunStrategy, forward_interrupts};
use crate::{
    bus::{ObserverFn, Payload},
    error::CoreError,
};

impl RunStrategy {
    /// Subscribe this strategy to its bus and start forwarding SIGINT.
    ///
    /// | channel     | event     | handler                  |
    /// |-------------|-----------|--------------------------|
    /// | `work`      | `preload` | [`RunStrategy::preload`] |
    /// | `work`      | `run`     | [`RunStrategy::run`]     |
    /// | `interrupt` | `abort`   | [`RunStrategy::abort`]   |
    /// | `interrupt` | `sigint`  | [`RunStrategy::abort_or_quit_server`] |
    ///
    /// Must be called from within a Tokio runtime. The returned handle belongs to the
    /// signal forwarder task.
    pub fn setup_observers(self: &Arc<Self>) -> Result<JoinHandle<()>, CoreError> {
        self.register_observers();
        let forwarder = forward_interrupts(self.bus.clone())?;
        debug!(variant = self.variant, "observers registered; forwarding SIGINT");
        Ok(forwarder)
    }

    /// Subscribe the four handlers without touching OS signals.
    ///
    /// Handlers hold a weak reference; once the strategy is dropped they turn into no-ops.
    pub fn register_observers(self: &Arc<Self>) {
        let bus = &self.bus;

        bus.observe(
            Channel::Work,
            EVENT_PRELOAD,
            ObserverFn::arc(
                "strategy.preload",
                with_strategy(self, |s, _| async move {
                    s.preload().await?;
                    Ok::<(), CoreError>(())
                }),
            ),
        );

        bus.observe(
            Channel::Work,
            EVENT_RUN,
            ObserverFn::arc(
                "strategy.run",
                with_strategy(self, |s, payload| async move {
                    let Payload::Run(req) = payload else {
                        return Err(CoreError::InvalidPayload {
                            event: EVENT_RUN.to_string(),
                            expected: "run(args, stderr, stdout)",
                        });
                    };
                    let (args, stderr, stdout) = req.into_parts();
                    s.run(&args, &stderr, &stdout).await?;
                    Ok::<(), CoreError>(())
                }),
            ),
        );

        bus.observe(
            Channel::Interrupt,
            EVENT_ABORT,
            ObserverFn::arc(
                "strategy.abort",
                with_strategy(self, |s, _| async move {
                    s.abort().await?;
                    Ok::<(), CoreError>(())
                }),
            ),
        );

        bus.observe(
            Channel::Interrupt,
            EVENT_SIGINT,
            ObserverFn::arc(
                "strategy.sigint",
                with_strategy(self, |s, _| async move { s.abort_or_quit_server().await }),
            ),
        );
    }
}

type HandlerFuture = Pin<Box<dyn Future<Output = Result<(), CoreError>> + Send>>;

/// Adapt `handler` into an observer closure that upgrades a weak strategy reference.
fn with_strategy<H, Fut>(
    strategy: &Arc<RunStrategy>,
    handler: H,
) -> impl Fn(Payload) -> HandlerFuture + Send + Sync + 'static
where
    H: Fn(Arc<RunStrategy>, Payload) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), CoreError>> + Send + 'static,
{
    let weak: Weak<RunStrategy> = Arc::downgrade(strategy);
    move |payload: Payload| -> HandlerFuture {
        match weak.upgrade() {
            Some(s) => Box::pin(handler(s, payload)),
            None => {
                trace!("strategy dropped; ignoring event");
                Box::pin(async { Ok(()) })
            }
        }
    }
}
