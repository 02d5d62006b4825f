//! OS interrupt forwarding.
//!
//! The signal side only records delivery; a regular task turns each delivery into
//! an `interrupt/sigint` trigger, so cancellation logic never runs in signal context.
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use warm_model::{Channel, EVENT_SIGINT};

use crate::bus::{EventBus, Payload};

/// Spawn a task that triggers `interrupt/sigint` on `bus` for every SIGINT.
///
/// Must be called from within a Tokio runtime.
#[cfg(unix)]
pub fn forward_interrupts(bus: EventBus) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    Ok(tokio::spawn(async move {
        while sigint.recv().await.is_some() {
            forward(&bus).await;
        }
        debug!("interrupt stream closed; forwarder exiting");
    }))
}

/// Spawn a task that triggers `interrupt/sigint` on `bus` for every Ctrl-C.
///
/// Must be called from within a Tokio runtime.
#[cfg(not(unix))]
pub fn forward_interrupts(bus: EventBus) -> std::io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            forward(&bus).await;
        }
        debug!("ctrl-c listener failed; forwarder exiting");
    }))
}

async fn forward(bus: &EventBus) {
    debug!("interrupt received; forwarding to interrupt channel");
    if let Err(e) = bus
        .trigger(Channel::Interrupt, EVENT_SIGINT, Payload::Empty)
        .await
    {
        warn!(error = %e, label = e.as_label(), "sigint observers failed");
    }
}
