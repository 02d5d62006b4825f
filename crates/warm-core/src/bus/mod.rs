//! Publish/subscribe event bus with the two channels the coordinator uses.
//!
//! ```text
//! EventBus
//!   ├─ work       ── preload ──► observers…
//!   │             └─ run     ──► observers…   (payload: args, stderr, stdout)
//!   └─ interrupt  ── abort   ──► observers…
//!                 ├─ sigint  ──► observers…
//!                 └─ quit    ──► observers…   (hosting server)
//! ```
//!
//! `trigger` runs the observers of one event synchronously, in registration order,
//! inside the caller's task. The first observer error aborts dispatch and is returned.
mod dispatcher;
pub use dispatcher::EventDispatcher;

mod observer;
pub use observer::{Observer, ObserverFn, ObserverRef};

mod payload;
pub use payload::{Payload, RunRequest};

use std::sync::Arc;

use warm_model::Channel;

use crate::error::CoreError;

/// Cloneable handle to the `work` and `interrupt` channels.
#[derive(Clone)]
pub struct EventBus {
    work: Arc<EventDispatcher>,
    interrupt: Arc<EventDispatcher>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            work: Arc::new(EventDispatcher::new(Channel::Work)),
            interrupt: Arc::new(EventDispatcher::new(Channel::Interrupt)),
        }
    }

    /// Access a channel by name.
    pub fn channel(&self, channel: Channel) -> &EventDispatcher {
        match channel {
            Channel::Work => &self.work,
            Channel::Interrupt => &self.interrupt,
        }
    }

    pub fn observe(&self, channel: Channel, event: &str, observer: ObserverRef) {
        self.channel(channel).observe(event, observer);
    }

    pub async fn trigger(
        &self,
        channel: Channel,
        event: &str,
        payload: Payload,
    ) -> Result<(), CoreError> {
        self.channel(channel).trigger(event, payload).await
    }

    pub fn observer_count(&self, channel: Channel, event: &str) -> usize {
        self.channel(channel).observer_count(event)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
