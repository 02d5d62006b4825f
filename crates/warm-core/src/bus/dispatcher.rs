use std::{collections::HashMap, sync::RwLock};

use tracing::{debug, instrument, trace};
use warm_model::Channel;

use crate::{
    bus::{ObserverRef, Payload},
    error::CoreError,
};

/// One named channel: event name → observers in registration order.
pub struct EventDispatcher {
    channel: Channel,
    observers: RwLock<HashMap<String, Vec<ObserverRef>>>,
}

impl EventDispatcher {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            observers: RwLock::new(HashMap::new()),
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Subscribe `observer` to `event`.
    ///
    /// Registering the same observer twice makes it run twice.
    pub fn observe(&self, event: &str, observer: ObserverRef) {
        trace!(channel = %self.channel, event, observer = observer.name(), "observer registered");
        let mut map = match self.observers.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.entry(event.to_string()).or_default().push(observer);
    }

    /// Invoke every observer of `event` with `payload`, sequentially.
    ///
    /// Observers registered while a dispatch is in flight are not seen by that dispatch.
    #[instrument(level = "trace", skip(self, payload), fields(channel = %self.channel))]
    pub async fn trigger(&self, event: &str, payload: Payload) -> Result<(), CoreError> {
        let observers = self.snapshot(event);
        debug!(channel = %self.channel, event, observers = observers.len(), "event triggered");

        for observer in observers {
            trace!(channel = %self.channel, event, observer = observer.name(), "dispatching");
            observer.on_event(&payload).await?;
        }
        Ok(())
    }

    /// Number of observers currently subscribed to `event`.
    pub fn observer_count(&self, event: &str) -> usize {
        self.snapshot(event).len()
    }

    fn snapshot(&self, event: &str) -> Vec<ObserverRef> {
        let map = match self.observers.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.get(event).cloned().unwrap_or_default()
    }
}
