use std::{borrow::Cow, future::Future, sync::Arc};

use async_trait::async_trait;

use crate::{bus::Payload, error::CoreError};

/// Shared handle to an observer.
pub type ObserverRef = Arc<dyn Observer>;

/// Handler invoked when a named event is triggered on a channel.
///
/// Observers run inline in the triggering task, one after another, in registration order.
/// An error stops dispatch and is returned to whoever triggered the event.
#[async_trait]
pub trait Observer: Send + Sync {
    /// Observer name used in logs.
    fn name(&self) -> &str;

    async fn on_event(&self, payload: &Payload) -> Result<(), CoreError>;
}

/// Closure-backed observer.
///
/// Wraps `F: Fn(Payload) -> Fut`, producing a fresh future per event.
pub struct ObserverFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ObserverFn<F> {
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the observer and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Observer for ObserverFn<F>
where
    F: Fn(Payload) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), CoreError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_event(&self, payload: &Payload) -> Result<(), CoreError> {
        (self.f)(payload.clone()).await
    }
}
