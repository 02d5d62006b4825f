pub mod backend;
pub mod bus;
pub mod coordinator;
pub mod error;
pub mod registry;
pub mod stream;

#[cfg(test)]
mod testing;

pub mod prelude {
    pub use crate::backend::{Backend, BackendError, BackendRef, RunOutcome, WarmUpOutcome};
    pub use crate::bus::{EventBus, Observer, ObserverFn, ObserverRef, Payload, RunRequest};
    pub use crate::coordinator::{ABORT_PROMPT, RunStrategy, forward_interrupts};
    pub use crate::error::CoreError;
    pub use crate::registry::{StrategyRegistry, StrategyVariant, VariantBuilder};
    pub use crate::stream::{Captured, OutputStream};
}
