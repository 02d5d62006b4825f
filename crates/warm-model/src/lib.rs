mod domain;
pub use domain::DEFAULT_VARIANT;
pub use domain::{EVENT_ABORT, EVENT_PRELOAD, EVENT_QUIT, EVENT_RUN, EVENT_SIGINT};
pub use domain::RunArgs;

mod error;
pub use error::{ModelError, ModelResult};

mod kind;
pub use kind::{Channel, Readiness};

mod spec;
pub use spec::TestFramework;

mod strategy;
pub use strategy::StrategySelection;
