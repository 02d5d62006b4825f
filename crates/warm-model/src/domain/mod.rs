mod constants;
pub use constants::DEFAULT_VARIANT;
pub use constants::{EVENT_ABORT, EVENT_PRELOAD, EVENT_QUIT, EVENT_RUN, EVENT_SIGINT};

/// Positional arguments forwarded to a single run.
pub type RunArgs = Vec<String>;
