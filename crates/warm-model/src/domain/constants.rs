//! Well-known names shared by the coordinator, the event bus and the hosting server.
//!
//! Keeping them here avoids scattering magic strings throughout the codebase.

/// Event on the `work` channel that starts warm-up.
pub const EVENT_PRELOAD: &str = "preload";

/// Event on the `work` channel that executes a run; payload carries `(args, stderr, stdout)`.
pub const EVENT_RUN: &str = "run";

/// Event on the `interrupt` channel that cancels an in-flight run.
pub const EVENT_ABORT: &str = "abort";

/// Event on the `interrupt` channel raised by the OS interrupt signal.
pub const EVENT_SIGINT: &str = "sigint";

/// Event on the `interrupt` channel that asks the hosting server to shut down.
pub const EVENT_QUIT: &str = "quit";

/// Name of the built-in variant picked by [`crate::StrategySelection::Fixed`].
pub const DEFAULT_VARIANT: &str = "subprocess";
