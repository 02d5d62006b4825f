//! Logging for the warm-server process.
//!
//! Run output owns stdout, so text and JSON logs are always written to stderr.
mod logger;
pub use logger::*;
