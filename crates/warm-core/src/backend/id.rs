use std::sync::atomic::{AtomicU64, Ordering};

/// Global monotonically increasing sequence for run identifiers.
///
/// Local to the current server process.
static RUN_SEQ: AtomicU64 = AtomicU64::new(1);

fn next_seq() -> u64 {
    RUN_SEQ.fetch_add(1, Ordering::Relaxed)
}

/// Build a human-readable run id.
///
/// Format: `{variant}-{framework}-{seq:x}`.
/// - `variant`  : registered strategy variant name
/// - `framework`: `TestFramework::name`
/// - `seq`      : per-process hex sequence
pub fn make_run_id(variant: &str, framework: &str) -> String {
    format!("{variant}-{framework}-{seq:x}", seq = next_seq())
}
