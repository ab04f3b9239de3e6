//! Best-effort request tracing.
//!
//! A process-wide flag toggled by the `/traceon` / `/traceoff` endpoints.
//! Trace points are sprinkled through the dispatch and query paths; when the
//! flag is off they cost one relaxed atomic load.

use std::sync::atomic::{AtomicBool, Ordering};

static TRACE_ON: AtomicBool = AtomicBool::new(false);

pub fn set_enabled(on: bool) {
    TRACE_ON.store(on, Ordering::Relaxed);
}

pub fn enabled() -> bool {
    TRACE_ON.load(Ordering::Relaxed)
}

/// Emit `msg` under the `cask::trace` target when tracing is on.
pub fn trace(msg: &str) {
    if enabled() {
        tracing::info!(target: "cask::trace", "{msg}");
    }
}
