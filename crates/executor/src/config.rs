//! Runtime configuration passed into request execution.
//!
//! Process-wide knobs live here instead of in globals; the server builds one
//! of these from its settings file and hands it to every dispatch.

/// Per-process execution settings.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Server-wide soft error budget, used when a request sets
    /// `err_limit = -1`.
    pub max_errs: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig { max_errs: 10 }
    }
}

impl RuntimeConfig {
    /// Resolve a request's error budget. `-1` selects the server-wide
    /// maximum; other negative values clamp to zero.
    pub fn err_limit(&self, requested: i64) -> usize {
        if requested == -1 {
            self.max_errs
        } else if requested < 0 {
            0
        } else {
            requested as usize
        }
    }
}
