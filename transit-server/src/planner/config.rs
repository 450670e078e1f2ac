//! Search configuration for the journey planner.

use std::time::Duration;

/// Configuration parameters for journey search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Wall-clock budget for a single search.
    /// Checked at every frontier pop; `None` means unbounded.
    pub timeout: Option<Duration>,

    /// Maximum number of states expanded before giving up; `None` means
    /// unbounded. The search already expands each (stop, route) pair at most
    /// once.
    pub max_expansions: Option<usize>,
}

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(timeout: Option<Duration>, max_expansions: Option<usize>) -> Self {
        Self {
            timeout,
            max_expansions,
        }
    }

    /// Set the per-search timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            max_expansions: None,
        }
    }
}
