use std::time::Duration;

use super::Validator;

pub const DEFAULT_LOOKBACK_ERAS: u32 = 84;

/// Immutable run parameters handed to the orchestrator at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutSettings {
    /// Validators in the order they are processed
    pub validators: Vec<Validator>,
    /// Number of past eras inspected below the active era
    pub lookback_eras: u32,
    /// Upper bound of payout calls per batch, `None` for a single batch
    pub max_calls_per_batch: Option<usize>,
    /// How many validators may have their claimed eras queried at once
    pub query_concurrency: usize,
    /// Deadline for the whole run
    pub run_timeout: Option<Duration>,
}

impl PayoutSettings {
    pub fn new(validators: Vec<Validator>) -> Self {
        Self {
            validators,
            lookback_eras: DEFAULT_LOOKBACK_ERAS,
            max_calls_per_batch: None,
            query_concurrency: 1,
            run_timeout: None,
        }
    }

    pub fn with_lookback(mut self, lookback_eras: u32) -> Self {
        self.lookback_eras = lookback_eras;
        self
    }

    pub fn with_max_calls_per_batch(mut self, max_calls: Option<usize>) -> Self {
        self.max_calls_per_batch = max_calls;
        self
    }

    pub fn with_query_concurrency(mut self, concurrency: usize) -> Self {
        self.query_concurrency = concurrency.max(1);
        self
    }

    pub fn with_run_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.run_timeout = timeout;
        self
    }
}
