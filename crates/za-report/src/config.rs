//! Dispatcher configuration.

use std::time::Duration;

use zoho_analytics_client::BackoffStrategy;

/// Default retry budget: HTTP attempts per logical call.
pub const DEFAULT_RETRIES: u32 = 5;

/// Timeout applied to import calls, which upload the whole data set.
pub const IMPORT_TIMEOUT: Duration = Duration::from_secs(60);

/// Delay between dispatcher retries: `min(attempt * step, max) + jitter`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchBackoff {
    /// Delay added per attempt.
    pub step: Duration,
    /// Upper bound before jitter.
    pub max: Duration,
    /// Upper bound of the uniformly random extra delay.
    pub jitter: Duration,
}

impl Default for DispatchBackoff {
    fn default() -> Self {
        Self {
            step: Duration::from_secs(10),
            max: Duration::from_secs(60),
            jitter: Duration::from_secs(1),
        }
    }
}

impl DispatchBackoff {
    /// No waiting at all; useful in tests.
    pub fn none() -> Self {
        Self {
            step: Duration::ZERO,
            max: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (1-indexed).
    pub fn delay(&self, attempt: u32) -> Duration {
        BackoffStrategy::LinearWithJitter {
            jitter: self.jitter,
        }
        .delay(attempt.saturating_sub(1), self.step, self.max)
    }
}

/// Configuration for the retrying dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    /// Budget used when a call passes `0`.
    pub default_retries: u32,
    /// Delay between attempts.
    pub backoff: DispatchBackoff,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            default_retries: DEFAULT_RETRIES,
            backoff: DispatchBackoff::default(),
        }
    }
}

impl DispatchConfig {
    /// Set the default retry budget. A budget of `0` is raised to `1`.
    pub fn with_default_retries(mut self, retries: u32) -> Self {
        self.default_retries = retries.max(1);
        self
    }

    /// Set the backoff.
    pub fn with_backoff(mut self, backoff: DispatchBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Resolve a per-call budget; `0` means the default.
    pub fn budget(&self, retries: u32) -> u32 {
        if retries == 0 {
            self.default_retries.max(1)
        } else {
            retries
        }
    }
}
