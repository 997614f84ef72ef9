//! Retry policy configuration

/// Fallback retry budget when the computed one is not usable.
///
/// Reached when `hour_budget * 3600 / initial_delay_secs` is non-positive,
/// NaN, or infinite (e.g. a zero or negative budget, or a zero delay).
pub const DEFAULT_MAX_RETRIES: usize = 10;

/// Configuration for [`retry_with_backoff`](crate::retry::retry_with_backoff).
///
/// A plain value object. Construct once, pass explicitly; the defaults
/// match the backoff recipe recommended for rate-limited APIs.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Delay before the first retry, in seconds.
    pub initial_delay_secs: f64,
    /// Fraction of an hour allowed for cumulative retry waiting.
    pub hour_budget: f64,
    /// Randomize delays to avoid thundering-herd retries.
    pub jitter: bool,
    /// Multiplier applied to the delay on every retry.
    pub exponential_base: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay_secs: 1.0,
            hour_budget: 0.3,
            jitter: false,
            exponential_base: 2,
        }
    }
}

impl RetryPolicy {
    /// Retry budget derived from the hour budget.
    ///
    /// `round(log_base(hour_budget * 3600 / initial_delay))`, floored to 1.
    /// Degenerate inputs fall back to [`DEFAULT_MAX_RETRIES`].
    pub fn max_retries(&self) -> usize {
        let ratio = (self.hour_budget * 3600.0) / self.initial_delay_secs;
        if !ratio.is_finite() || ratio <= 0.0 {
            return DEFAULT_MAX_RETRIES;
        }
        let retries = ratio.ln() / f64::from(self.exponential_base).ln();
        if !retries.is_finite() {
            return DEFAULT_MAX_RETRIES;
        }
        (retries.round() as i64).max(1) as usize
    }
}
