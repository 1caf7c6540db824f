//! Deterministic exponential backoff.
//!
//! The calculator is a pure function of the attempt number: no jitter, no
//! hidden state, safe to share between any number of concurrent callers.
//! Callers that need a worst-case pause (e.g. after a daily quota trip) use
//! [`ExponentialBackoff::max_delay`] directly instead of an attempt-scaled
//! delay.

use std::time::Duration;

use crate::error::{CommonError, CommonResult};

/// Maximum exponent for the backoff calculation.
///
/// Delays are clamped to the ceiling anyway, so capping the exponent here
/// only has to keep `2^n` inside `u64` for any attempt count.
pub const MAX_BACKOFF_EXPONENT: u32 = 30;

/// Attempt-scaled delay calculator: `base * 2^(attempt - 1)`, clamped to
/// `[floor, ceiling]`.
///
/// | base   | attempt 1 | attempt 2 | attempt 3 | attempt 4 |
/// |--------|-----------|-----------|-----------|-----------|
/// | 100ms  | 100ms     | 200ms     | 400ms     | 800ms     |
/// | 1s     | 1s        | 2s        | 4s        | 8s        |
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use mailgate_common::ExponentialBackoff;
///
/// # fn example() -> Result<(), mailgate_common::CommonError> {
/// let backoff = ExponentialBackoff::new(Duration::from_millis(100), Duration::from_secs(30))?;
///
/// assert_eq!(backoff.delay(3), Duration::from_millis(400));
/// assert_eq!(backoff.delay(1000), backoff.max_delay());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    base_delay: Duration,
    max_delay: Duration,
    floor: Option<Duration>,
}

impl ExponentialBackoff {
    /// Create a backoff calculator with the given base and ceiling and no
    /// floor.
    pub fn new(base_delay: Duration, max_delay: Duration) -> CommonResult<Self> {
        if base_delay.is_zero() {
            return Err(CommonError::config("base_delay", "must be greater than zero"));
        }
        if max_delay.is_zero() {
            return Err(CommonError::config("max_delay", "must be greater than zero"));
        }
        if max_delay < base_delay {
            return Err(CommonError::config(
                "max_delay",
                format!("({max_delay:?}) cannot be smaller than base_delay ({base_delay:?})"),
            ));
        }

        Ok(Self { base_delay, max_delay, floor: None })
    }

    /// Set a lower bound that every computed delay is raised to.
    pub fn with_floor(mut self, floor: Duration) -> CommonResult<Self> {
        if floor > self.max_delay {
            return Err(CommonError::config(
                "floor",
                format!("({floor:?}) cannot exceed max_delay ({:?})", self.max_delay),
            ));
        }
        self.floor = Some(floor);
        Ok(self)
    }

    /// Compute the delay for a 1-based attempt number.
    ///
    /// `attempt == 0` is a caller contract violation and is treated as
    /// `attempt == 1`; the exponent is capped so very large attempt counts
    /// clamp to the ceiling instead of overflowing.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.max(1).saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
        let multiplier = 2_u64.saturating_pow(exponent);

        let base_millis = self.base_delay.as_millis() as u64;
        let max_millis = self.max_delay.as_millis() as u64;
        let mut millis = base_millis.saturating_mul(multiplier).min(max_millis);

        if let Some(floor) = self.floor {
            millis = millis.max(floor.as_millis() as u64);
        }

        Duration::from_millis(millis)
    }

    /// The ceiling every delay is clamped to.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// The base delay used for the first retry.
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }
}
