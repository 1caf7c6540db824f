//! Configuration surface consumed by the dispatch core.
//!
//! These are values, not a loading mechanism: the embedding application owns
//! where they come from (file, environment, flags) and hands the resolved
//! structs to [`crate::LimiterPair::connect`] and [`crate::MailSender`].
//! Durations are carried as integer milliseconds via the shared serde
//! adapters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use mailgate_common::{duration_millis, opt_duration_millis, CommonResult, ExponentialBackoff};

/// Default retry budget when the caller does not supply one.
pub const DEFAULT_MAX_RETRIES: u32 = 10;

const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(100);
const DEFAULT_BACKOFF_MAX: Duration = Duration::from_secs(30);
const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Backoff shape: base and ceiling, with an optional floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay for the first retry; doubles per attempt.
    #[serde(with = "duration_millis")]
    pub base: Duration,
    /// Ceiling every delay is clamped to; also the worst-case pause used
    /// after a quota trip.
    #[serde(with = "duration_millis")]
    pub max: Duration,
    /// Optional lower bound on computed delays.
    #[serde(with = "opt_duration_millis")]
    pub floor: Option<Duration>,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self { base: DEFAULT_BACKOFF_BASE, max: DEFAULT_BACKOFF_MAX, floor: None }
    }
}

impl BackoffConfig {
    /// Build the immutable calculator, validating the invariants.
    pub fn build(&self) -> CommonResult<ExponentialBackoff> {
        let backoff = ExponentialBackoff::new(self.base, self.max)?;
        match self.floor {
            Some(floor) => backoff.with_floor(floor),
            None => Ok(backoff),
        }
    }
}

/// Freshness policy for the cached provider limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// How long a limit snapshot stays fresh before the next read triggers a
    /// refresh.
    #[serde(with = "duration_millis")]
    pub update_interval: Duration,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { update_interval: DEFAULT_UPDATE_INTERVAL }
    }
}

/// Dispatch policy knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Retry budget used when the caller omits one; the budget counts
    /// retries, so `max_retries = 10` allows up to 11 invocations.
    pub max_retries: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { max_retries: DEFAULT_MAX_RETRIES }
    }
}

/// The full configuration surface of the dispatch core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailgateConfig {
    /// Backoff shape shared by every dispatch.
    pub backoff: BackoffConfig,
    /// Limit snapshot freshness.
    pub limits: LimitsConfig,
    /// Dispatch policy.
    pub dispatch: DispatchConfig,
}
