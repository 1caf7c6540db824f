//! The process-wide limiter pair.
//!
//! One `LimiterPair` per process: both gates and the backoff calculator must
//! be shared by every concurrent dispatch or the provider limits are not
//! actually enforced. The pair is an explicitly-constructed `Arc`, handed to
//! each [`crate::Dispatcher`]/[`crate::MailSender`] rather than hidden in a
//! global, so tests can build isolated instances.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use mailgate_common::{ExponentialBackoff, RateGate};

use crate::config::MailgateConfig;
use crate::error::LimiterError;
use crate::limits::LimitCache;
use crate::transport::MailTransport;

/// Window the provider's instantaneous rate limit applies to.
const RATE_WINDOW: Duration = Duration::from_secs(1);
/// Window the provider's quota applies to.
const QUOTA_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// One rate gate, one quota gate, and the shared backoff calculator.
///
/// Gate capacities are derived from the limit snapshot taken at construction
/// and stay fixed for the lifetime of the pair. The snapshot itself keeps
/// refreshing through [`LimiterPair::limits`] for quota accounting; resizing
/// live gates on refresh would discard their in-flight admission history, so
/// a provider-side limit change takes effect on process restart.
pub struct LimiterPair {
    rate_gate: RateGate,
    quota_gate: RateGate,
    backoff: ExponentialBackoff,
    limits: LimitCache,
}

impl LimiterPair {
    /// Build the shared pair: take the initial limit snapshot and size both
    /// gates from it.
    ///
    /// Fails if the provider limits cannot be fetched at all, if the
    /// configured backoff is invalid, or if a reported limit rounds to zero
    /// permits.
    pub async fn connect(
        transport: Arc<dyn MailTransport>,
        config: &MailgateConfig,
    ) -> Result<Arc<Self>, LimiterError> {
        let backoff = config.backoff.build()?;
        let limits = LimitCache::new(transport, config.limits.update_interval);
        let snapshot = limits.current().await?;

        let rate_permits = round_half_away_from_zero(snapshot.max_send_rate);
        let quota_permits = round_half_away_from_zero(snapshot.max_per_window);
        info!(rate_permits, quota_permits, "Sized limiter pair from provider snapshot");

        Ok(Arc::new(Self {
            rate_gate: RateGate::new(rate_permits, RATE_WINDOW)?,
            quota_gate: RateGate::new(quota_permits, QUOTA_WINDOW)?,
            backoff,
            limits,
        }))
    }

    /// The gate sized to the provider's per-second send rate.
    pub fn rate_gate(&self) -> &RateGate {
        &self.rate_gate
    }

    /// The gate sized to the provider's 24-hour quota.
    pub fn quota_gate(&self) -> &RateGate {
        &self.quota_gate
    }

    /// The backoff calculator shared by every dispatch.
    pub fn backoff(&self) -> &ExponentialBackoff {
        &self.backoff
    }

    /// The refreshing limit snapshot backing quota accounting.
    pub fn limits(&self) -> &LimitCache {
        &self.limits
    }
}

impl std::fmt::Debug for LimiterPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LimiterPair")
            .field("rate_gate", &self.rate_gate)
            .field("quota_gate", &self.quota_gate)
            .finish_non_exhaustive()
    }
}

/// Half-away-from-zero rounding of a fractional permit count.
fn round_half_away_from_zero(value: f64) -> usize {
    value.round().max(0.0) as usize
}
