//! Cached discovery of the provider's sending limits.
//!
//! The provider exposes its limits through an out-of-band query that is too
//! expensive to issue per send. [`LimitCache`] keeps the last snapshot and
//! refreshes it at most once per configured interval, with a single-flight
//! guarantee: the refresh lock is held across the fetch, so concurrent
//! readers arriving during a refresh block and then observe the values
//! written by the one fetch that ran.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use mailgate_common::{Clock, SystemClock};

use crate::error::LimitsError;
use crate::transport::{MailTransport, SendLimits};

struct CacheState {
    limits: Option<SendLimits>,
    last_refreshed: Option<std::time::Instant>,
}

/// Cached, lazily-refreshed view of the provider limits.
///
/// A failed refresh degrades to the previous snapshot instead of corrupting
/// it; [`LimitsError`] is surfaced only when no snapshot has ever been
/// taken.
pub struct LimitCache<C: Clock = SystemClock> {
    transport: Arc<dyn MailTransport>,
    update_interval: Duration,
    state: Mutex<CacheState>,
    clock: C,
}

impl LimitCache<SystemClock> {
    /// Create a cache that refreshes at most once per `update_interval`.
    pub fn new(transport: Arc<dyn MailTransport>, update_interval: Duration) -> Self {
        Self::with_clock(transport, update_interval, SystemClock)
    }
}

impl<C: Clock> LimitCache<C> {
    /// Create a cache with a custom clock.
    pub fn with_clock(
        transport: Arc<dyn MailTransport>,
        update_interval: Duration,
        clock: C,
    ) -> Self {
        Self {
            transport,
            update_interval,
            state: Mutex::new(CacheState { limits: None, last_refreshed: None }),
            clock,
        }
    }

    /// Return fresh-enough limits, refreshing from the provider if the
    /// cached snapshot is stale.
    pub async fn current(&self) -> Result<SendLimits, LimitsError> {
        let mut state = self.state.lock().await;

        if let Some(limits) = state.limits {
            let fresh = state
                .last_refreshed
                .is_some_and(|at| self.clock.now().duration_since(at) < self.update_interval);
            if fresh {
                return Ok(limits);
            }
        }

        // Cache miss. The lock stays held across the fetch: one caller
        // performs it, everyone queued behind observes the refreshed state.
        match self.transport.get_send_limits().await {
            Ok(limits) => {
                state.limits = Some(limits);
                state.last_refreshed = Some(self.clock.now());
                debug!(
                    max_send_rate = limits.max_send_rate,
                    max_per_window = limits.max_per_window,
                    sent_in_window = limits.sent_in_window,
                    "Refreshed provider limits"
                );
                Ok(limits)
            }
            Err(err) => match state.limits {
                Some(stale) => {
                    warn!(error = %err, "Limit refresh failed, serving stale snapshot");
                    Ok(stale)
                }
                None => Err(LimitsError::Unavailable { source: err }),
            },
        }
    }

    /// Messages remaining in the current quota window, from a fresh-enough
    /// snapshot.
    pub async fn remaining(&self) -> Result<f64, LimitsError> {
        Ok(self.current().await?.remaining())
    }
}

impl<C: Clock> std::fmt::Debug for LimitCache<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LimitCache")
            .field("update_interval", &self.update_interval)
            .finish_non_exhaustive()
    }
}
