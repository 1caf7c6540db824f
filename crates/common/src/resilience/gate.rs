//! Rolling-window admission control.
//!
//! A [`RateGate`] permits at most `permits` operations per trailing `window`.
//! Admissions are timestamped; a permit is never "released", it simply ages
//! out of the window. Excess callers block until the oldest admission
//! expires, then re-compete for the freed slot. Admission order under
//! contention is not FIFO, but every waiter is eventually admitted as long as
//! the window keeps advancing.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{CommonError, CommonResult};
use crate::resilience::clock::{Clock, SystemClock};

/// Blocking admission gate: at most `permits` operations per rolling
/// `window`.
///
/// The gate cannot fail at runtime, it only blocks. Its waiting futures are
/// cancel-safe: an admission is recorded only when a permit is actually
/// claimed, so dropping a pending [`RateGate::wait_to_proceed`] future (e.g.
/// from a `tokio::select!` losing branch) consumes nothing.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use mailgate_common::RateGate;
///
/// # async fn example() -> Result<(), mailgate_common::CommonError> {
/// let gate = RateGate::new(14, Duration::from_secs(1))?;
///
/// gate.wait_to_proceed().await;
/// // at most 14 callers per second get here
/// # Ok(())
/// # }
/// ```
pub struct RateGate<C: Clock = SystemClock> {
    permits: usize,
    window: Duration,
    admissions: Mutex<VecDeque<Instant>>,
    clock: C,
}

impl RateGate<SystemClock> {
    /// Create a gate admitting `permits` operations per `window`.
    pub fn new(permits: usize, window: Duration) -> CommonResult<Self> {
        Self::with_clock(permits, window, SystemClock)
    }
}

impl<C: Clock> RateGate<C> {
    /// Create a gate with a custom clock.
    pub fn with_clock(permits: usize, window: Duration, clock: C) -> CommonResult<Self> {
        if permits == 0 {
            return Err(CommonError::config("permits", "must be greater than 0"));
        }
        if window.is_zero() {
            return Err(CommonError::config("window", "must be greater than zero"));
        }

        let admissions = Mutex::new(VecDeque::with_capacity(permits));
        Ok(Self { permits, window, admissions, clock })
    }

    /// The number of operations admitted per window.
    pub fn permits(&self) -> usize {
        self.permits
    }

    /// The rolling window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Try to claim a permit without waiting.
    ///
    /// Returns `true` if the caller was admitted.
    pub fn try_proceed(&self) -> bool {
        self.admit(self.clock.now()).is_ok()
    }

    /// Block until a permit is available.
    ///
    /// Sleeps until the oldest admission ages out of the window, then
    /// re-competes; the internal lock is never held across a sleep.
    pub async fn wait_to_proceed(&self) {
        loop {
            match self.admit(self.clock.now()) {
                Ok(()) => return,
                Err(retry_in) => {
                    debug!(retry_in = ?retry_in, permits = self.permits, "Gate full, waiting");
                    tokio::time::sleep(retry_in).await;
                }
            }
        }
    }

    /// Block until a permit is available or `timeout` elapses.
    ///
    /// Returns whether a permit was obtained.
    pub async fn wait_to_proceed_timeout(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait_to_proceed()).await.is_ok()
    }

    /// The number of permits currently unclaimed in the window.
    pub fn available_permits(&self) -> usize {
        let now = self.clock.now();
        let mut log = self.lock_admissions();
        Self::prune(&mut log, now, self.window);
        self.permits - log.len()
    }

    /// Record an admission at `now`, or report how long until the oldest
    /// admission expires.
    fn admit(&self, now: Instant) -> Result<(), Duration> {
        let mut log = self.lock_admissions();
        Self::prune(&mut log, now, self.window);

        if log.len() < self.permits {
            log.push_back(now);
            return Ok(());
        }

        // Window is full; the front entry is the next to expire.
        let oldest = log[0];
        Err(self.window.saturating_sub(now.duration_since(oldest)))
    }

    fn prune(log: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while log.front().is_some_and(|&t| now.duration_since(t) >= window) {
            log.pop_front();
        }
    }

    fn lock_admissions(&self) -> std::sync::MutexGuard<'_, VecDeque<Instant>> {
        match self.admissions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Rate gate admission log lock poisoned");
                poisoned.into_inner()
            }
        }
    }
}

impl<C: Clock> std::fmt::Debug for RateGate<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateGate")
            .field("permits", &self.permits)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the rate gate.
    //!
    //! Admission bookkeeping is tested against a `MockClock`; the blocking
    //! paths are covered by the crate's integration tests with real time.

    use super::*;
    use crate::resilience::clock::MockClock;

    /// Validates `RateGate::with_clock` behavior for the construction
    /// validation scenario.
    ///
    /// Assertions:
    /// - Ensures zero permits and a zero window are both rejected.
    #[test]
    fn test_degenerate_configuration_is_rejected() {
        assert!(RateGate::new(0, Duration::from_secs(1)).is_err());
        assert!(RateGate::new(5, Duration::ZERO).is_err());
    }

    /// Validates `RateGate::try_proceed` behavior for the window exhaustion
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms exactly `permits` admissions succeed within one window.
    /// - Confirms the next attempt is refused until the window advances.
    #[test]
    fn test_admissions_stop_at_capacity() {
        let clock = MockClock::new();
        let gate =
            RateGate::with_clock(3, Duration::from_secs(1), clock.clone()).expect("valid gate");

        assert!(gate.try_proceed());
        assert!(gate.try_proceed());
        assert!(gate.try_proceed());
        assert!(!gate.try_proceed());
        assert_eq!(gate.available_permits(), 0);
    }

    /// Validates `RateGate::try_proceed` behavior for the permit expiry
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms permits become available again once their admission ages
    ///   out of the window.
    #[test]
    fn test_permits_expire_with_the_window() {
        let clock = MockClock::new();
        let gate =
            RateGate::with_clock(2, Duration::from_millis(100), clock.clone()).expect("valid gate");

        assert!(gate.try_proceed());
        clock.advance_millis(60);
        assert!(gate.try_proceed());
        assert!(!gate.try_proceed());

        // First admission expires at t=100, the second at t=160
        clock.advance_millis(50);
        assert_eq!(gate.available_permits(), 1);
        assert!(gate.try_proceed());
        assert!(!gate.try_proceed());

        clock.advance_millis(60);
        assert!(gate.try_proceed());
    }

    /// Validates `RateGate::available_permits` behavior for the bookkeeping
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms the available count tracks admissions and expiry.
    #[test]
    fn test_available_permits_tracks_window() {
        let clock = MockClock::new();
        let gate =
            RateGate::with_clock(5, Duration::from_secs(1), clock.clone()).expect("valid gate");

        assert_eq!(gate.available_permits(), 5);
        assert!(gate.try_proceed());
        assert!(gate.try_proceed());
        assert_eq!(gate.available_permits(), 3);

        clock.advance(Duration::from_secs(1));
        assert_eq!(gate.available_permits(), 5);
    }
}
