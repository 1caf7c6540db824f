//! The retry dispatch state machine.
//!
//! One dispatch = one logical send. Each attempt invokes the caller's action;
//! on failure the error is classified and the policy keyed on
//! [`FailureKind`] decides what happens next: stop (fatal kinds, exhausted
//! budget), gate-and-pause (throttling kinds), or retry immediately
//! (everything else). Gate waits and backoff sleeps are the only blocking
//! operations, and every one of them observes the caller's cancellation
//! token.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use mailgate_common::RateGate;

use crate::classify::classify;
use crate::config::DEFAULT_MAX_RETRIES;
use crate::error::{ClassifiedFailure, DispatchError, FailureKind};
use crate::limiter::LimiterPair;
use crate::transport::TransportError;

/// Drives a fallible send action through classification, gating, backoff,
/// and bounded retries.
///
/// The dispatcher holds no per-call state; it references the process-wide
/// [`LimiterPair`] so that rate enforcement is global across every
/// concurrent dispatch.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    limiters: Arc<LimiterPair>,
}

impl Dispatcher {
    /// Create a dispatcher over the shared limiter pair.
    pub fn new(limiters: Arc<LimiterPair>) -> Self {
        Self { limiters }
    }

    /// Dispatch with the default retry budget.
    pub async fn dispatch_default<T, F, Fut>(
        &self,
        action: F,
        cancel: &CancellationToken,
    ) -> Result<T, DispatchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        self.dispatch(action, DEFAULT_MAX_RETRIES, cancel).await
    }

    /// Invoke `action` until it succeeds, a fatal failure occurs, the retry
    /// budget is exhausted, or the caller cancels.
    ///
    /// The budget counts retries, not attempts: `max_retries = R` allows up
    /// to `R + 1` invocations. The terminal error carries the last
    /// classified failure with the 0-based attempt it occurred on.
    #[instrument(name = "dispatch", skip(self, action, cancel))]
    pub async fn dispatch<T, F, Fut>(
        &self,
        mut action: F,
        max_retries: u32,
        cancel: &CancellationToken,
    ) -> Result<T, DispatchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(DispatchError::Cancelled);
            }

            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Err(DispatchError::Cancelled),
                outcome = action() => outcome,
            };

            let source = match outcome {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(attempt, "Send succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(source) => source,
            };

            let kind = classify(&source);
            let failure = ClassifiedFailure::new(kind, attempt, source);

            if attempt >= max_retries {
                warn!(attempt, kind = %kind, "Retry budget exhausted");
                return Err(failure.into());
            }

            if kind.is_fatal() {
                debug!(kind = %kind, "Failure is not retryable");
                return Err(failure.into());
            }

            match kind {
                FailureKind::DailyQuotaExceeded => {
                    // Daily exhaustion is not expected to clear quickly: wait
                    // for a quota slot, then pause for the worst case.
                    let pause = self.limiters.backoff().max_delay();
                    warn!(attempt, kind = %kind, pause = ?pause, "Throttled, waiting for quota");
                    self.gate_wait(self.limiters.quota_gate(), cancel).await?;
                    self.pause(pause, cancel).await?;
                }
                FailureKind::SendRateExceeded => {
                    let pause = self.limiters.backoff().delay(attempt + 1);
                    warn!(attempt, kind = %kind, pause = ?pause, "Throttled, pacing retry");
                    self.gate_wait(self.limiters.rate_gate(), cancel).await?;
                    self.pause(pause, cancel).await?;
                }
                _ => {
                    debug!(attempt, kind = %kind, "Retrying immediately");
                }
            }

            attempt += 1;
        }
    }

    async fn gate_wait(
        &self,
        gate: &RateGate,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(DispatchError::Cancelled),
            _ = gate.wait_to_proceed() => Ok(()),
        }
    }

    async fn pause(
        &self,
        delay: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(DispatchError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}
