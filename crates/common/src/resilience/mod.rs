//! Resilience primitives for calling rate- and quota-limited services.
//!
//! This module provides **generic, reusable** building blocks:
//! - [`ExponentialBackoff`]: deterministic attempt-scaled delays with a
//!   ceiling and an optional floor
//! - [`RateGate`]: "at most N operations per rolling window" admission
//!   control that blocks excess callers instead of rejecting them
//! - [`Clock`]: a time abstraction so window- and interval-based behavior can
//!   be tested deterministically with [`MockClock`]
//!
//! None of these types know anything about mail; the dispatch policy that
//! combines them with failure classification lives in `mailgate-core`.

pub mod backoff;
pub mod clock;
pub mod gate;

pub use backoff::{ExponentialBackoff, MAX_BACKOFF_EXPONENT};
pub use clock::{Clock, MockClock, SystemClock};
pub use gate::RateGate;
