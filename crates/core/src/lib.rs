//! Resilient dispatch core for a rate- and quota-limited mail provider.
//!
//! The provider enforces two independent limits (an instantaneous send rate
//! and a rolling 24-hour quota) and reports failures with enough metadata to
//! tell permanent rejections from backpressure. This crate turns that into a
//! single public contract: hand [`Dispatcher::dispatch`] (or the
//! [`MailSender`] facade) a send action and a retry budget, and get back
//! either the provider's acknowledgement or a [`ClassifiedFailure`]
//! explaining why the call terminally failed.
//!
//! Control flow per attempt:
//!
//! ```text
//! action() --ok--> done
//!    |
//! failure --> classify --> budget exhausted? --> ClassifiedFailure
//!                |
//!                +- fatal kind -----------------------> ClassifiedFailure
//!                +- quota trip -> quota gate + worst-case pause -> retry
//!                +- rate trip --> rate gate + scaled backoff ----> retry
//!                +- unknown/denied -----------------------------> retry
//! ```
//!
//! The gates and the backoff calculator live in one process-wide
//! [`LimiterPair`], shared by every in-flight dispatch; its capacities come
//! from a cached, lazily-refreshed snapshot of the provider's own numbers
//! ([`LimitCache`]).

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod classify;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod limiter;
pub mod limits;
pub mod request;
pub mod sender;
pub mod transport;

// Re-export the public surface at the crate root
// ------------------------------
pub use classify::classify;
pub use config::{
    BackoffConfig, DispatchConfig, LimitsConfig, MailgateConfig, DEFAULT_MAX_RETRIES,
};
pub use dispatch::Dispatcher;
pub use error::{ClassifiedFailure, DispatchError, FailureKind, LimiterError, LimitsError};
pub use limiter::LimiterPair;
pub use limits::LimitCache;
pub use request::EmailRequest;
pub use sender::MailSender;
pub use transport::{MailTransport, SendAck, SendLimits, TransportError};
