//! The dispatch error taxonomy.
//!
//! Three layers: [`FailureKind`] is the closed classification driving retry
//! policy, [`ClassifiedFailure`] is a transport failure annotated with its
//! kind and the attempt it occurred on, and [`DispatchError`] is what a
//! dispatch call ultimately returns: a terminal classified failure or a
//! cancellation, which are deliberately distinct outcomes.

use std::fmt;

use thiserror::Error;

use mailgate_common::CommonError;

use crate::transport::TransportError;

/// Closed classification of a send failure.
///
/// Derived once per failure by [`crate::classify`]; the dispatch policy is
/// keyed entirely on this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Anything unmapped; retried conservatively without gating.
    Unknown,
    /// The calling environment could not locate provider credentials.
    NoCredentials,
    /// The provider refused the message content.
    MessageRejected,
    /// The rolling-window quota is exhausted.
    DailyQuotaExceeded,
    /// The instantaneous send rate was exceeded.
    SendRateExceeded,
    /// The dispatch core itself was misconfigured.
    Configuration,
    /// The provider denied access to the operation.
    AccessDenied,
}

impl FailureKind {
    /// Kinds that are never retried.
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::MessageRejected | Self::NoCredentials | Self::Configuration)
    }

    /// Kinds whose retries must first pass an admission gate.
    pub fn is_gated(self) -> bool {
        matches!(self, Self::DailyQuotaExceeded | Self::SendRateExceeded)
    }

    /// Stable name for logging.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::NoCredentials => "NoCredentials",
            Self::MessageRejected => "MessageRejected",
            Self::DailyQuotaExceeded => "DailyQuotaExceeded",
            Self::SendRateExceeded => "SendRateExceeded",
            Self::Configuration => "Configuration",
            Self::AccessDenied => "AccessDenied",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transport failure annotated with its classification and the 0-based
/// attempt index it occurred on.
///
/// Immutable once constructed. The attempt index is informational: callers
/// use it to tell "failed on first try" from "failed after N retries".
#[derive(Debug)]
pub struct ClassifiedFailure {
    kind: FailureKind,
    attempt: u32,
    source: TransportError,
}

impl ClassifiedFailure {
    /// Annotate a transport failure.
    pub fn new(kind: FailureKind, attempt: u32, source: TransportError) -> Self {
        Self { kind, attempt, source }
    }

    /// The classification driving the retry decision.
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// 0-based index of the attempt that produced this failure.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Consume the annotation and recover the transport failure.
    pub fn into_source(self) -> TransportError {
        self.source
    }
}

impl fmt::Display for ClassifiedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attempt > 0 {
            write!(f, "{} [{} retries]: {}", self.kind, self.attempt, self.source)
        } else {
            write!(f, "{}: {}", self.kind, self.source)
        }
    }
}

impl std::error::Error for ClassifiedFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Outcome of a dispatch call that did not succeed.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The action failed terminally; the classified failure says why.
    #[error(transparent)]
    Failed(#[from] ClassifiedFailure),

    /// The caller cancelled the dispatch at a suspension point.
    ///
    /// Never produced by a provider error: cancellation must not be mistaken
    /// for failure, and a cancelled dispatch is never retried.
    #[error("Dispatch cancelled by caller")]
    Cancelled,
}

impl DispatchError {
    /// The classified failure, if this outcome is a failure.
    pub fn classified(&self) -> Option<&ClassifiedFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            Self::Cancelled => None,
        }
    }

    /// Whether the dispatch ended because the caller cancelled it.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Failure to discover the provider limits.
#[derive(Debug, Error)]
pub enum LimitsError {
    /// The limit query failed and no earlier snapshot exists to fall back
    /// on.
    #[error("Provider limits unavailable: {source}")]
    Unavailable {
        /// The transport failure that prevented discovery.
        #[source]
        source: TransportError,
    },
}

/// Failure to construct the shared limiter pair.
#[derive(Debug, Error)]
pub enum LimiterError {
    /// The initial limit snapshot could not be taken.
    #[error(transparent)]
    Limits(#[from] LimitsError),

    /// A gate or the backoff calculator rejected its derived parameters.
    #[error(transparent)]
    Primitive(#[from] CommonError),
}
