//! The remote provider seam.
//!
//! Everything the dispatch core needs from the outside world is behind
//! [`MailTransport`]: one send operation and one limit query. Transport
//! failures carry metadata (a category code plus the provider's message)
//! rather than one variant per provider condition; classification over that
//! metadata is [`crate::classify`]'s job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::request::EmailRequest;

/// Acknowledgement for a message the provider accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendAck {
    /// Provider-assigned identifier of the accepted message.
    pub message_id: String,
}

/// The provider's current sending limits.
///
/// Rates are fractional because providers report them that way (e.g. 14.5
/// messages per second on a warming account).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SendLimits {
    /// Maximum messages per second.
    pub max_send_rate: f64,
    /// Maximum messages per rolling 24-hour window.
    pub max_per_window: f64,
    /// Messages already sent within the current window.
    pub sent_in_window: f64,
}

impl SendLimits {
    /// Messages still available in the current window, never negative.
    pub fn remaining(&self) -> f64 {
        (self.max_per_window - self.sent_in_window).max(0.0)
    }
}

/// Failure surfaced by the provider transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The provider validated and refused the message content.
    #[error("Message rejected by provider: {reason}")]
    Rejected {
        /// The provider's explanation.
        reason: String,
    },

    /// The provider answered with a service-level error.
    #[error("Provider error '{code}': {message}")]
    Service {
        /// Provider error category, e.g. `Throttling`.
        code: String,
        /// Human-readable provider message.
        message: String,
    },

    /// The call never produced a provider response (connectivity, credential
    /// lookup, client-side timeout).
    #[error("Transport call failed: {message}")]
    Call {
        /// What went wrong on the way to the provider.
        message: String,
    },
}

impl TransportError {
    /// A structural rejection of the message content.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected { reason: reason.into() }
    }

    /// A provider service error with a category code.
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service { code: code.into(), message: message.into() }
    }

    /// A failure before any provider response.
    pub fn call(message: impl Into<String>) -> Self {
        Self::Call { message: message.into() }
    }
}

/// The remote mail provider.
///
/// Implementations own transport-level concerns (wire format, request
/// timeouts, credentials); the dispatch core only sees the
/// success-or-classified-failure outcome.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Submit one message to the provider.
    async fn send(&self, request: &EmailRequest) -> Result<SendAck, TransportError>;

    /// Query the provider's current sending limits.
    async fn get_send_limits(&self) -> Result<SendLimits, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates `SendLimits::remaining` behavior for the quota accounting
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms the remaining count is the window maximum minus the sent
    ///   count.
    /// - Ensures an overdrawn window reports zero, not a negative value.
    #[test]
    fn test_remaining_never_goes_negative() {
        let limits =
            SendLimits { max_send_rate: 14.0, max_per_window: 200.0, sent_in_window: 60.0 };
        assert_eq!(limits.remaining(), 140.0);

        let overdrawn =
            SendLimits { max_send_rate: 14.0, max_per_window: 200.0, sent_in_window: 250.0 };
        assert_eq!(overdrawn.remaining(), 0.0);
    }

    #[test]
    fn test_error_display_carries_provider_metadata() {
        let err = TransportError::service("Throttling", "Maximum sending rate exceeded.");
        assert_eq!(err.to_string(), "Provider error 'Throttling': Maximum sending rate exceeded.");

        let err = TransportError::rejected("address is not verified");
        assert!(err.to_string().contains("address is not verified"));
    }
}
